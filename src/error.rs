//!
//! # Error Handling at the HTTP Boundary
//!
//! Each component reports failures through its own `thiserror` enum. `AppError` is where
//! those are narrowed into the few categories a client is allowed to see. Anything internal
//! (store, hashing, signing) is logged here and answered with a generic 500, so no digest,
//! token, or database detail ends up in a response body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::{AuthError, LoginError, OwnershipError, RegistrationError};
use crate::store::StoreError;
use crate::tasks::TaskError;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Client-visible error categories. `Display` is exactly the message sent as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    /// HTTP 401.
    #[error("{0}")]
    Unauthorized(String),
    /// HTTP 400.
    #[error("{0}")]
    BadRequest(String),
    /// HTTP 403. The caller is authenticated but does not own the resource.
    #[error("{0}")]
    Forbidden(String),
    /// HTTP 404.
    #[error("{0}")]
    NotFound(String),
    /// HTTP 422, from `validator`.
    #[error("{0}")]
    ValidationError(String),
    /// HTTP 500. The cause has already been logged.
    #[error("Internal server error")]
    InternalServerError,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string()
        }))
    }
}

impl AppError {
    fn internal(context: &str, error: impl std::fmt::Display) -> Self {
        log::error!("{}: {}", context, error);
        AppError::InternalServerError
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        let message = match error {
            AuthError::MissingCredential => "Missing token",
            AuthError::MalformedCredential => "Malformed authorization header",
            AuthError::InvalidCredential => "Invalid token",
        };
        AppError::Unauthorized(message.into())
    }
}

impl From<RegistrationError> for AppError {
    fn from(error: RegistrationError) -> AppError {
        match error {
            RegistrationError::DuplicateEmail => {
                AppError::BadRequest("Email already registered".into())
            }
            RegistrationError::DuplicateUsername => {
                AppError::BadRequest("Username already taken".into())
            }
            other => AppError::internal("registration failed", other),
        }
    }
}

impl From<LoginError> for AppError {
    fn from(error: LoginError) -> AppError {
        match error {
            LoginError::UserNotFound | LoginError::InvalidPassword => {
                AppError::Unauthorized(INVALID_CREDENTIALS.into())
            }
            other => AppError::internal("login failed", other),
        }
    }
}

impl From<OwnershipError> for AppError {
    fn from(error: OwnershipError) -> AppError {
        match error {
            OwnershipError::NotOwner => {
                AppError::Forbidden("You do not have access to this task".into())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Not found".into()),
            other => AppError::internal("store error", other),
        }
    }
}

impl From<TaskError> for AppError {
    fn from(error: TaskError) -> AppError {
        match error {
            TaskError::NotFound => AppError::NotFound("Task not found".into()),
            TaskError::NotOwner(e) => e.into(),
            TaskError::Store(e) => e.into(),
        }
    }
}
