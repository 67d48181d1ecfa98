use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::identity::{AuthError, SubjectIdentity};
use crate::error::AppError;

/// The identity `AuthMiddleware` verified for this request.
///
/// Handlers take this instead of reading headers themselves. Outside a scope wrapped by the
/// middleware there is nothing in the extensions and extraction fails with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SubjectIdentity);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<SubjectIdentity>().cloned() {
            Some(identity) => ready(Ok(AuthenticatedUser(identity))),
            None => {
                log::warn!("no verified identity on request to {}", req.path());
                ready(Err(AppError::from(AuthError::MissingCredential).into()))
            }
        }
    }
}
