use crate::{
    auth::{AuthenticationService, LoginRequest, RegisterRequest},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns its public profile. The client logs in separately to
/// obtain a token.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthenticationService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = auth
        .register(
            &register_data.username,
            &register_data.email,
            &register_data.password,
        )
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Returns a bearer token, the user's id and the token's expiry.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthenticationService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let issued = auth
        .login(&login_data.email, &login_data.password, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(issued))
}
