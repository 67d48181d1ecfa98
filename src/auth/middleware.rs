use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage,
};
use chrono::Utc;
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::identity::{AuthError, IdentityExtractor};
use crate::error::AppError;

/// Resolves the caller's identity before the wrapped service runs.
///
/// Wrap only the scopes that need it; public routes sit outside. On success the
/// [`SubjectIdentity`](crate::auth::SubjectIdentity) is stored in the request extensions for
/// [`AuthenticatedUser`](crate::auth::AuthenticatedUser) to pick up.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let extractor = match req.app_data::<web::Data<IdentityExtractor>>() {
            Some(extractor) => extractor.clone(),
            None => {
                log::error!("IdentityExtractor is not registered as app data");
                let app_err = AppError::InternalServerError;
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        let identity = match req.headers().get(AUTHORIZATION) {
            None => extractor.extract(None, Utc::now()),
            Some(value) => match value.to_str() {
                Ok(value) => extractor.extract(Some(value), Utc::now()),
                Err(_) => Err(AuthError::MalformedCredential),
            },
        };

        match identity {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(auth_err) => {
                let app_err = AppError::from(auth_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
