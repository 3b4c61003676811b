//! Bearer-token middleware
//!
//! Validates the access token from the `Authorization` header with expiry
//! enforced and stores the claims in request extensions. A token whose
//! subject is not a user id is rejected like a bad signature.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{validate_access_token, ExpiryPolicy};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

pub struct JwtMiddleware {
    jwt_config: JwtSettings,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(token) = bearer_token(&req) else {
            tracing::warn!(path = %req.path(), "Missing or invalid Authorization header");
            let err = AppError::Auth(AuthError::MissingToken);
            return Box::pin(async move { Err::<ServiceResponse<B>, Error>(err.into()) });
        };

        let validated = validate_access_token(&token, &self.jwt_config, ExpiryPolicy::Enforce)
            .and_then(|claims| claims.user_id().map(|user_id| (user_id, claims)));

        match validated {
            Ok((user_id, claims)) => {
                tracing::debug!(user_id = %user_id, role = %claims.role, "JWT validated successfully");
                req.extensions_mut().insert(claims);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => {
                let err = AppError::Auth(e);
                Box::pin(async move { Err::<ServiceResponse<B>, Error>(err.into()) })
            }
        }
    }
}
