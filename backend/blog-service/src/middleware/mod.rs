/// HTTP middleware utilities for blog-service
///
/// Provides JWT authentication and request metrics. The identity verifier is
/// built once at startup and read from app data, so tests can inject their own
/// keys.
use crate::error::AppError;
use crate::metrics;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

// =====================================================================
// Identity verification
// =====================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("identity verification is not configured")]
    NotConfigured,
    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token has no subject")]
    MissingSubject,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
}

/// Verifies RS256 bearer tokens and resolves them to a user identifier
#[derive(Clone)]
pub struct IdentityVerifier {
    decoding_key: Option<Arc<DecodingKey>>,
    validation: Validation,
}

impl IdentityVerifier {
    pub fn from_rsa_pem(public_key_pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        Ok(Self {
            decoding_key: Some(Arc::new(decoding_key)),
            validation: Self::validation(),
        })
    }

    /// A verifier that rejects every token. Used when no key is configured
    /// outside production.
    pub fn unconfigured() -> Self {
        Self {
            decoding_key: None,
            validation: Self::validation(),
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation
    }

    /// Validate `token` and return its `sub` claim
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let key = self.decoding_key.as_ref().ok_or(AuthError::NotConfigured)?;
        let data = decode::<Claims>(token, key, &self.validation)?;

        match data.claims.sub {
            Some(sub) if !sub.trim().is_empty() => Ok(sub),
            _ => Err(AuthError::MissingSubject),
        }
    }
}

// =====================================================================
// JWT Authentication
// =====================================================================

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

/// Actix middleware that validates a Bearer token with the app's
/// [`IdentityVerifier`].
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
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
        let service = self.service.clone();

        Box::pin(async move {
            let verifier = req
                .app_data::<web::Data<IdentityVerifier>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("identity verifier not registered".into()))?;

            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

            let user_id = verifier.verify(token).map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                AppError::Unauthorized(e.to_string())
            })?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| AppError::Unauthorized("User ID missing".into()).into()),
        )
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
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
        let service = self.service.clone();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed();

            let (route, status) = match &res {
                Ok(resp) => (
                    resp.request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string()),
                    resp.status().as_u16(),
                ),
                Err(e) => (
                    "unmatched".to_string(),
                    e.as_response_error().status_code().as_u16(),
                ),
            };

            metrics::record_http_request(&method, &route, status, elapsed);
            tracing::debug!(%method, %route, status, elapsed_ms = elapsed.as_millis() as u64, "request completed");
            res
        })
    }
}
