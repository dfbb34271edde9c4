use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use crate::{errors::AppError, state::AppState};

pub const RATER_ID_HEADER: &str = "x-rater-id";

/// Identity of the caller submitting a rating, taken from `X-Rater-Id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaterId(pub String);

// Bearer token gate for mutating requests.
//
// GETs, the health probe and every path containing "/ratings" pass through untouched.
// The last rule also lets rating submissions (POST) in without a token; rating callers
// rely on that and identify themselves with X-Rater-Id instead.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();
    if request.method() == Method::GET || path == "/healthz" || path.contains("/ratings") {
        return Ok(next.run(request).await);
    }

    let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
    else {
        tracing::warn!("Rejected {} {}: no authorization header", request.method(), path);
        return Err(AppError::Unauthorized("Missing authorization header".into()));
    };

    // Exactly "Bearer <token>": the scheme is case-sensitive and takes a single space.
    let authorized = header
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .is_some_and(|token| token == &*state.auth_token);

    if !authorized {
        tracing::warn!("Rejected {} {}: invalid bearer token", request.method(), path);
        return Err(AppError::Unauthorized("Invalid authorization token".into()));
    }

    Ok(next.run(request).await)
}

// Requires X-Rater-Id on rating submissions and hands it to the handler as `RaterId`.
pub async fn rater_id_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    if request.method() == Method::POST && request.uri().path().contains("/ratings") {
        let rater_id = request
            .headers()
            .get(RATER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| AppError::Unauthorized("Missing X-Rater-Id header".into()))?;

        request.extensions_mut().insert(RaterId(rater_id));
    }

    Ok(next.run(request).await)
}

// CORS configuration using multiple allowed origins from env
pub fn cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .filter_map(|s| match s.trim().parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", s);
                None
            }
        })
        .collect::<Vec<_>>();

    tracing::info!("CORS allowed origins: {:?}", allowed_origins);

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            HeaderName::from_static(RATER_ID_HEADER),
        ])
        .expose_headers([axum::http::header::LOCATION])
        .max_age(Duration::from_secs(3600))
}
