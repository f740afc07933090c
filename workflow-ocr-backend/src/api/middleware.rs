//! # AppAPI Authentication Middleware
//!
//! The host platform signs every call to this app with four headers:
//!
//! - `AA-VERSION`: AppAPI protocol version
//! - `EX-APP-ID`: must equal the configured `APP_ID`
//! - `EX-APP-VERSION`: must equal the configured `APP_VERSION`
//! - `AUTHORIZATION-APP-API`: base64 of `<user>:<APP_SECRET>`
//!
//! Routes outside the protected router (`/heartbeat`, `/docs`,
//! `/openapi.json`) are not checked. Failures are returned as the usual
//! `ErrorResult` JSON with status 401.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::config::AppConfig;
use crate::error::{OcrBackendError, Result};

pub const AA_VERSION_HEADER: &str = "AA-VERSION";
pub const EX_APP_ID_HEADER: &str = "EX-APP-ID";
pub const EX_APP_VERSION_HEADER: &str = "EX-APP-VERSION";
pub const AUTHORIZATION_HEADER: &str = "AUTHORIZATION-APP-API";

pub async fn app_api_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match authorize(&state.config.app, request.headers()) {
        Ok(user) => {
            debug!(user = %user, "AppAPI request authenticated");
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), "Rejected request: {}", e);
            e.into_response()
        }
    }
}

/// Verify the AppAPI headers and return the calling user name.
pub fn authorize(app: &AppConfig, headers: &HeaderMap) -> Result<String> {
    let Some(secret) = app.app_secret.as_deref() else {
        return Err(unauthorized(
            "APP_SECRET not configured. Set APP_SECRET to enable access.",
        ));
    };

    header(headers, AA_VERSION_HEADER)?;

    let app_id = header(headers, EX_APP_ID_HEADER)?;
    if app_id != app.app_id {
        return Err(unauthorized(format!("Invalid {EX_APP_ID_HEADER}: {app_id}")));
    }

    let app_version = header(headers, EX_APP_VERSION_HEADER)?;
    if app_version != app.app_version {
        return Err(unauthorized(format!(
            "Invalid {EX_APP_VERSION_HEADER}: {} <=> {app_version}",
            app.app_version
        )));
    }

    let (user, provided_secret) = decode_credentials(header(headers, AUTHORIZATION_HEADER)?)?;
    if !constant_time_eq(provided_secret.as_bytes(), secret.as_bytes()) {
        return Err(unauthorized("Invalid app secret"));
    }

    Ok(user)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| unauthorized(format!("Missing header: {name}")))
}

fn decode_credentials(value: &str) -> Result<(String, String)> {
    let decoded = STANDARD
        .decode(value.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| unauthorized(format!("Malformed {AUTHORIZATION_HEADER} header")))?;

    let (user, secret) = decoded
        .split_once(':')
        .ok_or_else(|| unauthorized(format!("Malformed {AUTHORIZATION_HEADER} header")))?;

    Ok((user.to_string(), secret.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn unauthorized(message: impl Into<String>) -> OcrBackendError {
    OcrBackendError::Unauthorized(message.into())
}
