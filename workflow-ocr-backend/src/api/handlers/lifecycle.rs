//! Host lifecycle hooks.
//!
//! The host platform tells the app when it gets enabled or disabled and polls
//! a heartbeat. Neither changes any state here.

use axum::extract::Query;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ErrorResult, OcrBackendError, Result};

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnabledQuery {
    /// New enabled state of the app (`1`/`0`, `true`/`false`).
    pub enabled: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnabledResponse {
    /// Empty on success.
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HeartbeatResponse {
    pub status: String,
}

/// `PUT /enabled`
#[utoipa::path(
    put,
    path = "/enabled",
    tag = "lifecycle",
    params(EnabledQuery),
    responses(
        (status = 200, description = "Notification acknowledged", body = EnabledResponse),
        (status = 422, description = "Missing or invalid flag", body = ErrorResult),
    )
)]
pub async fn enabled(Query(query): Query<EnabledQuery>) -> Result<Json<EnabledResponse>> {
    let raw = query.enabled.ok_or_else(|| {
        OcrBackendError::Validation("Missing query parameter: enabled".to_string())
    })?;
    let enabled = parse_form_bool(&raw).ok_or_else(|| {
        OcrBackendError::Validation("enabled must be one of true/false/1/0/yes/no".to_string())
    })?;

    // Nothing to do currently
    info!("App enabled: {}", enabled);

    Ok(Json(EnabledResponse {
        error: String::new(),
    }))
}

/// `GET /heartbeat`
#[utoipa::path(
    get,
    path = "/heartbeat",
    tag = "lifecycle",
    responses(
        (status = 200, description = "Service is alive", body = HeartbeatResponse),
    )
)]
pub async fn heartbeat() -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse {
        status: "ok".to_string(),
    })
}
