use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::error::{ErrorResult, Result};

/// `GET /installed_languages`
///
/// Tesseract languages available to OCRmyPDF, in the order tesseract lists them.
#[utoipa::path(
    get,
    path = "/installed_languages",
    tag = "ocr",
    responses(
        (status = 200, description = "Installed language codes", body = Vec<String>),
        (status = 500, description = "Listing failed", body = ErrorResult),
    )
)]
pub async fn installed_languages(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.ocr.installed_languages().await?))
}
