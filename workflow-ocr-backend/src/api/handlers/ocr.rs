use axum::extract::State;
use axum::Json;

use crate::api::extractors::OcrUpload;
use crate::api::state::AppState;
use crate::error::{ErrorResult, Result};
use crate::ocr::OcrResult;

/// Multipart form accepted by `POST /process_ocr` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ProcessOcrForm {
    /// The file to be processed using OCR.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Additional parameters for the OCRmyPDF process, e.g. `--skip-text --language eng+deu`.
    ocrmypdf_parameters: Option<String>,
}

/// `POST /process_ocr`
///
/// Runs OCR on the uploaded file and returns the searchable PDF together
/// with the recognized text.
#[utoipa::path(
    post,
    path = "/process_ocr",
    tag = "ocr",
    request_body(content_type = "multipart/form-data", content = ProcessOcrForm),
    responses(
        (status = 200, description = "OCR succeeded", body = OcrResult),
        (status = 422, description = "Malformed upload", body = ErrorResult),
        (status = 500, description = "OCR failed", body = ErrorResult),
    )
)]
pub async fn process_ocr(
    State(state): State<AppState>,
    upload: OcrUpload,
) -> Result<Json<OcrResult>> {
    let result = state.ocr.ocr(upload.into_request()).await?;
    Ok(Json(result))
}
