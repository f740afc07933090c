use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::EngineFailure;

#[derive(Error, Debug)]
pub enum OcrBackendError {
    /// The engine finished with a non-zero code it reports without raising
    /// one of its typed failures.
    #[error("ocr failed ({code})")]
    EngineExit { code: i32 },

    #[error("ocr failed (engine terminated by signal)")]
    EngineTerminated,

    #[error(transparent)]
    Engine(#[from] EngineFailure),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to list installed languages: {0}")]
    LanguageListing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sidecar text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Unauthorized(String),
}

impl OcrBackendError {
    /// Diagnostic class name appended to every error message on the wire.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::EngineExit { .. } | Self::EngineTerminated => "EngineExitError",
            Self::Engine(failure) => failure.kind.discriminator(),
            Self::EngineUnavailable(_) => "EngineUnavailableError",
            Self::Timeout(_) => "TimeoutError",
            Self::LanguageListing(_) => "LanguageListingError",
            Self::Io(_) => "IoError",
            Self::Utf8(_) => "Utf8Error",
            Self::Validation(_) => "ValidationError",
            Self::PayloadTooLarge(_) => "PayloadTooLargeError",
            Self::Unauthorized(_) => "UnauthorizedError",
        }
    }

    /// Engine completion code, only for failures the engine itself raised.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Engine(failure) => Some(failure.exit_code),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_result(&self) -> ErrorResult {
        ErrorResult {
            message: format!("{} ({})", self, self.class_name()),
            ocr_my_pdf_exit_code: self.exit_code(),
        }
    }
}

/// Error entity returned for every failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    /// Error message, suffixed with the failure class name in parentheses.
    pub message: String,
    /// OCRmyPDF exit code, present when the engine raised a typed failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_my_pdf_exit_code: Option<i32>,
}

impl IntoResponse for OcrBackendError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_result())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, OcrBackendError>;
