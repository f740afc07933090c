use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Media type of every document the engine produces.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Raw outputs of one engine run.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// The processed (searchable) PDF.
    pub pdf: Vec<u8>,
    /// Plain-text transcription written alongside the PDF.
    pub sidecar: Vec<u8>,
}

/// Successful OCR response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OcrResult {
    /// Name of the file
    pub filename: String,
    /// Content type of the file. For example: application/pdf
    pub content_type: String,
    /// Recognized text from the file
    pub recognized_text: String,
    /// Base64 encoded file content
    pub file_content: String,
}

impl OcrResult {
    pub fn assemble(filename: impl Into<String>, output: EngineOutput) -> Result<Self> {
        let recognized_text = String::from_utf8(output.sidecar)?;

        Ok(Self {
            filename: filename.into(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            recognized_text,
            file_content: STANDARD.encode(&output.pdf),
        })
    }
}
