use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info_span, Instrument};

use crate::error::Result;

use super::engine::OcrEngine;
use super::parameters::ParsedParameters;
use super::result::OcrResult;

/// One uploaded document waiting for OCR.
#[derive(Debug, Clone)]
pub struct OcrRequest {
    pub file_name: String,
    pub content: Bytes,
    /// Raw `ocrmypdf_parameters` form value.
    pub parameters: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl OcrRequest {
    pub fn new(file_name: impl Into<String>, content: Bytes, parameters: Option<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
            parameters,
            received_at: Utc::now(),
        }
    }
}

/// Runs single OCR requests: translate parameters, invoke the engine,
/// assemble the result. Holds no per-request state.
#[derive(Clone)]
pub struct OcrService {
    engine: Arc<dyn OcrEngine>,
}

impl OcrService {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub async fn ocr(&self, request: OcrRequest) -> Result<OcrResult> {
        let span = info_span!("ocr", file_name = %request.file_name);
        self.ocr_inner(request).instrument(span).await
    }

    async fn ocr_inner(&self, request: OcrRequest) -> Result<OcrResult> {
        let OcrRequest {
            file_name,
            content,
            parameters,
            received_at,
        } = request;
        let started = Instant::now();

        debug!(
            received_at = %received_at.to_rfc3339(),
            parameters = parameters.as_deref().unwrap_or(""),
            size = content.len(),
            "Start processing file {}",
            file_name
        );

        let params = ParsedParameters::parse(parameters.as_deref());

        let output = match self.engine.process(content, params).await {
            Ok(output) => output,
            Err(e) => {
                error!(
                    error = %e,
                    class = e.class_name(),
                    exit_code = ?e.exit_code(),
                    "OCR failed for file {}",
                    file_name
                );
                return Err(e);
            }
        };

        let result = OcrResult::assemble(file_name.as_str(), output).map_err(|e| {
            error!(
                error = %e,
                class = e.class_name(),
                "Failed to assemble OCR result for file {}",
                file_name
            );
            e
        })?;

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            text_len = result.recognized_text.len(),
            "Finished processing file {}",
            file_name
        );

        Ok(result)
    }

    pub async fn installed_languages(&self) -> Result<Vec<String>> {
        self.engine.installed_languages().await.map_err(|e| {
            error!(error = %e, class = e.class_name(), "Listing installed languages failed");
            e
        })
    }
}
