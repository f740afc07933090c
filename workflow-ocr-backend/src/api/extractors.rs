use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::body::Bytes;
use axum::http::StatusCode;

use crate::error::OcrBackendError;
use crate::ocr::OcrRequest;

const FILE_FIELD: &str = "file";
const PARAMETERS_FIELD: &str = "ocrmypdf_parameters";

/// Used when the upload carries no file name.
const FALLBACK_FILE_NAME: &str = "document";

/// The `multipart/form-data` body of `POST /process_ocr`.
#[derive(Debug)]
pub struct OcrUpload {
    pub file_name: String,
    pub content: Bytes,
    pub parameters: Option<String>,
}

impl OcrUpload {
    pub fn into_request(self) -> OcrRequest {
        OcrRequest::new(self.file_name, self.content, self.parameters)
    }
}

impl<S> FromRequest<S> for OcrUpload
where
    S: Send + Sync,
{
    type Rejection = OcrBackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| OcrBackendError::Validation(format!("Invalid multipart request: {e}")))?;

        let mut file: Option<(String, Bytes)> = None;
        let mut parameters: Option<String> = None;

        while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field
                        .file_name()
                        .filter(|n| !n.is_empty())
                        .unwrap_or(FALLBACK_FILE_NAME)
                        .to_string();
                    let bytes = field.bytes().await.map_err(map_multipart_error)?;
                    file = Some((file_name, bytes));
                }
                PARAMETERS_FIELD => {
                    let text = field.text().await.map_err(map_multipart_error)?;
                    parameters = Some(text);
                }
                _ => {}
            }
        }

        let (file_name, content) = file.ok_or_else(|| {
            OcrBackendError::Validation(format!("Missing required field: {FILE_FIELD}"))
        })?;

        Ok(Self {
            file_name,
            content,
            parameters,
        })
    }
}

fn map_multipart_error(err: MultipartError) -> OcrBackendError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrBackendError::PayloadTooLarge(format!("Upload too large: {}", err.body_text()))
    } else {
        OcrBackendError::Validation(format!("Failed to read multipart body: {}", err.body_text()))
    }
}
