use async_trait::async_trait;
use axum::body::Bytes;

use crate::error::Result;

use super::parameters::ParsedParameters;
use super::result::EngineOutput;

/// Capability interface of the external OCR engine.
///
/// Implementations must not keep per-request state: every call gets its own
/// buffers, and concurrent calls are independent.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Run OCR on `input`, producing the processed PDF and the sidecar text.
    ///
    /// A typed engine failure is returned as `OcrBackendError::Engine`, a
    /// non-zero completion code without one as `OcrBackendError::EngineExit`.
    async fn process(&self, input: Bytes, params: ParsedParameters) -> Result<EngineOutput>;

    /// Recognition languages installed for the engine, pseudo-languages excluded.
    async fn installed_languages(&self) -> Result<Vec<String>>;
}
