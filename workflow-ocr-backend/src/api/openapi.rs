use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use super::middleware::AUTHORIZATION_HEADER;
use crate::error::ErrorResult;
use crate::ocr::OcrResult;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workflow OCR Backend",
        description = "OCR sidecar service. Runs OCRmyPDF on uploaded documents and returns \
                       a searchable PDF with its recognized text.",
    ),
    paths(
        handlers::ocr::process_ocr,
        handlers::languages::installed_languages,
        handlers::lifecycle::enabled,
        handlers::lifecycle::heartbeat,
    ),
    components(schemas(
        OcrResult,
        ErrorResult,
        handlers::ocr::ProcessOcrForm,
        handlers::lifecycle::EnabledResponse,
        handlers::lifecycle::HeartbeatResponse,
    )),
    tags(
        (name = "ocr", description = "Document OCR and language inventory"),
        (name = "lifecycle", description = "Host platform lifecycle hooks"),
    ),
    security(
        ("app_api_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "app_api_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(AUTHORIZATION_HEADER))),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
