use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrEngine, OcrService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ocr: OcrService,
}

impl AppState {
    pub fn new(config: Config, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            config: Arc::new(config),
            ocr: OcrService::new(engine),
        }
    }
}
