//! OCR request pipeline
//!
//! Turns an uploaded document plus a CLI-style parameter string into a
//! searchable PDF and its recognized text, using OCRmyPDF as the engine.
//!
//! # Architecture
//!
//! - `ParsedParameters` translates `--name value` strings into typed options
//! - `OcrEngine` trait defines the engine capability (OCR run, language list)
//! - `OcrMyPdfEngine` implements it by running `ocrmypdf` / `tesseract`
//! - `OcrResult::assemble` packages engine outputs into the response entity
//! - `OcrService` sequences the steps for one request
//!
//! Engine failures keep their OCRmyPDF exit code and discriminator
//! (`EngineFailure`) so the HTTP layer can report them without string
//! inspection.
//!
//! # Usage
//!
//! ```rust,ignore
//! let engine = Arc::new(OcrMyPdfEngine::new(&config.ocr));
//! let service = OcrService::new(engine);
//! let result = service.ocr(OcrRequest::new("scan.pdf", bytes, Some("--language eng".into()))).await?;
//! ```

mod engine;
mod failure;
mod languages;
mod parameters;
mod process;
mod result;
mod service;

pub use engine::OcrEngine;
pub use failure::{EngineFailure, EngineFailureKind};
pub use languages::{parse_language_listing, OSD_PSEUDO_LANGUAGE};
pub use parameters::{ParamValue, ParsedParameters};
pub use process::OcrMyPdfEngine;
pub use result::{EngineOutput, OcrResult, PDF_CONTENT_TYPE};
pub use service::{OcrRequest, OcrService};
