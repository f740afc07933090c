use serde::Deserialize;
use std::env;

pub(crate) fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for request bodies, in bytes.
    pub max_upload_bytes: usize,
}

/// Identity of this app towards the host platform (AppAPI).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_id: String,
    pub app_version: String,
    /// Shared secret the host signs requests with. `None` locks all
    /// authenticated routes.
    pub app_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub ocrmypdf_path: String,
    pub tesseract_path: String,
    /// Per-request engine timeout; `0` lets the engine run until it finishes.
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            ocrmypdf_path: "ocrmypdf".to_string(),
            tesseract_path: "tesseract".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("APP_PORT", 9090),
                max_upload_bytes: parse_env_or("MAX_UPLOAD_SIZE", 104_857_600),
            },
            app: AppConfig {
                app_id: env::var("APP_ID").unwrap_or_else(|_| "workflow_ocr_backend".to_string()),
                app_version: env::var("APP_VERSION")
                    .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
                app_secret: env_non_empty("APP_SECRET"),
            },
            ocr: OcrConfig {
                ocrmypdf_path: env::var("OCRMYPDF_PATH").unwrap_or_else(|_| "ocrmypdf".to_string()),
                tesseract_path: env::var("TESSERACT_PATH")
                    .unwrap_or_else(|_| "tesseract".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 0),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
