//! OCRmyPDF backend running the engine as an external process.
//!
//! ## Requirements
//!
//! - `ocrmypdf` must be installed and available in PATH (or `OCRMYPDF_PATH`)
//! - `tesseract` must be installed (used by ocrmypdf, and queried directly
//!   for the installed languages)

use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::OcrConfig;
use crate::error::{OcrBackendError, Result};

use super::engine::OcrEngine;
use super::failure::EngineFailure;
use super::languages::parse_language_listing;
use super::parameters::ParsedParameters;
use super::result::EngineOutput;

const INPUT_FILE: &str = "input";
const OUTPUT_FILE: &str = "output.pdf";
const SIDECAR_FILE: &str = "sidecar.txt";

/// Time an abandoned engine gets to exit after SIGTERM before the group is killed.
#[cfg(unix)]
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

pub struct OcrMyPdfEngine {
    config: OcrConfig,
}

impl OcrMyPdfEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Check if ocrmypdf can be executed
    pub async fn is_available(&self) -> bool {
        self.version().await.is_ok()
    }

    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.config.ocrmypdf_path)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(&self.config.ocrmypdf_path, e))?;

        if !output.status.success() {
            return Err(OcrBackendError::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.config.ocrmypdf_path, output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn run(&self, input: &[u8], params: &ParsedParameters) -> Result<EngineOutput> {
        // Removed on drop, which covers errors, timeouts and cancelled requests.
        let buffers = tempfile::Builder::new().prefix("ocr-").tempdir()?;
        let input_path = buffers.path().join(INPUT_FILE);
        let output_path = buffers.path().join(OUTPUT_FILE);
        let sidecar_path = buffers.path().join(SIDECAR_FILE);

        tokio::fs::write(&input_path, input).await?;

        let mut cmd = Command::new(&self.config.ocrmypdf_path);
        cmd.arg("--no-progress-bar")
            .args(params.to_cli_args())
            .arg("--sidecar")
            .arg(&sidecar_path)
            .arg("--")
            .arg(&input_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so the workers ocrmypdf forks can be signalled with it.
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(command = ?cmd.as_std(), "Running ocrmypdf");

        let child = cmd
            .spawn()
            .map_err(|e| spawn_error(&self.config.ocrmypdf_path, e))?;
        let group = EngineProcessGroup::new(child.id());
        let output = child.wait_with_output().await?;
        group.release();

        let stderr = String::from_utf8_lossy(&output.stderr);

        match output.status.code() {
            Some(0) => {
                if !stderr.trim().is_empty() {
                    debug!(stderr = %stderr.trim(), "ocrmypdf finished with diagnostics");
                }
            }
            Some(code) => {
                return Err(match EngineFailure::from_engine_run(
                    code,
                    &stderr,
                    &buffers.path().to_string_lossy(),
                ) {
                    Some(failure) => failure.into(),
                    None => {
                        debug!(code, stderr = %stderr.trim(), "ocrmypdf returned an untyped exit code");
                        OcrBackendError::EngineExit { code }
                    }
                });
            }
            None => return Err(OcrBackendError::EngineTerminated),
        }

        let pdf = tokio::fs::read(&output_path).await?;
        let sidecar = read_optional(&sidecar_path).await?;

        Ok(EngineOutput { pdf, sidecar })
    }
}

#[async_trait]
impl OcrEngine for OcrMyPdfEngine {
    async fn process(&self, input: Bytes, params: ParsedParameters) -> Result<EngineOutput> {
        match self.config.timeout_secs {
            0 => self.run(&input, &params).await,
            secs => tokio::time::timeout(Duration::from_secs(secs), self.run(&input, &params))
                .await
                .map_err(|_| OcrBackendError::Timeout(secs))?,
        }
    }

    async fn installed_languages(&self) -> Result<Vec<String>> {
        let tesseract = &self.config.tesseract_path;
        let output = Command::new(tesseract)
            .arg("--list-langs")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                OcrBackendError::LanguageListing(format!("failed to run {tesseract}: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrBackendError::LanguageListing(format!(
                "{tesseract} --list-langs exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let languages = parse_language_listing(&String::from_utf8_lossy(&output.stdout));
        info!(count = languages.len(), "Listed installed tesseract languages");
        Ok(languages)
    }
}

/// Process group of one engine run. Dropped before `release`, i.e. when the
/// run times out or the request is cancelled, it sends SIGTERM to the whole
/// group and SIGKILL after `TERMINATE_GRACE`. `kill_on_drop` alone only
/// reaches the direct child.
#[cfg_attr(not(unix), allow(dead_code))]
struct EngineProcessGroup {
    pgid: Option<i32>,
}

impl EngineProcessGroup {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.and_then(|p| i32::try_from(p).ok()),
        }
    }

    /// The engine finished on its own; nothing to signal.
    fn release(mut self) {
        self.pgid = None;
    }
}

#[cfg(unix)]
impl Drop for EngineProcessGroup {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };

        // SAFETY: killpg only delivers a signal; a group that is already gone yields ESRCH.
        if unsafe { libc::killpg(pgid, libc::SIGTERM) } != 0 {
            return;
        }
        warn!(pgid, "Terminating abandoned ocrmypdf process group");

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                tokio::time::sleep(TERMINATE_GRACE).await;
                // SAFETY: as above.
                unsafe {
                    libc::killpg(pgid, libc::SIGKILL);
                }
            });
        }
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> OcrBackendError {
    if err.kind() == ErrorKind::NotFound {
        OcrBackendError::EngineUnavailable(format!("{program} not found: {err}"))
    } else {
        OcrBackendError::Io(err)
    }
}

/// The engine skips the sidecar when there is nothing to write, which reads
/// as empty text.
async fn read_optional(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
