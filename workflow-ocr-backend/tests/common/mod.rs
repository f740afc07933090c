// Common test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use axum::body::Body;
use axum::http::Request;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tempfile::TempDir;

use workflow_ocr_backend::config::{AppConfig, Config, OcrConfig, ServerConfig};

pub use serial_test::serial;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

// ── Fake engine executables ───────────────────────────────────────────────

/// Behaviour of the fake `ocrmypdf` script.
#[derive(Debug, Clone)]
pub struct FakeOcrMyPdf {
    pub exit_code: i32,
    pub stderr: String,
    /// Written to the sidecar path when set; otherwise no sidecar is produced.
    pub sidecar: Option<String>,
    pub sleep_secs: u32,
}

impl Default for FakeOcrMyPdf {
    fn default() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
            sidecar: Some("This document is ready for OCR\n".to_string()),
            sleep_secs: 0,
        }
    }
}

impl FakeOcrMyPdf {
    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code,
            stderr: stderr.to_string(),
            sidecar: None,
            sleep_secs: 0,
        }
    }

    fn script(&self) -> String {
        let stderr = if self.stderr.is_empty() {
            String::new()
        } else {
            format!("printf '%s\\n' {} >&2", shell_quote(&self.stderr))
        };
        let sidecar = match &self.sidecar {
            Some(text) => format!("printf '%s' {} > \"$sidecar\"", shell_quote(text)),
            None => String::new(),
        };

        format!(
            r#"#!/bin/sh
here="$(dirname "$0")"
if [ "$1" = "--version" ]; then
  echo "16.4.2"
  exit 0
fi
printf '%s\n' "$@" > "$here/args.txt"
sidecar=""
while [ $# -gt 0 ]; do
  case "$1" in
    --sidecar) sidecar="$2"; shift 2 ;;
    --) shift; break ;;
    *) shift ;;
  esac
done
input="$1"
output="$2"
dirname "$input" > "$here/workdir.txt"
sleep {sleep} &
echo $! > "$here/worker.pid"
wait $!
{stderr}
if [ {code} -ne 0 ]; then
  exit {code}
fi
cp "$input" "$output"
{sidecar}
exit 0
"#,
            sleep = self.sleep_secs,
            stderr = stderr,
            code = self.exit_code,
            sidecar = sidecar,
        )
    }
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Directory holding fake `ocrmypdf` and `tesseract` executables.
pub struct EngineFixture {
    pub dir: TempDir,
    pub ocrmypdf: PathBuf,
    pub tesseract: PathBuf,
}

impl EngineFixture {
    pub fn new(ocrmypdf: &FakeOcrMyPdf) -> Self {
        Self::with_languages(ocrmypdf, &["eng", "osd", "deu", "chi_sim"])
    }

    pub fn with_languages(ocrmypdf: &FakeOcrMyPdf, languages: &[&str]) -> Self {
        let dir = tempfile::Builder::new()
            .prefix("fake-engine-")
            .tempdir()
            .expect("Failed to create fake engine directory");

        let ocrmypdf_path = dir.path().join("ocrmypdf");
        write_executable(&ocrmypdf_path, &ocrmypdf.script());

        let mut listing = format!(
            "List of available languages in \"/usr/share/tessdata/\" ({}):\n",
            languages.len()
        );
        for lang in languages {
            listing.push_str(lang);
            listing.push('\n');
        }
        let tesseract_path = dir.path().join("tesseract");
        write_executable(
            &tesseract_path,
            &format!(
                "#!/bin/sh\nif [ \"$1\" != \"--list-langs\" ]; then\n  exit 1\nfi\nprintf '%s' {}\n",
                shell_quote(&listing)
            ),
        );

        Self {
            dir,
            ocrmypdf: ocrmypdf_path,
            tesseract: tesseract_path,
        }
    }

    /// Replace the fake tesseract with one that fails.
    pub fn break_tesseract(&self) {
        write_executable(
            &self.tesseract,
            "#!/bin/sh\necho 'Error opening data file /usr/share/tessdata' >&2\nexit 1\n",
        );
    }

    pub fn ocr_config(&self, timeout_secs: u64) -> OcrConfig {
        OcrConfig {
            ocrmypdf_path: self.ocrmypdf.to_string_lossy().into_owned(),
            tesseract_path: self.tesseract.to_string_lossy().into_owned(),
            timeout_secs,
        }
    }

    /// Arguments of the last fake `ocrmypdf` run, one per element.
    pub fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("args.txt"))
            .expect("ocrmypdf was not invoked")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Scoped buffer directory used by the last fake `ocrmypdf` run.
    pub fn recorded_workdir(&self) -> PathBuf {
        PathBuf::from(
            fs::read_to_string(self.dir.path().join("workdir.txt"))
                .expect("ocrmypdf did not record its working directory")
                .trim(),
        )
    }

    /// PID of the worker the last fake `ocrmypdf` run forked.
    pub fn recorded_worker_pid(&self) -> i32 {
        fs::read_to_string(self.dir.path().join("worker.pid"))
            .expect("ocrmypdf did not record its worker")
            .trim()
            .parse()
            .expect("worker pid is not a number")
    }
}

/// Whether `pid` is still running. Zombies count as gone.
#[cfg(unix)]
pub fn process_alive(pid: i32) -> bool {
    if let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) {
        // state is the first field after the parenthesised command name
        return stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .is_some_and(|state| state != 'Z' && state != 'X');
    }
    if Path::new("/proc/self").exists() {
        return false;
    }
    unsafe { libc::kill(pid, 0) == 0 }
}

/// Poll until `pid` is gone; `false` if it is still running after `limit`.
#[cfg(unix)]
pub async fn wait_for_exit(pid: i32, limit: std::time::Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while process_alive(pid) {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    true
}

#[cfg(unix)]
fn write_executable(path: &Path, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, script).expect("Failed to write fake executable");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .expect("Failed to mark fake executable");
}

#[cfg(not(unix))]
fn write_executable(path: &Path, script: &str) {
    fs::write(path, script).expect("Failed to write fake executable");
}

// ── HTTP helpers ──────────────────────────────────────────────────────────

pub const APP_ID: &str = "workflow_ocr_backend";
pub const APP_VERSION: &str = "1.0.0";
pub const APP_SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "ocr-test-boundary";

pub fn test_config(ocr: OcrConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 10 * 1024 * 1024,
        },
        app: AppConfig {
            app_id: APP_ID.to_string(),
            app_version: APP_VERSION.to_string(),
            app_secret: Some(APP_SECRET.to_string()),
        },
        ocr,
    }
}

/// Request builder carrying valid AppAPI headers.
pub fn signed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("AA-VERSION", "2.0.0")
        .header("EX-APP-ID", APP_ID)
        .header("EX-APP-VERSION", APP_VERSION)
        .header(
            "AUTHORIZATION-APP-API",
            STANDARD.encode(format!("admin:{APP_SECRET}")),
        )
}

/// Encode a `multipart/form-data` body with an optional file part and an
/// optional `ocrmypdf_parameters` part.
pub fn multipart_body(file: Option<(&str, &[u8])>, parameters: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some((name, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(params) = parameters {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"ocrmypdf_parameters\"\r\n\r\n{params}\r\n"
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn process_ocr_request(file: Option<(&str, &[u8])>, parameters: Option<&str>) -> Request<Body> {
    signed("POST", "/process_ocr")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file, parameters)))
        .expect("Failed to build request")
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}
