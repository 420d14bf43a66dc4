//! Headless-browser PDF rendering.
//!
//! Resolves a Chromium/Chrome executable (configured path first, then
//! well-known install locations), points it at the tokenized print view
//! with `--print-to-pdf`, and reads the bytes back. The whole invocation is
//! bounded by a timeout so a wedged browser surfaces as a render failure
//! instead of hanging the request.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ApiConfig;

/// Well-known Chromium/Chrome install locations, probed in order when no
/// explicit executable is configured.
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// PDF rendering failures. All user-actionable; mapped to RENDER_FAILURE.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No browser executable could be resolved.
    #[error(
        "No Chromium/Chrome executable found. Set CHROME_EXECUTABLE_PATH \
         or install chromium."
    )]
    BrowserNotFound,

    /// Spawning the browser failed.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// The render did not finish within the configured bound.
    #[error("PDF rendering timed out after {0} seconds")]
    Timeout(u64),

    /// The browser ran but reported failure.
    #[error("Browser exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The output file was missing or unreadable.
    #[error("PDF output missing or unreadable: {0}")]
    Output(String),
}

/// Resolves the browser executable to use.
///
/// Order: explicit configuration, then [`CHROME_CANDIDATES`].
pub fn resolve_executable(configured: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = configured {
        let path = Path::new(path);
        if path.exists() {
            return Some(path.to_path_buf());
        }
        // A configured-but-missing path falls through to probing, matching
        // the lenient resolution order of the print stack this replaces
    }

    CHROME_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

/// Renders the document at `url` to PDF bytes.
pub async fn render_pdf(config: &ApiConfig, url: &str) -> Result<Vec<u8>, RenderError> {
    let executable = resolve_executable(config.chrome_executable.as_deref())
        .ok_or(RenderError::BrowserNotFound)?;

    let scratch = tempfile::tempdir().map_err(|e| RenderError::Output(e.to_string()))?;
    let output_path = scratch.path().join("document.pdf");

    debug!(executable = %executable.display(), url = %url, "Rendering PDF");

    let mut command = Command::new(&executable);
    command
        .arg("--headless")
        .arg("--disable-gpu")
        .arg("--no-sandbox")
        .arg("--no-pdf-header-footer")
        .arg("--virtual-time-budget=10000")
        .arg(format!("--print-to-pdf={}", output_path.display()))
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let result = timeout(Duration::from_secs(config.pdf_timeout_secs), command.output())
        .await
        .map_err(|_| RenderError::Timeout(config.pdf_timeout_secs))?
        .map_err(|e| RenderError::Launch(e.to_string()))?;

    if !result.status.success() {
        return Err(RenderError::Failed {
            status: result.status.to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }

    let bytes = tokio::fs::read(&output_path)
        .await
        .map_err(|e| RenderError::Output(e.to_string()))?;

    info!(url = %url, size = bytes.len(), "PDF rendered");

    Ok(bytes)
}
