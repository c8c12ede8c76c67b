//! Text recognition for scanned and handwritten images.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct RecognitionError(pub String);

#[async_trait]
pub trait ImageRecognizer: Send + Sync {
    /// Recognize the text in an encoded image. `language` is a tesseract-style
    /// code such as `heb`.
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, RecognitionError>;
}

/// Runs the `tesseract` command line tool, piping the image through stdin.
pub struct TesseractCli {
    binary: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl ImageRecognizer for TesseractCli {
    async fn recognize(&self, image: &[u8], language: &str) -> Result<String, RecognitionError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RecognitionError(format!(
                    "Failed to run {} (is it installed?): {}",
                    self.binary, e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecognitionError("Failed to open tesseract stdin".into()))?;

        // Feed stdin while stdout drains, so a large image can't fill both pipes.
        let image = image.to_vec();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&image).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RecognitionError(format!("Failed to wait for tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognitionError(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        // A broken pipe after a successful run only means tesseract stopped reading early.
        if let Ok(Err(e)) = writer.await {
            tracing::debug!("tesseract stdin closed early: {}", e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
