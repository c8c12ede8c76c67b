pub mod google;

use std::sync::Arc;

use async_trait::async_trait;

use crate::output::{GeneratedAudio, OutputStore};

pub use google::GoogleTts;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct SynthesisError(pub String);

/// Something that can turn text into MP3 audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, slow: bool) -> Result<Vec<u8>, SynthesisError>;
}

pub struct TtsService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output: OutputStore,
}

impl TtsService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, output: OutputStore) -> Self {
        Self {
            synthesizer,
            output,
        }
    }

    pub fn output(&self) -> &OutputStore {
        &self.output
    }

    /// Synthesize `text` and save it as a new file in the output store.
    pub async fn speak(&self, text: &str, slow: bool) -> Result<GeneratedAudio, SynthesisError> {
        let audio = self.synthesizer.synthesize(text, slow).await?;

        let generated = self
            .output
            .write(&audio)
            .await
            .map_err(|e| SynthesisError(format!("Failed to save audio: {}", e)))?;

        tracing::info!(
            "Generated {} ({} bytes, {} chars, slow={})",
            generated.filename,
            audio.len(),
            text.chars().count(),
            slow
        );

        Ok(generated)
    }
}
