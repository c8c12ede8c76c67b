//! Directory of generated audio files.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use uuid::Uuid;

pub const AUDIO_EXTENSION: &str = "mp3";

#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub filename: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    /// Open the store, creating the directory if needed.
    pub fn create(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reserve a fresh, collision-free file name.
    pub fn allocate(&self) -> GeneratedAudio {
        let filename = format!("{}.{}", Uuid::new_v4(), AUDIO_EXTENSION);
        GeneratedAudio {
            path: self.dir.join(&filename),
            filename,
        }
    }

    pub async fn write(&self, audio: &[u8]) -> std::io::Result<GeneratedAudio> {
        let generated = self.allocate();
        tokio::fs::write(&generated.path, audio).await?;
        Ok(generated)
    }

    /// Delete generated files at least `max_age` old. Returns how many were removed.
    pub fn sweep(&self, max_age: Duration) -> std::io::Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !is_generated(&path) {
                continue;
            }

            let modified = match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age >= max_age {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }

        Ok(removed)
    }
}

fn is_generated(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .map(|e| e == AUDIO_EXTENSION)
        .unwrap_or(false);
    let uuid_stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| Uuid::parse_str(s).is_ok())
        .unwrap_or(false);
    has_extension && uuid_stem
}

/// Periodically remove expired audio until the runtime shuts down.
pub async fn run_sweeper(store: OutputStore, max_age: Duration, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let store = store.clone();
        match tokio::task::spawn_blocking(move || store.sweep(max_age)).await {
            Ok(Ok(0)) => {}
            Ok(Ok(n)) => tracing::info!("Removed {} expired audio file(s)", n),
            Ok(Err(e)) => tracing::warn!("Audio sweep failed: {}", e),
            Err(e) => tracing::warn!("Audio sweep task panicked: {}", e),
        }
    }
}
