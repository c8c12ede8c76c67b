//! Server configuration read from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub dictionary_path: PathBuf,
    pub static_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tts_language: String,
    pub tts_endpoint: String,
    pub tts_timeout: Duration,
    pub ocr_language: String,
    pub tesseract_bin: String,
    pub max_upload_bytes: usize,
    /// Age after which generated audio is deleted. `None` keeps files forever.
    pub audio_retention: Option<Duration>,
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let retention_secs: u64 = number(&lookup, "AUDIO_RETENTION_SECS", 86_400)?;

        Ok(Self {
            host: string("HOST", "0.0.0.0"),
            port: number(&lookup, "PORT", 8000)?,
            dictionary_path: string("DICTIONARY_PATH", "omeriki_dictionary.csv").into(),
            static_dir: string("STATIC_DIR", "static").into(),
            output_dir: string("OUTPUT_DIR", "outputs").into(),
            tts_language: string("TTS_LANGUAGE", "he"),
            tts_endpoint: string("TTS_ENDPOINT", "https://translate.google.com/translate_tts"),
            tts_timeout: Duration::from_secs(number(&lookup, "TTS_TIMEOUT_SECS", 30)?),
            ocr_language: string("OCR_LANGUAGE", "heb"),
            tesseract_bin: string("TESSERACT_BIN", "tesseract"),
            max_upload_bytes: number(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            audio_retention: (retention_secs > 0).then(|| Duration::from_secs(retention_secs)),
            sweep_interval: Duration::from_secs(number::<_, u64>(&lookup, "SWEEP_INTERVAL_SECS", 3600)?.max(1)),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.dictionary_path, PathBuf::from("omeriki_dictionary.csv"));
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.tts_language, "he");
        assert_eq!(config.ocr_language, "heb");
        assert_eq!(config.audio_retention, Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn overrides_from_environment() {
        let config = config_with(&[
            ("PORT", "9090"),
            ("OUTPUT_DIR", "/tmp/audio"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/audio"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn zero_retention_disables_sweeping() {
        let config = config_with(&[("AUDIO_RETENTION_SECS", "0")]).unwrap();
        assert_eq!(config.audio_retention, None);
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = config_with(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                name: "PORT",
                value: "eighty".into()
            }
        );
    }
}
