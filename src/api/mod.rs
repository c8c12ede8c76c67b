pub mod handlers;
pub mod routes;


use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub struct TtsQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub slow: bool,
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    pub message: String,
    pub filename: String,
    pub download_link: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Accepts the usual spellings of a boolean query flag (`true`, `1`, `yes`, `on`, ...).
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "invalid boolean '{}'",
            raw
        ))),
    }
}
