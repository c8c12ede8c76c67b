use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{SpeechSynthesizer, SynthesisError};

/// Longest text the translate endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

const NORMAL_SPEED: &str = "1";
const SLOW_SPEED: &str = "0.3";

lazy_static! {
    // A clause followed by the punctuation that ends it (Hebrew sof pasuq included).
    static ref CLAUSE_REGEX: Regex = Regex::new(
        r"(?x)
        [^.,;:!?\n׃]+[.,;:!?\n׃]*|   # Clause with trailing punctuation
        [.,;:!?\n׃]+                 # Stray punctuation
        "
    )
    .unwrap();
}

/// Speech through the Google Translate TTS endpoint.
pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl GoogleTts {
    pub fn new(endpoint: &str, language: &str, timeout: Duration) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
            .build()
            .map_err(|e| SynthesisError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            language: language.to_string(),
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        idx: usize,
        total: usize,
        slow: bool,
    ) -> Result<Vec<u8>, SynthesisError> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let speed = if slow { SLOW_SPEED } else { NORMAL_SPEED };

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", self.language.as_str()),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed),
            ])
            .send()
            .await
            .map_err(|e| SynthesisError(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| SynthesisError(format!("Speech service rejected request: {}", e)))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError(format!("Failed to read audio: {}", e)))?;

        if bytes.is_empty() {
            return Err(SynthesisError("Speech service returned no audio".into()));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, slow: bool) -> Result<Vec<u8>, SynthesisError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SynthesisError("No text to speak".into()));
        }

        tracing::debug!("Synthesizing {} chunk(s) in '{}'", chunks.len(), self.language);

        // MP3 frames concatenate into a playable stream.
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, idx, chunks.len(), slow).await?);
        }

        Ok(audio)
    }
}

/// Split text into speakable pieces of at most `max_chars` characters,
/// preferring clause boundaries, then word boundaries.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for clause in CLAUSE_REGEX.find_iter(text) {
        let clause = clause.as_str().trim();
        if !is_speakable(clause) {
            continue;
        }
        if clause.chars().count() <= max_chars {
            pieces.push(clause.to_string());
        } else {
            pieces.extend(split_words(clause, max_chars));
        }
    }

    merge_pieces(pieces, max_chars)
}

fn is_speakable(s: &str) -> bool {
    s.chars().any(|c| c.is_alphanumeric())
}

fn split_words(clause: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in clause.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            out.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };

        if needed > max_chars {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn merge_pieces(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();

    for piece in pieces {
        if let Some(last) = merged.last_mut() {
            if last.chars().count() + 1 + piece.chars().count() <= max_chars {
                last.push(' ');
                last.push_str(&piece);
                continue;
            }
        }
        merged.push(piece);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Requests = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Serve `router` on an ephemeral local port and return its TTS endpoint URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/translate_tts", addr)
    }

    async fn echo_idx(
        State(requests): State<Requests>,
        Query(params): Query<HashMap<String, String>>,
    ) -> String {
        let idx = params.get("idx").cloned().unwrap_or_default();
        requests.lock().unwrap().push(params);
        format!("[{}]", idx)
    }

    async fn recording_tts() -> (GoogleTts, Requests) {
        let requests = Requests::default();
        let router = Router::new()
            .route("/translate_tts", get(echo_idx))
            .with_state(requests.clone());
        let endpoint = serve(router).await;
        let tts = GoogleTts::new(&endpoint, "he", Duration::from_secs(5)).unwrap();
        (tts, requests)
    }

    async fn tts_for(router: Router) -> GoogleTts {
        let endpoint = serve(router).await;
        GoogleTts::new(&endpoint, "he", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn joins_chunk_audio_in_order() {
        let (tts, requests) = recording_tts().await;
        let first = format!("{}.", "א".repeat(90));
        let second = "ב".repeat(90);

        let audio = tts
            .synthesize(&format!("{} {}", first, second), true)
            .await
            .unwrap();
        assert_eq!(audio, b"[0][1]");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);

        assert_eq!(requests[0]["q"], first);
        assert_eq!(requests[0]["tl"], "he");
        assert_eq!(requests[0]["ttsspeed"], "0.3");
        assert_eq!(requests[0]["idx"], "0");
        assert_eq!(requests[0]["total"], "2");
        assert_eq!(requests[0]["textlen"], "91");
        assert_eq!(requests[0]["client"], "tw-ob");
        assert_eq!(requests[0]["ie"], "UTF-8");

        assert_eq!(requests[1]["q"], second);
        assert_eq!(requests[1]["idx"], "1");
        assert_eq!(requests[1]["total"], "2");
        assert_eq!(requests[1]["textlen"], "90");
    }

    #[tokio::test]
    async fn normal_speed_unless_slow() {
        let (tts, requests) = recording_tts().await;

        let audio = tts.synthesize("shalom", false).await.unwrap();
        assert_eq!(audio, b"[0]");

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["ttsspeed"], "1");
        assert_eq!(requests[0]["total"], "1");
        assert_eq!(requests[0]["q"], "shalom");
    }

    #[tokio::test]
    async fn unspeakable_text_sends_no_request() {
        let (tts, requests) = recording_tts().await;

        let err = tts.synthesize(" ... ", false).await.unwrap_err();
        assert_eq!(err.0, "No text to speak");
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_error_is_synthesis_error() {
        let router = Router::new().route(
            "/translate_tts",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let tts = tts_for(router).await;

        let err = tts.synthesize("shalom", false).await.unwrap_err();
        assert!(err.0.starts_with("Speech service rejected request"), "{}", err.0);
        assert!(err.0.contains("500"), "{}", err.0);
    }

    #[tokio::test]
    async fn empty_audio_is_synthesis_error() {
        let router = Router::new().route("/translate_tts", get(|| async { "" }));
        let tts = tts_for(router).await;

        let err = tts.synthesize("shalom", false).await.unwrap_err();
        assert_eq!(err.0, "Speech service returned no audio");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_synthesis_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = format!("http://{}/translate_tts", addr);
        let tts = GoogleTts::new(&endpoint, "he", Duration::from_secs(5)).unwrap();

        let err = tts.synthesize("shalom", false).await.unwrap_err();
        assert!(err.0.starts_with("Request failed"), "{}", err.0);
    }

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(chunk_text("שלום עולם", 100), vec!["שלום עולם"]);
    }

    #[test]
    fn punctuation_only_is_not_speakable() {
        assert!(chunk_text("  ... ?! ", 100).is_empty());
        assert!(chunk_text("", 100).is_empty());
    }

    #[test]
    fn splits_at_clause_boundaries() {
        let chunks = chunk_text("one two three. four five six.", 15);
        assert_eq!(chunks, vec!["one two three.", "four five six."]);
    }

    #[test]
    fn merges_short_clauses() {
        let chunks = chunk_text("a, b, c.", 100);
        assert_eq!(chunks, vec!["a, b, c."]);
    }

    #[test]
    fn long_clause_splits_on_words() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 12);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn overlong_word_is_cut_by_characters() {
        let word = "א".repeat(250);
        let chunks = chunk_text(&word, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_CHUNK_CHARS));
        assert_eq!(chunks.concat(), word);
    }

    #[test]
    fn chunks_count_characters_not_bytes() {
        // 60 Hebrew letters are 120 bytes but fit in one chunk
        let text = "ש".repeat(60);
        assert_eq!(chunk_text(&text, MAX_CHUNK_CHARS).len(), 1);
    }
}
