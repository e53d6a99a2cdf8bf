//! Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::trace;

use super::{GenerationError, SamplingParams, TextGenerator};
use crate::config::SummaryConfig;

/// Canonical Gemini API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const CONNECT_TIMEOUT_SECS: u64 = 10;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Text generator backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Create a generator talking to `api_base`.
    ///
    /// A missing key is accepted; every request then fails with
    /// [`GenerationError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Create a generator from the `[summary]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &SummaryConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.api_base.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.api_base.trim_end_matches('/')
        )
    }
}

/// Build the `generateContent` request body.
fn request_body(prompt: &str, params: &SamplingParams) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "temperature": params.temperature,
            "topP": params.top_p
        }
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Provider(format!("prompt blocked: {reason}")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Malformed("no candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(GenerationError::Malformed(format!(
            "candidate has no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        cut.push_str("...");
        cut
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = self.endpoint(params.model);
        trace!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt, params))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-3-flash-preview:generateContent";

    fn generator_for(server: &MockServer, key: Option<&str>) -> GeminiGenerator {
        GeminiGenerator::new(
            server.uri(),
            key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn text_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("hello", &SamplingParams::EMERGENCY);
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["temperature"], 0.7);
        assert_eq!(body["generationConfig"]["topP"], 0.95);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let generator =
            GeminiGenerator::new("http://localhost:9/v1beta/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            generator.endpoint("m"),
            "http://localhost:9/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Blood O+. " }, { "text": "Call Raj." }] } }]
        }))
        .unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "Blood O+. Call Raj.");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(matches!(
            extract_text(parsed),
            Err(GenerationError::Provider(_))
        ));
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            extract_text(parsed),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let generator = GeminiGenerator::new(
            DEFAULT_API_BASE,
            Some("very-secret".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!format!("{generator:?}").contains("very-secret"));
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let cut = truncate(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.len(), MAX_ERROR_BODY_CHARS + 3);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "temperature": 0.7, "topP": 0.95 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Summary.")))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator_for(&server, Some("test-key"))
            .generate("prompt", &SamplingParams::EMERGENCY)
            .await
            .unwrap();
        assert_eq!(text, "Summary.");
    }

    #[tokio::test]
    async fn test_generate_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator_for(&server, Some("test-key"))
            .generate("prompt", &SamplingParams::EMERGENCY)
            .await
            .unwrap_err();
        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("backend exploded"));
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = generator_for(&server, Some("test-key"))
            .generate("prompt", &SamplingParams::EMERGENCY)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_generate_without_key_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("x")))
            .expect(0)
            .mount(&server)
            .await;

        let err = generator_for(&server, None)
            .generate("prompt", &SamplingParams::EMERGENCY)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_generate_connection_refused() {
        let generator = GeminiGenerator::new(
            "http://127.0.0.1:9",
            Some("test-key".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = generator
            .generate("prompt", &SamplingParams::EMERGENCY)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Http(_)));
    }
}
