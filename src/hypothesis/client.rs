//! Typed client for a Gemini-style `generateContent` endpoint

use super::HypothesisConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded answer of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    Text(String),
    /// Well-formed reply that carries no usable text
    NoResult,
}

/// Why a request produced no response at all
#[derive(Error, Debug)]
pub enum ClientError {
    /// Carries no URL; see the `From` impl
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.without_url())
    }
}

/// Header carrying the API key, so it never appears in a request URL
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl From<GenerateContentResponse> for GenerationResponse {
    /// A top-level `text` wins; otherwise the first part of the first
    /// candidate. Blank text counts as no result.
    fn from(raw: GenerateContentResponse) -> Self {
        let from_candidates = raw
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text);

        match raw.text.or(from_candidates) {
            Some(text) if !text.trim().is_empty() => GenerationResponse::Text(text),
            _ => GenerationResponse::NoResult,
        }
    }
}

/// HTTP client bound to one API key and model
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiClient {
    /// `None` when the configuration carries no API key
    pub fn from_config(config: &HypothesisConfig) -> Result<Option<Self>, ClientError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        Ok(Some(Self { http, endpoint, api_key }))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one prompt and decode the reply exactly once
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ClientError> {
        let request = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let bytes = resp.bytes().await?;
        let raw: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> GenerationResponse {
        serde_json::from_str::<GenerateContentResponse>(json).unwrap().into()
    }

    #[test]
    fn test_decode_candidate_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Bearing wear"}]}}]}"#;
        assert_eq!(decode(json), GenerationResponse::Text("Bearing wear".to_string()));
    }

    #[test]
    fn test_decode_top_level_text() {
        assert_eq!(decode(r#"{"text":"Cavitation"}"#), GenerationResponse::Text("Cavitation".to_string()));
    }

    #[test]
    fn test_decode_empty_shapes() {
        assert_eq!(decode("{}"), GenerationResponse::NoResult);
        assert_eq!(decode(r#"{"candidates":[]}"#), GenerationResponse::NoResult);
        assert_eq!(decode(r#"{"candidates":[{"content":{"parts":[]}}]}"#), GenerationResponse::NoResult);
        assert_eq!(decode(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#), GenerationResponse::NoResult);
    }

    #[test]
    fn test_request_body_layout() {
        let request = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#
        );
    }

    #[tokio::test]
    async fn test_transport_error_does_not_reveal_key() {
        let config = HypothesisConfig::default()
            .with_api_key("SUPERSECRETKEY123")
            .with_api_base("http://127.0.0.1:1/v1")
            .with_timeout_secs(2);
        let client = GeminiClient::from_config(&config).unwrap().unwrap();

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{:?}", err);
        assert!(!err.to_string().contains("SUPERSECRETKEY123"), "{}", err);
        assert!(!format!("{:?}", err).contains("SUPERSECRETKEY123"));
        assert!(!client.endpoint().contains("SUPERSECRETKEY123"));
        assert!(!format!("{:?}", client).contains("SUPERSECRETKEY123"));
    }

    #[test]
    fn test_no_key_means_no_client() {
        assert!(GeminiClient::from_config(&HypothesisConfig::default()).unwrap().is_none());

        let config = HypothesisConfig::default()
            .with_api_key("k")
            .with_api_base("http://localhost:1/v1/")
            .with_model("m");
        let client = GeminiClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1/v1/models/m:generateContent");
    }
}
