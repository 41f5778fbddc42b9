//! OpenAI-compatible chat completion client for image analysis.
//!
//! Sends the prompt text and the image reference as an `image_url`
//! content part to `{base_url}/chat/completions`.

use std::time::Duration;

use async_trait::async_trait;
use receipt_core::{ModelError, SecretString, VisionModel, VisionPrompt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default API base URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Completion length cap for one receipt.
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Chat completion client implementing [`VisionModel`].
#[derive(Clone)]
pub struct OpenAiVisionClient {
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
    max_tokens: u32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrlPart<'a> },
}

#[derive(Serialize)]
struct ImageUrlPart<'a> {
    url: &'a str,
    detail: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl OpenAiVisionClient {
    /// Create a client. The request deadline is owned by the caller, so
    /// only the connect phase is bounded here.
    pub fn new(base_url: &str, model: &str, api_key: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        }
    }

    /// Create a client against the public API with the default model.
    pub fn default_client(api_key: Option<SecretString>) -> Self {
        Self::new(DEFAULT_OPENAI_URL, DEFAULT_MODEL, api_key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, prompt: &VisionPrompt<'a>) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: prompt.instruction,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrlPart {
                            url: prompt.image_url,
                            detail: prompt.detail,
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    async fn complete(&self, prompt: &VisionPrompt<'_>) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or(ModelError::MissingCredential)?;

        let request = self.build_request(prompt);

        debug!(model = %self.model, max_tokens = self.max_tokens, "Calling chat completions API");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = parse_retry_after(response.headers());
            debug!(?retry_after, "Chat completions API rate limited");
            return Err(ModelError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Http {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(ModelError::MissingContent)?;

        debug!(chars = text.len(), "Received completion");
        Ok(text)
    }
}

/// Read the back-off hint from `retry-after-ms` or `retry-after` (seconds).
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
    };

    if let Some(ms) = header("retry-after-ms").and_then(|v| v.parse::<u64>().ok()) {
        return Some(Duration::from_millis(ms));
    }

    header("retry-after")
        .and_then(|v| v.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Pull `error.message` out of an API error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use receipt_core::{
        AnalysisError, AnalysisRequest, AnalyzerConfig, ErrorKind, ReceiptAnalyzer, RECEIPT_PROMPT,
    };
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenAiVisionClient {
        OpenAiVisionClient::new(
            &server.uri(),
            DEFAULT_MODEL,
            Some(SecretString::new("sk-test")),
        )
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": text },
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_sends_fixed_prompt_with_high_detail_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 500,
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": RECEIPT_PROMPT },
                        {
                            "type": "image_url",
                            "image_url": { "url": "https://example.com/r.jpg", "detail": "high" }
                        }
                    ]
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Store Name: Deli")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap();
        assert_eq!(text, "Store Name: Deli");
    }

    #[tokio::test]
    async fn test_rate_limit_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_json(json!({ "error": { "message": "Rate limit reached" } })),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        match err {
            ModelError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_huge_retry_after_still_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1e20"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::RateLimited { retry_after: None }));
    }

    #[tokio::test]
    async fn test_server_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid image URL", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        match err {
            ModelError::Http { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid image URL");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": null } }]
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingContent));
    }

    #[tokio::test]
    async fn test_unparseable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client(&server)
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let client = OpenAiVisionClient::new(&server.uri(), DEFAULT_MODEL, None);
        assert!(!client.has_credential());
        let err = client
            .complete(&VisionPrompt::for_receipt("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingCredential));
    }

    #[tokio::test]
    async fn test_analyzer_deadline_cancels_slow_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("too late"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let analyzer = ReceiptAnalyzer::new(
            Arc::new(client(&server)),
            AnalyzerConfig {
                timeout: Duration::from_millis(200),
                ..AnalyzerConfig::default()
            },
        );

        let err = analyzer
            .analyze(AnalysisRequest::new("https://example.com/r.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout { .. }));
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_parse_retry_after_variants() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert("retry-after", "2.5".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(2500)));

        headers.insert("retry-after-ms", "750".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_parse_retry_after_out_of_range_is_ignored() {
        for value in ["1e20", "-3", "NaN", "inf", "soon"] {
            let mut headers = HeaderMap::new();
            headers.insert("retry-after", value.parse().unwrap());
            assert_eq!(parse_retry_after(&headers), None, "retry-after: {value}");
        }
    }

    #[test]
    fn test_extract_error_message_fallbacks() {
        assert_eq!(extract_error_message(""), "empty response body");
        assert_eq!(extract_error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
