//! OpenAI-compatible LLM backend.
//!
//! Works with any OpenAI-compatible chat completions API (vLLM, Ollama,
//! OpenAI, LocalAI).

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use super::traits::*;

/// OpenAI-compatible backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        })
    }

    /// Create a backend pointing to Ollama.
    pub fn ollama(model: &str) -> Result<Self, LlmError> {
        Self::new("http://localhost:11434/v1", model, None)
    }

    /// Create a backend for OpenAI API.
    pub fn openai(model: &str, api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new("https://api.openai.com/v1", model, Some(api_key.into()))
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key.as_ref().map(|k| format!("Bearer {}", k))
    }
}

/// OpenAI chat completion request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatRequest>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormatRequest {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn id(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.base_url);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(header::AUTHORIZATION, auth);
        }

        request
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut messages: Vec<ChatMessage> = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: MessageRole::System.as_str().to_string(),
                content: system.clone(),
            });
        }

        for msg in &request.messages {
            messages.push(ChatMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content.clone(),
            });
        }

        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_output.then(|| ResponseFormatRequest {
                format_type: "json_object".to_string(),
            }),
            stream: false,
        };

        let mut http_request = self.client.post(self.chat_completions_url());

        if let Some(auth) = self.auth_header() {
            http_request = http_request.header(header::AUTHORIZATION, auth);
        }

        let response = http_request
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited { retry_after_ms: None });
            }

            return Err(LlmError::RequestFailed(format!("HTTP {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::ParseError("No choices in response".to_string()))?;

        let usage = chat_response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_ollama_creation() {
        let backend = OpenAiBackend::ollama("llama3.2").unwrap();
        assert_eq!(backend.id(), "llama3.2");
    }

    #[tokio::test]
    async fn test_complete_parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header_matcher("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"category\": \"APPROVE\"}"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 4}
            })))
            .mount(&server)
            .await;

        let backend =
            OpenAiBackend::new(format!("{}/v1", server.uri()), "test", Some("secret".into()))
                .unwrap();
        let response = backend
            .complete(CompletionRequest::user("hi").with_json_output())
            .await
            .unwrap();

        assert_eq!(response.content, "{\"category\": \"APPROVE\"}");
        assert_eq!(response.usage.total(), 16);
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(format!("{}/v1", server.uri()), "test", None).unwrap();
        let result = backend.complete(CompletionRequest::user("hi")).await;
        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
    }
}
