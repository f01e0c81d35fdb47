// FlowC Engine: OpenAI-Compatible Provider
// Handles OpenAI and any OpenAI-compatible REST API (OpenRouter, Ollama,
// Azure behind a proxy). One request per call; the gateway owns retries.

use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use serde_json::{json, Value};

use crate::atoms::constants::{COMPLETION_TIMEOUT, OPENAI_BASE_URL};
use crate::atoms::error::{EngineError, EngineResult, ProviderError};
use crate::atoms::traits::CompletionProvider;
use crate::atoms::types::CompletionRequest;
use crate::http::{body_excerpt, build_client};

pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Fails with `EngineError::Config` when no API key is configured.
    pub fn new(api_key: Option<&str>, base_url: Option<&str>) -> EngineResult<Self> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| EngineError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(OpenAiProvider {
            client: build_client(COMPLETION_TIMEOUT),
            base_url: base_url.unwrap_or(OPENAI_BASE_URL).trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn body(request: &CompletionRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
    }

    /// Pull `choices[0].message.content` out of a chat completion response.
    fn extract_content(v: &Value) -> Result<String, ProviderError> {
        let content = v["choices"]
            .get(0)
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| ProviderError::Malformed("missing choices[0].message.content".into()))?;
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        info!("[ai] OpenAI request model={} prompt_chars={}", request.model, request.prompt.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&Self::body(request))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body_text = response.text().await.unwrap_or_default();
            error!("[ai] OpenAI error {}: {}", status, body_excerpt(&body_text, 500));
            let message = body_excerpt(&body_text, 200).to_string();
            return Err(if status == 401 || status == 403 {
                ProviderError::Auth(message)
            } else {
                ProviderError::Api { status, message }
            });
        }

        let v: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("invalid JSON: {}", e)))?;
        Self::extract_content(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> Value {
        json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
        })
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = OpenAiProvider::new(None, None).err().unwrap();
        assert!(err.is_fatal());
        assert!(OpenAiProvider::new(Some("  "), None).is_err());
    }

    #[test]
    fn extract_content_variants() {
        assert_eq!(OpenAiProvider::extract_content(&completion("hi")).unwrap(), "hi");
        assert!(matches!(
            OpenAiProvider::extract_content(&completion("   ")),
            Err(ProviderError::EmptyResponse)
        ));
        assert!(matches!(
            OpenAiProvider::extract_content(&json!({"choices": []})),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn sends_model_prompt_and_sampling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "Hello"}],
                "max_tokens": 700
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hi there")))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/v1", server.uri());
        let provider = OpenAiProvider::new(Some("sk-test"), Some(&base)).unwrap();
        let out = provider.complete(&CompletionRequest::new("Hello").with_model("gpt-4o")).await;
        assert_eq!(out.unwrap(), "Hi there");
    }

    #[tokio::test]
    async fn maps_status_codes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;
        let provider = OpenAiProvider::new(Some("sk"), Some(&server.uri())).unwrap();
        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Auth(_)));
    }

    #[tokio::test]
    async fn server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;
        let provider = OpenAiProvider::new(Some("sk"), Some(&server.uri())).unwrap();
        let err = provider.complete(&CompletionRequest::new("x")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 503, .. }));
    }
}
