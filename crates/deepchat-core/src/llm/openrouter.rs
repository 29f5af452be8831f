use crate::constants::{defaults, endpoints};
use crate::error::CompletionError;
use crate::llm::traits::*;
use serde::Deserialize;
use std::time::Duration;

pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterClient {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout, using defaults: {e}");
                reqwest::Client::new()
            });
        Self {
            client,
            base_url: endpoints::OPENROUTER_BASE_URL.to_string(),
            referer: None,
            title: Some(defaults::APP_TITLE.to_string()),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Site URL sent as `HTTP-Referer` for OpenRouter app attribution.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// App name sent as `X-Title`.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, endpoints::CHAT_COMPLETIONS_PATH)
    }
}

impl Default for OpenRouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull `error.message` out of an error body, falling back to the status text.
fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string())
        })
}

fn parse_content(body: &str) -> Result<String, CompletionError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::terminal(format!("Failed to parse response: {e}")))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::terminal("No choices in API response"))?;

    choice
        .message
        .content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| CompletionError::terminal("Empty completion"))
}

impl OpenRouterClient {
    async fn send(&self, api_key: &str, request: &ChatRequest) -> Result<String, CompletionError> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request);
        if let Some(ref referer) = self.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(ref title) = self.title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(CompletionError::from_status(
                status.as_u16(),
                format!("API Error: {}", error_reason(status, &response_text)),
            ));
        }

        parse_content(&response_text)
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat(&self, api_key: &str, request: &ChatRequest) -> Result<String, CompletionError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let result = self.send(api_key, request).await;
        if let Err(ref e) = result {
            tracing::warn!(
                retryable = e.is_retryable(),
                status = ?e.status(),
                "Error calling OpenRouter API: {e}"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_first_choice() {
        let body = r#"{"id":"gen-1","choices":[
            {"message":{"role":"assistant","content":"first"}},
            {"message":{"role":"assistant","content":"second"}}
        ]}"#;
        assert_eq!(parse_content(body).unwrap(), "first");
    }

    #[test]
    fn test_parse_content_rejects_empty_choices() {
        let err = parse_content(r#"{"choices":[]}"#).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_content_rejects_missing_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let err = parse_content(body).unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.reason(), "Empty completion");

        let body = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert_eq!(parse_content(body).unwrap_err().reason(), "Empty completion");
    }

    #[test]
    fn test_parse_content_rejects_malformed_json() {
        let err = parse_content("<html>gateway</html>").unwrap_err();
        assert!(!err.is_retryable());
        assert!(err.reason().starts_with("Failed to parse response"));
    }

    #[test]
    fn test_error_reason_prefers_api_message() {
        let reason = error_reason(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"No auth credentials found","code":401}}"#,
        );
        assert_eq!(reason, "No auth credentials found");

        let reason = error_reason(reqwest::StatusCode::BAD_GATEWAY, "not json");
        assert_eq!(reason, "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenRouterClient::new().with_base_url("http://127.0.0.1:9999/api/");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9999/api/v1/chat/completions");
    }
}
