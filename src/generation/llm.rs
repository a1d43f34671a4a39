//! LLM-backed test case generator
//!
//! Talks to any OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{parse_json_payload, GenerationError, TestCaseGenerator};
use crate::config::GenerationConfig;
use crate::models::TestCaseContent;

const SYSTEM_PROMPT: &str = "You are a QA engineer who writes functional test cases for \
e-commerce websites. You answer with JSON only.";

/// OpenAI-compatible generator
pub struct LlmGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl LlmGenerator {
    /// Create a new generator
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, GenerationError> {
        Self::with_timeout(base_url, model, Duration::from_secs(60))
    }

    fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Service(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            max_tokens: 4096,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let mut generator = Self::with_timeout(
            &config.base_url,
            &config.model,
            Duration::from_secs(config.timeout_secs),
        )?
        .with_max_tokens(config.max_tokens);
        generator.api_key = config.api_key.clone().filter(|k| !k.is_empty());
        Ok(generator)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn complete(&self, prompt: String) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("Requesting test cases from {} ({})", url, self.model);

        let mut req = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Service("Test case generation timed out".to_string())
            } else {
                GenerationError::Service(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerationError::Service(
                "Rate limited by the generation service. Try again later.".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Service(format!(
                "Generation service returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Service(format!("Failed to parse response: {e}")))?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::Service("Generation service returned no output".to_string()))
    }
}

#[async_trait]
impl TestCaseGenerator for LlmGenerator {
    async fn generate(&self, url: &Url) -> Result<Vec<TestCaseContent>, GenerationError> {
        let reply = self.complete(build_prompt(url)).await?;
        parse_json_payload(&reply)
    }
}

/// Prompt asking for e-commerce functional tests of `url`
fn build_prompt(url: &Url) -> String {
    format!(
        "Write a comprehensive set of functional test cases for the e-commerce website at {url}.\n\
         Cover the key shopping flows: browsing and searching products, adding items to the cart, \
         placing orders and making payments, including common failure scenarios.\n\
         Each test case needs a title, a detailed description, an ordered list of steps and the \
         expected result.\n\
         Reply with a JSON object of the form \
         {{\"testCases\": [{{\"title\": \"...\", \"description\": \"...\", \"steps\": [\"...\"], \
         \"expectedResult\": \"...\"}}]}}."
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP response and return the request body
    async fn serve_once(status: &'static str, body: String) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&buf[header_end..]).to_string()
        });

        (format!("http://{addr}/v1"), handle)
    }

    fn chat_reply(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn test_prompt_mentions_url() {
        let url = Url::parse("https://shop.example.com/").unwrap();
        let prompt = build_prompt(&url);
        assert!(prompt.contains("https://shop.example.com/"));
        assert!(prompt.contains("testCases"));
    }

    #[tokio::test]
    async fn test_generate_from_chat_completion() {
        let content = "```json\n{\"testCases\":[{\"title\":\"Add to cart\",\"description\":\"d\",\"steps\":[\"open product\"],\"expectedResult\":\"cart updated\"}]}\n```";
        let (base_url, server) = serve_once("200 OK", chat_reply(content)).await;

        let generator = LlmGenerator::new(base_url, "test-model")
            .unwrap()
            .with_api_key("sk-test");
        let url = Url::parse("https://shop.example.com").unwrap();
        let cases = generator.generate(&url).await.unwrap();

        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].title, "Add to cart");
        assert_eq!(cases[0].expected_result, "cart updated");

        let request_body = server.await.unwrap();
        assert!(request_body.contains("\"model\":\"test-model\""));
        assert!(request_body.contains("shop.example.com"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_service_error() {
        let (base_url, server) = serve_once("429 Too Many Requests", "{}".to_string()).await;

        let generator = LlmGenerator::new(base_url, "test-model").unwrap();
        let url = Url::parse("https://shop.example.com").unwrap();
        let err = generator.generate(&url).await.unwrap_err();

        assert!(matches!(err, GenerationError::Service(msg) if msg.contains("Rate limited")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_choices_is_service_error() {
        let (base_url, server) = serve_once("200 OK", r#"{"choices":[]}"#.to_string()).await;

        let generator = LlmGenerator::new(base_url, "test-model").unwrap();
        let url = Url::parse("https://shop.example.com").unwrap();
        let err = generator.generate(&url).await.unwrap_err();

        assert!(matches!(err, GenerationError::Service(_)));
        server.await.unwrap();
    }
}
