//! HTTP client for an OpenAI-compatible chat-completion endpoint.

use super::parser::{parse_response, GrammarCheckResult};
use super::prompt::{build_prompt, TEMPERATURE};
use crate::config::Config;
use crate::errors::{DiaryError, DiaryResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: Client,
}

impl CompletionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> DiaryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiaryError::Configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client,
        })
    }

    /// Builds a client from configuration. A missing API key is a
    /// configuration problem, not something a retry would fix.
    pub fn from_config(config: &Config) -> DiaryResult<Self> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            DiaryError::Configuration(
                "no API key set; export DIARY_OPENAI_API_KEY or OPENAI_API_KEY".to_string(),
            )
        })?;
        Self::new(&config.api_base, api_key, &config.model, config.grammar_timeout)
    }

    /// Sends one user message and returns the first completion's text.
    pub async fn complete(&self, prompt: &str) -> DiaryResult<String> {
        debug!(model = %self.model, "sending completion request");

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "completion service returned an error");
            return Err(DiaryError::RemoteService(format!("HTTP {status}: {body}")));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                DiaryError::Timeout(self.timeout)
            } else {
                DiaryError::RemoteService(format!("unexpected response: {e}"))
            }
        })?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DiaryError::RemoteService("response contained no choices".to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> DiaryError {
        if err.is_timeout() {
            DiaryError::Timeout(self.timeout)
        } else {
            DiaryError::RemoteService(err.to_string())
        }
    }
}

/// Runs a grammar check: builds the prompt, calls the service and parses the answer.
pub struct GrammarChecker {
    client: CompletionClient,
}

impl GrammarChecker {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    pub async fn check(&self, text: &str) -> DiaryResult<GrammarCheckResult> {
        let raw = self.client.complete(&build_prompt(text)).await?;
        let result = parse_response(&raw, text);
        debug!(
            explanations = result.explanations.len(),
            "grammar check finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(url: &str) -> CompletionClient {
        CompletionClient::new(url, "test-key", "gpt-3.5-turbo", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn sends_prompt_and_parses_reply() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gpt-3.5-turbo",
                    "temperature": 0.3
                })),
                Matcher::Regex("Text to check:".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant",
                        "content": "Corrected text: I have a dog.\nExplanations:\n- \"has\" -> \"have\""}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let checker = GrammarChecker::new(client(&server.url()));
        let result = checker.check("i has a dog").await.unwrap();

        assert_eq!(result.corrected_text, "I have a dog.");
        assert_eq!(result.explanations, ["\"has\" -> \"have\""]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_remote_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let err = client(&server.url()).complete("x").await.unwrap_err();
        match err {
            DiaryError::RemoteService(message) => assert!(message.contains("401")),
            other => panic!("expected RemoteService, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_a_remote_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = client(&server.url()).complete("x").await.unwrap_err();
        assert!(matches!(err, DiaryError::RemoteService(_)));
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let config = Config {
            api_key: None,
            ..Config::default()
        };
        assert!(matches!(
            CompletionClient::from_config(&config),
            Err(DiaryError::Configuration(_))
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = client("http://localhost:1234/v1/");
        assert_eq!(client.base_url, "http://localhost:1234/v1");
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let timeout = Duration::from_millis(300);
        let client =
            CompletionClient::new(format!("http://{addr}"), "k", "m", timeout).unwrap();

        match client.complete("x").await {
            Err(DiaryError::Timeout(after)) => assert_eq!(after, timeout),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_a_remote_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let err = client(&format!("http://{addr}")).complete("x").await.unwrap_err();
        assert!(matches!(err, DiaryError::RemoteService(_)), "{err:?}");
    }
}
