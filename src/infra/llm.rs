use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::API_KEY_ENV;
use crate::error::{AppError, AppResult};
use crate::services::{Completion, LanguageModelService, Prompt, TokenUsage};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.3;

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| {
                AppError::LanguageModel(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self {
            http,
            api_key,
            model,
            base_url,
        })
    }

    fn completions_endpoint(base_url: &str) -> String {
        format!("{}/chat/completions", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModelService for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> AppResult<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "OpenAI API key not configured; set {API_KEY_ENV} or pass --api-key"
                ))
            })?;

        let request_body = ChatRequest::new(&self.model, prompt);
        debug!(model = %self.model, "sending chat completion request");

        let response = self
            .http
            .post(Self::completions_endpoint(&self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call OpenAI: {err}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        if !status.is_success() {
            return Err(AppError::LanguageModel(format!(
                "OpenAI responded with {status}: {body}"
            )));
        }

        parse_chat_response(&body)
    }
}

fn parse_chat_response(body: &str) -> AppResult<Completion> {
    let payload: ChatResponse = serde_json::from_str(body).map_err(|err| {
        AppError::LanguageModel(format!("failed to parse OpenAI response: {err}"))
    })?;

    let text = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| {
            AppError::LanguageModel("OpenAI response contained no message content".to_string())
        })?;

    Ok(Completion {
        text,
        usage: payload.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    })
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, prompt: &'a Prompt) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_completions_endpoint() {
        assert_eq!(
            OpenAiClient::completions_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn serializes_chat_request() {
        let prompt = Prompt {
            system: "You summarize commits.".to_string(),
            user: "Commits: ...".to_string(),
        };
        let json = serde_json::to_value(ChatRequest::new("gpt-3.5-turbo", &prompt))
            .expect("serialize");

        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 800);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Commits: ...");
    }

    #[test]
    fn parses_content_and_usage() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "- Did things"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
        }"#;

        let completion = parse_chat_response(body).expect("parse");

        assert_eq!(completion.text, "- Did things");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                prompt_tokens: 120,
                completion_tokens: 30,
                total_tokens: 150,
            })
        );
    }

    #[test]
    fn rejects_empty_or_malformed_responses() {
        assert!(matches!(
            parse_chat_response(r#"{"choices": []}"#),
            Err(AppError::LanguageModel(_))
        ));
        assert!(matches!(
            parse_chat_response(r#"{"choices": [{"message": {"content": null}}]}"#),
            Err(AppError::LanguageModel(_))
        ));
        assert!(matches!(
            parse_chat_response("<html>bad gateway</html>"),
            Err(AppError::LanguageModel(_))
        ));
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_sending() {
        let client = OpenAiClient::new(None, "m".to_string(), "http://127.0.0.1:9".to_string())
            .expect("client");
        let prompt = Prompt {
            system: String::new(),
            user: String::new(),
        };
        assert!(matches!(
            client.complete(&prompt).await,
            Err(AppError::Configuration(_))
        ));
    }
}
