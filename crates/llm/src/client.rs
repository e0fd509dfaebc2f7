//! Completion endpoint client.

use crate::config::LlmConfig;
use crate::error::{ErrorKind, Result};
use crate::prompt::system_prompt;
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Longest slice of an error body copied into the log.
const ERROR_BODY_LOG_LIMIT: usize = 512;

/// Answers a free-form question given some context (the book being asked
/// about).
#[async_trait]
pub trait Completion: Send + Sync {
    async fn ask(&self, context: &str, question: &str) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

/// Yandex foundation-models completion client.
///
/// # Examples
///
/// ```no_run
/// use shelf_llm::{Completion, LlmConfig, YandexGpt};
///
/// # async fn example() -> shelf_llm::error::Result<()> {
/// let config = LlmConfig {
///     api_key: Some("AQVN...".to_string()),
///     folder_id: Some("b1g...".to_string()),
///     ..LlmConfig::default()
/// };
/// let client = YandexGpt::new(&config)?;
/// let answer = client.ask("Хоббит — Толкин", "О чём эта книга?").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YandexGpt {
    client: Client,
    url: String,
    api_key: String,
    model_uri: String,
    temperature: f64,
    max_tokens: u32,
}

impl YandexGpt {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`MissingCredential`](ErrorKind::MissingCredential) if the
    /// API key or folder is not configured (or blank).
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = non_blank(config.api_key.as_deref()).ok_or_raise(|| ErrorKind::MissingCredential("api_key"))?;
        let folder_id =
            non_blank(config.folder_id.as_deref()).ok_or_raise(|| ErrorKind::MissingCredential("folder_id"))?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: api_key.to_string(),
            model_uri: format!("gpt://{folder_id}/{}", config.model),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request<'a>(&self, system: &'a str, question: &'a str) -> CompletionRequest<'a> {
        CompletionRequest {
            model_uri: self.model_uri.clone(),
            completion_options: CompletionOptions {
                stream: false,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            messages: [
                Message { role: "system", text: system },
                Message { role: "user", text: question },
            ],
        }
    }
}

#[async_trait]
impl Completion for YandexGpt {
    #[instrument(skip(self, question), fields(model = %self.model_uri))]
    async fn ask(&self, context: &str, question: &str) -> Result<String> {
        let system = system_prompt(context);
        let body = self.request(&system, question.trim());

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_BODY_LOG_LIMIT).collect();
            tracing::warn!(status = status.as_u16(), body = %excerpt, "completion endpoint error");
            exn::bail!(ErrorKind::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let parsed: CompletionResponse = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::MalformedResponse)?;
        let answer = parsed
            .result
            .alternatives
            .into_iter()
            .next()
            .map(|alternative| alternative.message.text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_raise(|| ErrorKind::EmptyAnswer)?;
        tracing::debug!(chars = answer.chars().count(), "completion received");
        Ok(answer)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn transport_error(error: reqwest::Error) -> exn::Exn<ErrorKind> {
    let kind = if error.is_timeout() { ErrorKind::Timeout } else { ErrorKind::Transport };
    exn::Exn::from(error).raise(kind)
}
