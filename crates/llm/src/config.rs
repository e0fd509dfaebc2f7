use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Completion endpoint settings.
///
/// `api_key` and `folder_id` have no defaults; without them the client
/// refuses to start.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub folder_id: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Bound on the whole request, connect to last byte.
    pub timeout_secs: u64,
    /// Longest question accepted, in characters.
    pub max_question_len: usize,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key: None,
            folder_id: None,
            model: "yandexgpt-lite".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout_secs: 30,
            max_question_len: 300,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("folder_id", &self.folder_id)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_question_len", &self.max_question_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig {
            api_key: Some("AQVN-secret".to_string()),
            ..LlmConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("AQVN-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
