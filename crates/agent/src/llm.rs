use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use stockwise_core::config::{LlmConfig, LlmProvider};
use stockwise_core::AdvisoryError;

/// Boundary around the hosted language model. One method, one explicit
/// failure type; the coordinator never sees a concrete SDK.
#[async_trait]
pub trait AdvisoryClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// HTTP client speaking either the OpenAI-compatible chat completions
/// protocol (OpenAI, Ollama) or the Anthropic messages protocol.
pub struct HttpAdvisoryClient {
    client: reqwest::Client,
    provider: LlmProvider,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    timeout_secs: u64,
}

impl HttpAdvisoryClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, AdvisoryError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| AdvisoryError::Transport(error.to_string()))?;

        let base_url = match (&config.base_url, config.provider) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, LlmProvider::OpenAi) => "https://api.openai.com".to_string(),
            (None, LlmProvider::Anthropic) => "https://api.anthropic.com".to_string(),
            (None, LlmProvider::Ollama) => "http://localhost:11434".to_string(),
        };

        Ok(Self {
            client,
            provider: config.provider,
            base_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_request_error(&self, error: reqwest::Error) -> AdvisoryError {
        if error.is_timeout() {
            AdvisoryError::Timeout { waited_secs: self.timeout_secs }
        } else {
            AdvisoryError::Transport(error.to_string())
        }
    }

    async fn complete_chat(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut request = self.client.post(&url).json(&ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: 0.2,
        });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|error| self.map_request_error(error))?;
        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisoryError::Quota(format!("{url} returned 429")));
        }
        if !status.is_success() {
            return Err(AdvisoryError::Transport(format!("{url} returned {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| AdvisoryError::Malformed(error.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AdvisoryError::Malformed("chat response carried no choices".to_string()))
    }

    async fn complete_messages(&self, prompt: &str) -> Result<String, AdvisoryError> {
        let url = format!("{}/v1/messages", self.base_url);
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AdvisoryError::Transport("anthropic api key missing".to_string()))?;

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .json(&MessagesRequest {
                model: &self.model,
                max_tokens: 1024,
                messages: vec![ChatMessage { role: "user", content: prompt }],
            })
            .send()
            .await
            .map_err(|error| self.map_request_error(error))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisoryError::Quota(format!("{url} returned 429")));
        }
        if !status.is_success() {
            return Err(AdvisoryError::Transport(format!("{url} returned {status}")));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|error| AdvisoryError::Malformed(error.to_string()))?;
        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or_else(|| AdvisoryError::Malformed("message response carried no text".to_string()))
    }
}

#[async_trait]
impl AdvisoryClient for HttpAdvisoryClient {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisoryError> {
        match self.provider {
            LlmProvider::OpenAi | LlmProvider::Ollama => self.complete_chat(prompt).await,
            LlmProvider::Anthropic => self.complete_messages(prompt).await,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<MessagesContentBlock>,
}

#[derive(Deserialize)]
struct MessagesContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}
