use crate::config::{ANTHROPIC_KEY_VAR, DEFAULT_ANTHROPIC_API_URL, DEFAULT_TRIVIA_MODEL, EnrichConfig};
use crate::error::{EnrichError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 200;

/// Produces a short educational blurb for a label
pub trait TriviaSource: Send + Sync {
    fn find_trivia(&self, label: &str) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Stand-in used when trivia is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrivia;

impl TriviaSource for NoTrivia {
    async fn find_trivia(&self, _label: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

pub fn trivia_prompt(label: &str) -> String {
    format!(
        "Give me 3 brief, interesting facts about \"{}\" in 2-3 sentences. Be concise and educational.",
        label
    )
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Pull `content[0].text` out of a Messages API response body
pub fn parse_trivia_response(body: &str) -> Result<Option<String>> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    Ok(response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct AnthropicTrivia {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicTrivia {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_ANTHROPIC_API_URL.to_string(),
            model: DEFAULT_TRIVIA_MODEL.to_string(),
        })
    }

    /// Fails when `ANTHROPIC_API_KEY` was not provided
    pub fn from_config(config: &EnrichConfig) -> Result<Self> {
        let key = config
            .anthropic_api_key
            .clone()
            .ok_or_else(|| EnrichError::MissingApiKey {
                var: ANTHROPIC_KEY_VAR.to_string(),
            })?;

        Ok(Self::with_timeout(key, config.timeout)?
            .with_base_url(&config.anthropic_api_url)
            .with_model(&config.trivia_model))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TriviaSource for AnthropicTrivia {
    async fn find_trivia(&self, label: &str) -> Result<Option<String>> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: trivia_prompt(label),
            }],
        };

        debug!("Requesting trivia for: {}", label);
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(EnrichError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_trivia_response(&body)
    }
}
