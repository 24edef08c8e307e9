//! Generative backends.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ModelConfig;
use crate::error::ModelError;

/// One network call to a text-generation service.
///
/// Implementations must report quota exhaustion as
/// [`ModelError::ResourceExhausted`] and timeouts as [`ModelError::Timeout`]
/// so the retry policy can tell them apart from permanent failures.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate_raw(&self, prompt: &str) -> Result<Value, ModelError>;
}

/// Google Gemini `generateContent` over REST.
pub struct GeminiBackend {
    config: ModelConfig,
    http_client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("testforge/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model_name
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_raw(&self, prompt: &str) -> Result<Value, ModelError> {
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}]
        });

        debug!(model = %self.config.model_name, prompt_len = prompt.len(), "Calling Gemini");

        let response = self
            .http_client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(classify_http_error(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

const MAX_ERROR_BODY: usize = 500;

/// Map a non-success HTTP response onto the error taxonomy.
pub(crate) fn classify_http_error(status: u16, body: &str) -> ModelError {
    let excerpt = truncate(body, MAX_ERROR_BODY);
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        ModelError::ResourceExhausted(excerpt)
    } else if status == 408 || status == 504 || body.contains("DEADLINE_EXCEEDED") {
        ModelError::Timeout(excerpt)
    } else {
        ModelError::Http {
            status,
            body: excerpt,
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
