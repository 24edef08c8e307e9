//! The model client used by the generation and repair stages.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use super::backend::GenerativeBackend;
use super::retry::RetryPolicy;
use super::shape::normalize_response;
use crate::error::ModelError;

/// `generate(prompt) -> text` over a backend, with bounded retry.
///
/// Each attempt is one backend call, optionally capped by a per-call
/// deadline that surfaces as [`ModelError::Timeout`]. Normalization runs once,
/// on the successful payload, and its failure is never retried.
#[derive(Clone)]
pub struct ModelClient {
    backend: Arc<dyn GenerativeBackend>,
    retry: RetryPolicy,
    call_timeout: Option<Duration>,
}

impl ModelClient {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            call_timeout: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Generate text for `prompt`.
    pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let raw = self
            .retry
            .run(move |attempt| self.attempt(prompt, attempt))
            .await?;

        normalize_response(&raw).map_err(|err| {
            error!(error = %err, "No generated text found in model response");
            err
        })
    }

    async fn attempt(&self, prompt: &str, attempt: u32) -> Result<Value, ModelError> {
        let call = self.backend.generate_raw(prompt);
        let result = match self.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ModelError::Timeout(format!(
                    "no response within {}s",
                    limit.as_secs_f64()
                ))),
            },
            None => call.await,
        };

        if let Err(err) = &result {
            match err {
                ModelError::ResourceExhausted(_) => {
                    error!(attempt, error = %err, "Quota exceeded; check usage and try again later")
                }
                _ => warn!(attempt, error = %err, "Model call failed"),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct SlowBackend;

    #[async_trait]
    impl GenerativeBackend for SlowBackend {
        async fn generate_raw(&self, _prompt: &str) -> Result<Value, ModelError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(json!({"text": "too late"}))
        }
    }

    struct CountingBackend {
        calls: AtomicU32,
        response: Value,
    }

    #[async_trait]
    impl GenerativeBackend for CountingBackend {
        async fn generate_raw(&self, _prompt: &str) -> Result<Value, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_is_retried_then_surfaces() {
        let client = ModelClient::new(Arc::new(SlowBackend)).with_call_timeout(Duration::from_secs(10));
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unrecognized_shape_not_retried() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicU32::new(0),
            response: json!({"unexpected": true}),
        });
        let client = ModelClient::new(backend.clone());

        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, ModelError::UnrecognizedShape { .. }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generate_returns_text() {
        let backend = Arc::new(CountingBackend {
            calls: AtomicU32::new(0),
            response: json!({"generations": [{"text": "generated"}]}),
        });
        let client = ModelClient::new(backend);
        assert_eq!(client.generate("prompt").await.unwrap(), "generated");
    }
}
