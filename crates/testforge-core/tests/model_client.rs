//! Retry and normalization behavior of `ModelClient` over scripted backends.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use testforge_core::fakes::{ScriptedBackend, ScriptedReply};
use testforge_core::{GenerativeBackend, ModelClient, ModelError};
use tokio::time::Instant;

/// Replays a fixed sequence of replies, one per call, then repeats the last.
struct SequenceBackend {
    replies: Mutex<VecDeque<ScriptedReply>>,
    last: ScriptedReply,
    calls: Mutex<usize>,
}

impl SequenceBackend {
    fn new(replies: Vec<ScriptedReply>) -> Self {
        let last = replies
            .last()
            .cloned()
            .unwrap_or(ScriptedReply::Text(String::new()));
        Self {
            replies: Mutex::new(replies.into()),
            last,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl GenerativeBackend for SequenceBackend {
    async fn generate_raw(&self, _prompt: &str) -> Result<Value, ModelError> {
        *self.calls.lock().unwrap() += 1;
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.last.clone());
        reply.materialize()
    }
}

/// Never answers within any reasonable deadline.
struct StalledBackend {
    calls: Mutex<usize>,
}

#[async_trait]
impl GenerativeBackend for StalledBackend {
    async fn generate_raw(&self, _prompt: &str) -> Result<Value, ModelError> {
        *self.calls.lock().unwrap() += 1;
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(json!({"text": "late"}))
    }
}

#[tokio::test(start_paused = true)]
async fn test_quota_exhaustion_makes_three_attempts() {
    let backend = Arc::new(SequenceBackend::new(vec![ScriptedReply::QuotaExhausted]));
    let client = ModelClient::new(backend.clone());

    let start = Instant::now();
    let err = client.generate("p").await.unwrap_err();

    assert!(matches!(err, ModelError::ResourceExhausted(_)));
    assert_eq!(backend.calls(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_transient_failures() {
    let backend = Arc::new(SequenceBackend::new(vec![
        ScriptedReply::Timeout,
        ScriptedReply::QuotaExhausted,
        ScriptedReply::Text("ok".into()),
    ]));
    let client = ModelClient::new(backend.clone());

    assert_eq!(client.generate("p").await.unwrap(), "ok");
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_error_is_not_retried() {
    let backend = Arc::new(SequenceBackend::new(vec![
        ScriptedReply::Fail("bad request".into()),
        ScriptedReply::Text("never reached".into()),
    ]));
    let client = ModelClient::new(backend.clone());

    let start = Instant::now();
    let err = client.generate("p").await.unwrap_err();

    assert!(matches!(err, ModelError::Http { .. }));
    assert_eq!(backend.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_call_deadline_counts_as_timeout() {
    let backend = Arc::new(StalledBackend {
        calls: Mutex::new(0),
    });
    let client = ModelClient::new(backend.clone()).with_call_timeout(Duration::from_secs(30));

    let err = client.generate("p").await.unwrap_err();

    assert!(matches!(err, ModelError::Timeout(_)));
    assert_eq!(*backend.calls.lock().unwrap(), 3);
}

#[tokio::test]
async fn test_shapes_are_tried_in_priority_order() {
    let payload = json!({
        "text": "direct",
        "generations": [{"text": "from generations"}],
        "candidates": [{"content": {"parts": [{"text": "from candidates"}]}}],
    });
    let client = ModelClient::new(Arc::new(ScriptedBackend::new(ScriptedReply::Raw(payload))));
    assert_eq!(client.generate("p").await.unwrap(), "from generations");

    let payload = json!({"choices": [{"text": "from choices"}]});
    let client = ModelClient::new(Arc::new(ScriptedBackend::new(ScriptedReply::Raw(payload))));
    assert_eq!(client.generate("p").await.unwrap(), "from choices");
}

#[tokio::test]
async fn test_unrecognized_shape_is_not_retried() {
    let backend = Arc::new(ScriptedBackend::new(ScriptedReply::Raw(
        json!({"output": "?"}),
    )));
    let client = ModelClient::new(backend.clone());

    let err = client.generate("p").await.unwrap_err();
    assert!(matches!(err, ModelError::UnrecognizedShape { .. }));
    assert_eq!(backend.calls(), 1);
}
