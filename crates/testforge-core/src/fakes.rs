//! In-memory fakes for the model backend (testing only).
//!
//! `ScriptedBackend` answers prompts from a rule table without any network
//! access and records every prompt it receives.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ModelError;
use crate::model::GenerativeBackend;

/// One canned backend answer.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// `{"text": ...}`
    Text(String),
    /// Payload returned verbatim.
    Raw(Value),
    QuotaExhausted,
    Timeout,
    /// A permanent failure.
    Fail(String),
}

impl ScriptedReply {
    /// A reply whose text is `code` inside a single python fence.
    pub fn fenced(code: &str) -> Self {
        ScriptedReply::Text(format!("Sure.\n```python\n{code}\n```\n"))
    }

    /// The backend result this reply stands for.
    pub fn materialize(&self) -> Result<Value, ModelError> {
        match self {
            ScriptedReply::Text(text) => Ok(json!({ "text": text })),
            ScriptedReply::Raw(value) => Ok(value.clone()),
            ScriptedReply::QuotaExhausted => {
                Err(ModelError::ResourceExhausted("scripted quota".to_string()))
            }
            ScriptedReply::Timeout => Err(ModelError::Timeout("scripted timeout".to_string())),
            ScriptedReply::Fail(msg) => Err(ModelError::Http {
                status: 500,
                body: msg.clone(),
            }),
        }
    }
}

/// Rule-driven backend: the first rule whose needle occurs in the prompt wins.
#[derive(Debug)]
pub struct ScriptedBackend {
    rules: Vec<(String, ScriptedReply)>,
    fallback: ScriptedReply,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    /// Backend that answers every prompt with `fallback`.
    pub fn new(fallback: ScriptedReply) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn when(mut self, needle: impl Into<String>, reply: ScriptedReply) -> Self {
        self.rules.push((needle.into(), reply));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate_raw(&self, prompt: &str) -> Result<Value, ModelError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.fallback)
            .materialize()
    }
}
