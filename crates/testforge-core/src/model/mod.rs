//! Generative model access.
//!
//! - [`GenerativeBackend`]: one network call, returning the raw JSON payload
//! - [`RetryPolicy`]: bounded fixed-delay retry around that call
//! - [`shape`]: ordered matchers that pull plain text out of the payload
//! - [`ModelClient`]: the three combined behind `generate(prompt) -> text`

pub mod backend;
pub mod client;
pub mod retry;
pub mod shape;

pub use backend::{GeminiBackend, GenerativeBackend};
pub use client::ModelClient;
pub use retry::RetryPolicy;
pub use shape::{normalize_response, ShapeMatcher, RESPONSE_SHAPES};
