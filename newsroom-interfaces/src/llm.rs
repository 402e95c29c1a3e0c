use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Request to an LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

impl Request {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            max_tokens: None,
            stream: false,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Non-streaming response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub content: String,
    pub model: String,
    pub raw_response: String,
    pub error: Option<String>,
}

/// One increment of a streaming response. The sequence is single-producer,
/// single-consumer, finite, and closes after exactly one chunk carrying
/// `done = true` or a non-empty `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
    pub error: Option<String>,
    pub model: Option<String>,
}

impl StreamChunk {
    pub fn delta(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            done: false,
            error: None,
            model: None,
        }
    }

    pub fn terminal(model: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            done: true,
            error: None,
            model: Some(model.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            done: true,
            error: Some(error.into()),
            model: None,
        }
    }
}

pub type ChunkStream = BoxStream<'static, StreamChunk>;

/// Capability-set abstraction over an LLM backend. Realized as a trait
/// rather than a class hierarchy: `generate_stream` is optional because not
/// every backend needs its own streaming implementation distinct from the
/// default non-streaming `generate`.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn available(&self) -> bool;

    async fn generate(&self, request: Request) -> anyhow::Result<Response>;

    /// Default: collects `generate`'s result into a single terminal chunk.
    /// Backends with real server-sent-event streams override this.
    async fn generate_stream(&self, request: Request) -> anyhow::Result<ChunkStream> {
        let response = self.generate(request).await?;
        let model = response.model.clone();
        let chunks = vec![StreamChunk::delta(response.content), StreamChunk::terminal(model)];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
