use async_trait::async_trait;
use newsroom_interfaces::{ChunkStream, Provider, Request, Response, StreamChunk};
use tokio::sync::Mutex;

/// Test/demo double standing in for a real backend without network
/// access. Can be configured to simulate a slow streaming backend for
/// cancellation tests.
pub struct MockProvider {
    name: String,
    available: bool,
    response: String,
    chunk_delay: std::time::Duration,
    calls: Mutex<u32>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: true,
            response: response.into(),
            chunk_delay: std::time::Duration::ZERO,
            calls: Mutex::new(0),
        }
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: false,
            response: String::new(),
            chunk_delay: std::time::Duration::ZERO,
            calls: Mutex::new(0),
        }
    }

    pub fn with_chunk_delay(mut self, delay: std::time::Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    pub async fn call_count(&self) -> u32 {
        *self.calls.lock().await
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn available(&self) -> bool {
        self.available
    }

    async fn generate(&self, _request: Request) -> anyhow::Result<Response> {
        *self.calls.lock().await += 1;
        Ok(Response {
            content: self.response.clone(),
            model: format!("{}-mock", self.name),
            raw_response: self.response.clone(),
            error: None,
        })
    }

    async fn generate_stream(&self, _request: Request) -> anyhow::Result<ChunkStream> {
        *self.calls.lock().await += 1;
        let words: Vec<String> = self.response.split_whitespace().map(|w| format!("{w} ")).collect();
        let model = format!("{}-mock", self.name);
        let delay = self.chunk_delay;

        let (tx, rx) = tokio::sync::mpsc::channel(10);
        tokio::spawn(async move {
            for word in words {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if tx.send(StreamChunk::delta(word)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(StreamChunk::terminal(model)).await;
        });
        Ok(Box::pin(tokio_stream::wrappers::ReceiverStream::new(rx)))
    }
}
