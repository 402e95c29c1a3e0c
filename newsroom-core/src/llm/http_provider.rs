use async_trait::async_trait;
use futures::StreamExt;
use newsroom_interfaces::{ChunkStream, Provider, Request, Response, StreamChunk};
use reqwest::Client;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use super::config::{ProviderConfig, StreamEvent};

/// Concrete backends are data, not code: this single provider type,
/// parameterized by a [`ProviderConfig`], realizes Anthropic, OpenAI,
/// Gemini, Grok, and Ollama alike, trading a per-backend class hierarchy
/// for a capability set carried in the config.
pub struct HttpProvider {
    config: ProviderConfig,
    client: Client,
    stream_client: Client,
    stream_channel_capacity: usize,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig, client: Client, stream_client: Client, stream_channel_capacity: usize) -> Self {
        Self {
            config,
            client,
            stream_client,
            stream_channel_capacity,
        }
    }

    fn apply_auth(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let super::config::AuthScheme::Header { name, prefix } = &self.config.auth {
            if let Some(key) = &self.config.api_key {
                let value = match prefix {
                    Some(prefix) => format!("{prefix}{key}"),
                    None => key.clone(),
                };
                req = req.header(*name, value);
            }
        }
        for (name, value) in &self.config.extra_headers {
            req = req.header(name, value);
        }
        req
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn available(&self) -> bool {
        match self.config.auth {
            super::config::AuthScheme::None => true,
            super::config::AuthScheme::Header { .. } => self.config.has_credentials(),
        }
    }

    async fn generate(&self, request: Request) -> anyhow::Result<Response> {
        let body = (self.config.build_request)(&self.config, &request);
        let req = self.client.post(self.config.endpoint_for(false));
        let req = self.apply_auth(req);
        let resp = req.json(&body).send().await?;
        let status = resp.status();
        let raw_response = resp.text().await?;

        if !status.is_success() {
            let truncated: String = raw_response.chars().take(500).collect();
            warn!(provider = %self.config.name, status = status.as_u16(), "provider returned non-2xx response");
            return Ok(Response {
                content: String::new(),
                model: self.config.model.clone(),
                raw_response,
                error: Some(format!("http {}: {}", status.as_u16(), truncated)),
            });
        }

        let parsed: serde_json::Value = serde_json::from_str(&raw_response)?;
        let (content, model) = (self.config.parse_response)(&self.config, &parsed)?;
        Ok(Response { content, model, raw_response, error: None })
    }

    async fn generate_stream(&self, request: Request) -> anyhow::Result<ChunkStream> {
        let mut request = request;
        request.stream = true;

        let (tx, rx) = tokio::sync::mpsc::channel(self.stream_channel_capacity);
        let body = (self.config.build_request)(&self.config, &request);
        let req = self.stream_client.post(self.config.endpoint_for(true));
        let req = self.apply_auth(req);
        let config = self.config.clone();

        tokio::spawn(async move {
            if let Err(err) = run_stream(req, body, config, tx.clone()).await {
                let _ = tx.send(StreamChunk::failed(err.to_string())).await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Reads the response body as a byte stream, splits it into lines, and
/// forwards each decoded [`StreamEvent`] as a [`StreamChunk`]. Exits as
/// soon as the backend signals completion or the consumer drops its end
/// of the channel (the natural expression of cancellation: `tx.send`
/// fails once nobody is listening).
async fn run_stream(
    req: reqwest::RequestBuilder,
    body: serde_json::Value,
    config: ProviderConfig,
    tx: tokio::sync::mpsc::Sender<StreamChunk>,
) -> anyhow::Result<()> {
    let resp = req.json(&body).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let truncated: String = text.chars().take(500).collect();
        anyhow::bail!("http {}: {}", status.as_u16(), truncated);
    }

    let mut byte_stream = resp.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = byte_stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(pos) = buffer.find('\n') {
            let line = buffer[..pos].trim_end_matches('\r').to_string();
            buffer.drain(..=pos);
            if line.is_empty() {
                continue;
            }

            match (config.parse_stream_line)(&config, &line) {
                StreamEvent::Delta(text) => {
                    if tx.send(StreamChunk::delta(text)).await.is_err() {
                        debug!(provider = %config.name, "stream consumer gone, abandoning");
                        return Ok(());
                    }
                }
                StreamEvent::Done(model) => {
                    let model = model.unwrap_or_else(|| config.model.clone());
                    let _ = tx.send(StreamChunk::terminal(model)).await;
                    return Ok(());
                }
                StreamEvent::Skip => {}
            }
        }
    }

    // Stream ended without an explicit terminal event from the backend.
    let _ = tx.send(StreamChunk::terminal(config.model.clone())).await;
    Ok(())
}
