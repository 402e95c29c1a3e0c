use std::time::Duration;

use reqwest::Client;

/// The three process-wide HTTP clients, shared by every [`super::HttpProvider`].
#[derive(Clone)]
pub struct SharedClients {
    /// Short-lived requests (health probes, zinger batches). 30s timeout.
    pub default: Client,
    /// Single-item and top-stories analysis calls. 120s timeout.
    pub long: Client,
    /// Streaming analysis. No overall timeout; cancellation is the only way out.
    pub streaming: Client,
}

impl SharedClients {
    pub fn new() -> Self {
        Self {
            default: build(Some(Duration::from_secs(30))),
            long: build(Some(Duration::from_secs(120))),
            streaming: build(None),
        }
    }
}

impl Default for SharedClients {
    fn default() -> Self {
        Self::new()
    }
}

fn build(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().expect("failed to build shared HTTP client")
}
