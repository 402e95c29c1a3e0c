use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use newsroom_interfaces::{Item, SourceAdapter, SourceKind};

type FetchFn = Box<dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Item>>> + Send>> + Send + Sync>;

/// Generic poll-based source adapter: wraps an arbitrary fetch closure
/// behind the [`SourceAdapter`] contract. Concrete feed-format parsing
/// (RSS XML, a given JSON API's shape) is out of scope here; real
/// adapters plug their parser into this shape rather than the core
/// growing one per format.
pub struct PollAdapter {
    name: String,
    kind: SourceKind,
    fetch_fn: FetchFn,
}

impl PollAdapter {
    pub fn new<F, Fut>(name: impl Into<String>, kind: SourceKind, fetch_fn: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<Item>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            kind,
            fetch_fn: Box::new(move || Box::pin(fetch_fn())),
        }
    }
}

#[async_trait]
impl SourceAdapter for PollAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> anyhow::Result<Vec<Item>> {
        (self.fetch_fn)().await
    }
}
