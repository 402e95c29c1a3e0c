use async_trait::async_trait;
use newsroom_interfaces::{Item, SourceAdapter, SourceKind};
use tokio::sync::Mutex;

/// A static source that replays a fixed batch of items: a stand-in with
/// no network dependency. Used by the demonstration binary and the test
/// suite to exercise the pipeline without a real origin.
pub struct MockAdapter {
    name: String,
    kind: SourceKind,
    items: Mutex<Vec<Item>>,
    fail_next: Mutex<bool>,
}

impl MockAdapter {
    pub fn new(name: impl Into<String>, kind: SourceKind, items: Vec<Item>) -> Self {
        Self {
            name: name.into(),
            kind,
            items: Mutex::new(items),
            fail_next: Mutex::new(false),
        }
    }

    /// Makes the next `fetch()` call return an error, to exercise the
    /// Aggregator's `last_error` bookkeeping in tests.
    pub async fn fail_next_fetch(&self) {
        *self.fail_next.lock().await = true;
    }

    pub async fn push(&self, item: Item) {
        self.items.lock().await.push(item);
    }
}

#[async_trait]
impl SourceAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self) -> anyhow::Result<Vec<Item>> {
        let mut fail_next = self.fail_next.lock().await;
        if *fail_next {
            *fail_next = false;
            anyhow::bail!("mock adapter simulated failure");
        }
        Ok(self.items.lock().await.clone())
    }
}
