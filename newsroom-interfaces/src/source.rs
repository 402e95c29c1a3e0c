use async_trait::async_trait;

use crate::item::{Item, SourceKind};

/// Contract every external content origin implements. Feed format parsing
/// itself (RSS XML, a given JSON API's shape) lives entirely on the far
/// side of this trait: the core never sees anything but fully-populated
/// `Item`s whose `id` values are stable across repeated `fetch()` calls.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Human-readable, unique-within-the-registry name for this source.
    fn name(&self) -> &str;

    fn kind(&self) -> SourceKind;

    /// Fetch whatever is currently available from the origin. A fallible
    /// call; the Aggregator records failures on `SourceState` rather than
    /// retrying internally.
    async fn fetch(&self) -> anyhow::Result<Vec<Item>>;
}
