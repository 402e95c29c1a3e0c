pub mod aggregator;
pub mod analyzer;
pub mod cancel;
pub mod classification;
pub mod config;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod llm;
pub mod mock_store;
pub mod queue;
pub mod sources;
pub mod top_stories;

pub use aggregator::{Aggregator, HealthCounts, SourceConfig, SourceHealth, SourceState};
pub use analyzer::{Analyzer, StreamMeta};
pub use cancel::CancellationToken;
pub use config::{EngineConfig, ProviderEnv};
pub use correlation::{Cluster, CorrelationEngine, CorrelationOverlay, DuplicateGroup, Entity, EntityKind};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use mock_store::MockStore;
pub use queue::{PollHint, QueueManager, SourceQueue};
pub use top_stories::{ClassificationResult, TopStoriesTracker};
