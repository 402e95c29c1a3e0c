pub mod analysis;
pub mod item;
pub mod llm;
pub mod source;
pub mod store;
pub mod top_story;

pub use analysis::{Analysis, AnalysisStage, PipelineStep};
pub use item::{Item, SourceKind};
pub use llm::{ChunkStream, Provider, Request, Response, StreamChunk};
pub use source::SourceAdapter;
pub use store::{AnalysisLookup, AnalysisRecord, Store};
pub use top_story::{CachedTopStory, TopStoryStatus};
