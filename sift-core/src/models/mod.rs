mod degradation_event;
mod embedding_record;
mod entity;
mod readiness;
mod search_options;
mod search_result;
mod statistics;
mod usage;

pub use degradation_event::DegradationEvent;
pub use embedding_record::{EmbeddingRecord, SimilarityHit};
pub use entity::{Corpus, DisplayFields, Entity};
pub use readiness::{HealthStatus, ReadinessReport};
pub use search_options::{SearchMode, SearchOptions};
pub use search_result::{LexicalHit, ScoreTrace, SearchResult, SourceMethod};
pub use statistics::{
    CacheStats, CoverageStats, EmbeddingStats, EngineStatistics, RerankStats, SearchCounters,
};
pub use usage::EmbeddingUsage;
