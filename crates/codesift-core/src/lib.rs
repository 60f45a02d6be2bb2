pub mod config;
pub mod context;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use config::{DiffConfig, ImpactWeights, ProcessorConfig};
pub use context::{ProcessingContext, ProcessingStats};
pub use error::{CodeSiftError, Result};
pub use memory::{GcReport, MemoryTracker, ReclaimHook};
pub use traits::{ElementExtractor, RevisionSource, TextSegmenter};
pub use types::{
    ChangeType, ChunkType, CodeChunk, ElementType, FileAnalysis, FileStatus, Language,
    SemanticChange, SemanticElement,
};
