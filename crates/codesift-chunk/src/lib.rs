//! Bounded, memory-aware repository chunk streaming.
//!
//! A repository is walked once, its files chunked in fixed-width batches
//! under one of three strategies, and the results delivered through a
//! bounded channel so memory stays proportional to concurrency rather
//! than repository size.

pub mod chunker;
pub mod file_collect;
pub mod processor;
pub mod splitter;

pub use chunker::{ChunkProcessor, ChunkStrategy};
pub use file_collect::collect_files;
pub use processor::{collect_stream, LargeCodebaseProcessor};
pub use splitter::TextSplitter;
