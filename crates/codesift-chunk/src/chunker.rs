use crate::splitter::TextSplitter;
use codesift_core::{
    ChunkType, CodeChunk, ElementExtractor, Language, ProcessorConfig, Result, SemanticElement,
    TextSegmenter,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How a file's content becomes chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// One chunk per extracted semantic element, with real line spans.
    /// Element-free content yields no chunks.
    Ast,
    /// Embedding-backed segmentation under a wall-clock guard; falls back
    /// to `Text` on timeout, error, or when no segmenter is configured.
    Semantic,
    /// Recursive character splitting with overlap.
    Text,
}

/// Turns one file's content into [`CodeChunk`]s under a chosen strategy.
pub struct ChunkProcessor {
    config: ProcessorConfig,
    extractor: Arc<dyn ElementExtractor>,
    segmenter: Option<Arc<dyn TextSegmenter>>,
    splitter: TextSplitter,
}

impl ChunkProcessor {
    pub fn new(config: ProcessorConfig, extractor: Arc<dyn ElementExtractor>) -> Self {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
        Self {
            config,
            extractor,
            segmenter: None,
            splitter,
        }
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn TextSegmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Chunk `content` under `strategy`. The AST strategy goes through the
    /// extraction facade and mirrors it exactly: element-free content
    /// produces an empty result, never a text fallback.
    pub async fn create_chunks(
        &self,
        content: &str,
        file_path: &str,
        language: &Language,
        strategy: ChunkStrategy,
    ) -> Result<Vec<CodeChunk>> {
        match strategy {
            ChunkStrategy::Ast => {
                let elements = self.extractor.parse_content(content, language).await?;
                self.element_chunks(elements, file_path, language)
            }
            ChunkStrategy::Semantic => {
                self.create_chunks_from_content(content, file_path, language, true)
                    .await
            }
            ChunkStrategy::Text => {
                self.create_chunks_from_content(content, file_path, language, false)
                    .await
            }
        }
    }

    /// One chunk per extracted element of the file at `file_path`,
    /// carrying the element's own span. Reads through the extraction
    /// facade's file analysis.
    pub async fn create_chunks_from_ast(
        &self,
        file_path: &str,
        language: &Language,
    ) -> Result<Vec<CodeChunk>> {
        let analysis = self.extractor.analyze_file(file_path, language).await?;
        self.element_chunks(analysis.elements, file_path, language)
    }

    fn element_chunks(
        &self,
        elements: Vec<SemanticElement>,
        file_path: &str,
        language: &Language,
    ) -> Result<Vec<CodeChunk>> {
        elements
            .into_iter()
            .map(|element| {
                let chunk_type = ChunkType::from(&element.element_type);
                CodeChunk::new(
                    element.content,
                    file_path,
                    language.clone(),
                    element.start_line,
                    element.end_line,
                    chunk_type,
                )
            })
            .collect()
    }

    /// Content-based chunking. With `use_semantic` and a configured
    /// segmenter, embedding segmentation runs under the configured timeout;
    /// any failure degrades to plain text splitting.
    pub async fn create_chunks_from_content(
        &self,
        content: &str,
        file_path: &str,
        language: &Language,
        use_semantic: bool,
    ) -> Result<Vec<CodeChunk>> {
        if use_semantic {
            if let Some(segmenter) = &self.segmenter {
                let guard = Duration::from_secs(self.config.semantic_timeout_secs);
                match tokio::time::timeout(guard, segmenter.split_text(content)).await {
                    Ok(Ok(segments)) => {
                        return self.located_chunks(segments, file_path, language, ChunkType::SemanticChunk);
                    }
                    Ok(Err(e)) => {
                        warn!("Semantic segmentation failed for {}: {}", file_path, e);
                    }
                    Err(_) => {
                        warn!(
                            "Semantic segmentation timed out after {}s for {}",
                            self.config.semantic_timeout_secs, file_path
                        );
                    }
                }
            }
        }
        self.text_chunks(content, file_path, language)
    }

    fn text_chunks(
        &self,
        content: &str,
        file_path: &str,
        language: &Language,
    ) -> Result<Vec<CodeChunk>> {
        self.located_chunks(
            self.splitter.split(content),
            file_path,
            language,
            ChunkType::TextChunk,
        )
    }

    /// Content-derived chunks carry approximate spans: each starts at line 1
    /// and ends at its own line count, since overlap makes true file
    /// positions ambiguous.
    fn located_chunks(
        &self,
        segments: Vec<String>,
        file_path: &str,
        language: &Language,
        chunk_type: ChunkType,
    ) -> Result<Vec<CodeChunk>> {
        segments
            .into_iter()
            .filter(|segment| !segment.trim().is_empty())
            .map(|segment| {
                let end_line = segment.matches('\n').count() as u32 + 1;
                CodeChunk::new(
                    segment,
                    file_path,
                    language.clone(),
                    1,
                    end_line,
                    chunk_type.clone(),
                )
            })
            .collect()
    }
}
