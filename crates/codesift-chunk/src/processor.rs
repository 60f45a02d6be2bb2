use crate::chunker::{ChunkProcessor, ChunkStrategy};
use crate::file_collect::collect_files;
use codesift_core::{
    CodeChunk, Language, MemoryTracker, ProcessingContext, ProcessorConfig, Result,
};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Bound on in-flight chunks between producer batches and the consumer.
/// A slow consumer stalls producers instead of growing a queue.
const CHANNEL_CAPACITY: usize = 256;

/// Streams a repository as bounded chunks.
///
/// Files are processed in fixed-width batches of spawned tasks; completed
/// chunks flow through a bounded channel, so peak memory tracks the batch
/// width and channel capacity rather than repository size. After each
/// batch the memory tracker is consulted and a collection pass runs when
/// usage crosses the configured threshold.
pub struct LargeCodebaseProcessor {
    config: ProcessorConfig,
    chunker: Arc<ChunkProcessor>,
    memory: Arc<MemoryTracker>,
}

impl LargeCodebaseProcessor {
    pub fn new(chunker: ChunkProcessor) -> Self {
        let config = chunker.config().clone();
        let memory = Arc::new(MemoryTracker::with_threshold(
            config.max_memory_mb,
            config.gc_threshold,
        ));
        Self {
            config,
            chunker: Arc::new(chunker),
            memory,
        }
    }

    /// The tracker is shared so callers can register reclaim hooks (parse
    /// caches, index buffers) before streaming starts.
    pub fn memory(&self) -> Arc<MemoryTracker> {
        Arc::clone(&self.memory)
    }

    /// Walk `root` and stream every supported file's chunks. Returns the
    /// stream plus the shared context; the context's snapshot is complete
    /// once the stream has been drained.
    ///
    /// Per-file failures are recorded on the context and do not stop the
    /// run. Only file discovery itself can fail here.
    pub fn process_repository(
        &self,
        root: &Path,
        strategy: ChunkStrategy,
    ) -> Result<(ReceiverStream<CodeChunk>, Arc<ProcessingContext>)> {
        let files = collect_files(root, &self.config)?;
        info!(
            "Streaming {} files in batches of {}",
            files.len(),
            self.config.batch_width()
        );

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let ctx = Arc::new(ProcessingContext::new(Arc::clone(&self.memory)));

        let chunker = Arc::clone(&self.chunker);
        let config = self.config.clone();
        let memory = Arc::clone(&self.memory);
        let driver_ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            let width = config.batch_width();
            for batch in files.chunks(width) {
                if tx.is_closed() {
                    debug!("Consumer dropped the stream, not launching further batches");
                    break;
                }
                let tasks: Vec<_> = batch
                    .iter()
                    .cloned()
                    .map(|(path, size)| {
                        let chunker = Arc::clone(&chunker);
                        let config = config.clone();
                        let ctx = Arc::clone(&driver_ctx);
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let display = path.to_string_lossy().into_owned();
                            match process_one(&chunker, &config, &path, size, strategy).await {
                                Ok(Some((chunks, lines))) => {
                                    ctx.record_file(&display, lines, chunks.len());
                                    for chunk in chunks {
                                        if tx.send(chunk).await.is_err() {
                                            // Receiver dropped; stop producing.
                                            return;
                                        }
                                    }
                                }
                                Ok(None) => {}
                                Err(e) => ctx.record_failure(&display, e),
                            }
                        })
                    })
                    .collect();
                join_all(tasks).await;

                if memory.should_trigger_gc() {
                    let report = memory.trigger_gc();
                    info!(
                        "Memory threshold crossed, collected {} objects ({:.1}MB -> {:.1}MB)",
                        report.objects_collected, report.usage_before_mb, report.usage_after_mb
                    );
                    tokio::task::yield_now().await;
                }
            }
        });

        Ok((ReceiverStream::new(rx), ctx))
    }

    /// Chunk one file outside a streaming run. Skipped files (oversized or
    /// unsupported) yield an empty vec.
    pub async fn process_single_file(
        &self,
        path: &Path,
        strategy: ChunkStrategy,
    ) -> Result<Vec<CodeChunk>> {
        let size = tokio::fs::metadata(path).await?.len();
        Ok(process_one(&self.chunker, &self.config, path, size, strategy)
            .await?
            .map(|(chunks, _)| chunks)
            .unwrap_or_default())
    }
}

/// One file's pipeline: size guard, language filter, decode, chunk.
/// `Ok(None)` means the file was skipped rather than failed.
async fn process_one(
    chunker: &ChunkProcessor,
    config: &ProcessorConfig,
    path: &Path,
    size: u64,
    strategy: ChunkStrategy,
) -> Result<Option<(Vec<CodeChunk>, usize)>> {
    if size > config.max_file_size_bytes {
        warn!(
            "Skipping {:?}: {} bytes exceeds the {} byte limit",
            path, size, config.max_file_size_bytes
        );
        return Ok(None);
    }

    let display = path.to_string_lossy();
    let Some(language) = Language::detect(&display) else {
        return Ok(None);
    };
    if !config.supports(&language) {
        debug!("Skipping {:?}: {} not enabled", path, language);
        return Ok(None);
    }

    let content = read_content(path).await?;
    let lines = content.lines().count();
    let chunks = chunker
        .create_chunks(&content, &display, &language, strategy)
        .await?;
    Ok(Some((chunks, lines)))
}

/// Read a file as UTF-8, falling back to a Latin-1 interpretation so one
/// legacy-encoded file cannot fail a run.
async fn read_content(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            debug!("Non-UTF-8 content in {:?}, decoding as Latin-1", path);
            Ok(e.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

/// Convenience: drain a stream into a vec. Test and small-repo helper;
/// large runs should consume the stream incrementally instead.
pub async fn collect_stream(mut stream: ReceiverStream<CodeChunk>) -> Vec<CodeChunk> {
    use tokio_stream::StreamExt;
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk);
    }
    chunks
}
