//! End-to-end streaming over real directories with the tree-sitter
//! extractor.

use codesift_chunk::{collect_stream, ChunkProcessor, ChunkStrategy, LargeCodebaseProcessor};
use codesift_core::{ChunkType, ProcessorConfig};
use codesift_parser::TreeSitterExtractor;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn touch(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn processor(config: ProcessorConfig) -> LargeCodebaseProcessor {
    LargeCodebaseProcessor::new(ChunkProcessor::new(
        config,
        Arc::new(TreeSitterExtractor::new()),
    ))
}

#[tokio::test]
async fn streams_ast_chunks_for_every_supported_file() {
    let dir = TempDir::new().unwrap();
    touch(
        dir.path(),
        "src/math.py",
        "def add(a, b):\n    return a + b\n\ndef sub(a, b):\n    return a - b\n",
    );
    touch(dir.path(), "src/lib.rs", "fn answer() -> u32 {\n    42\n}\n");
    touch(dir.path(), "README.md", "# not source\n");

    let processor = processor(ProcessorConfig::default());
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let chunks = collect_stream(stream).await;

    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().any(|c| c.content.contains("def add")));
    assert!(chunks.iter().any(|c| c.content.contains("def sub")));
    assert!(chunks.iter().any(|c| c.content.contains("fn answer")));
    assert!(chunks
        .iter()
        .all(|c| c.chunk_type == ChunkType::Function));

    let stats = ctx.snapshot();
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.chunks_created, 3);
    assert!(stats.errors.is_empty());
}

#[tokio::test]
async fn oversized_files_are_skipped_not_failed() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "small.py", "def tiny():\n    pass\n");
    touch(
        dir.path(),
        "huge.py",
        &format!("# padding\n{}", "x = 1\n".repeat(200)),
    );

    let config = ProcessorConfig {
        max_file_size_bytes: 64,
        ..Default::default()
    };
    let processor = processor(config);
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let chunks = collect_stream(stream).await;

    assert!(chunks.iter().all(|c| c.file_path.ends_with("small.py")));
    let stats = ctx.snapshot();
    assert_eq!(stats.files_processed, 1);
    // A skip is not an error.
    assert!(stats.errors.is_empty());
}

#[tokio::test]
async fn non_utf8_content_degrades_to_latin1() {
    let dir = TempDir::new().unwrap();
    // 0xE9 is "é" in Latin-1 and invalid UTF-8 on its own.
    fs::write(
        dir.path().join("legacy.py"),
        b"# caf\xe9\ndef brew():\n    pass\n",
    )
    .unwrap();

    let processor = processor(ProcessorConfig::default());
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let chunks = collect_stream(stream).await;

    assert!(!chunks.is_empty());
    assert!(chunks.iter().any(|c| c.content.contains("def brew")));
    assert!(ctx.snapshot().errors.is_empty());
}

#[tokio::test]
async fn text_strategy_covers_unparseable_structure() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "flat.py", "x = 1\ny = 2\nz = 3\n");

    let processor = processor(ProcessorConfig::default());
    let (stream, _ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Text)
        .unwrap();
    let chunks = collect_stream(stream).await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_type, ChunkType::TextChunk);
    assert!(chunks[0].content.contains("y = 2"));
}

#[tokio::test]
async fn one_failing_file_does_not_stop_the_batch() {
    use async_trait::async_trait;
    use codesift_core::{
        CodeSiftError, ElementExtractor, FileAnalysis, Language, SemanticElement,
    };

    // Fails for any content carrying the marker, so one file in the batch
    // errors while its siblings succeed.
    struct FlakyExtractor;

    #[async_trait]
    impl ElementExtractor for FlakyExtractor {
        async fn parse_content(
            &self,
            content: &str,
            _language: &Language,
        ) -> codesift_core::Result<Vec<SemanticElement>> {
            if content.contains("#!fail") {
                return Err(CodeSiftError::Parse("marker hit".into()));
            }
            let lines = content.lines().count().max(1) as u32;
            Ok(vec![SemanticElement::new(
                "whole",
                codesift_core::ElementType::Function,
                1,
                lines,
                content.trim_end(),
            )
            .unwrap()])
        }

        async fn analyze_file(
            &self,
            _file_path: &str,
            _language: &Language,
        ) -> codesift_core::Result<FileAnalysis> {
            Ok(FileAnalysis {
                elements: Vec::new(),
                dependencies: Vec::new(),
                complexity: 1.0,
                line_count: 0,
            })
        }
    }

    let dir = TempDir::new().unwrap();
    touch(dir.path(), "good.py", "x = 1\n");
    touch(dir.path(), "bad.py", "#!fail\n");

    let processor = LargeCodebaseProcessor::new(ChunkProcessor::new(
        ProcessorConfig::default(),
        Arc::new(FlakyExtractor),
    ));
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let chunks = collect_stream(stream).await;

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].file_path.ends_with("good.py"));

    let stats = ctx.snapshot();
    assert_eq!(stats.files_processed, 1);
    assert_eq!(stats.errors.len(), 1);
    assert!(ctx.failed_files().iter().any(|f| f.ends_with("bad.py")));
}

#[tokio::test]
async fn empty_repository_streams_nothing() {
    let dir = TempDir::new().unwrap();
    let processor = processor(ProcessorConfig::default());
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let chunks = collect_stream(stream).await;
    assert!(chunks.is_empty());
    assert_eq!(ctx.snapshot().files_processed, 0);
}

#[tokio::test]
async fn process_single_file_matches_stream_output() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "one.py", "def solo():\n    return 1\n");

    let processor = processor(ProcessorConfig::default());
    let direct = processor
        .process_single_file(&dir.path().join("one.py"), ChunkStrategy::Ast)
        .await
        .unwrap();
    assert_eq!(direct.len(), 1);
    assert!(direct[0].content.contains("def solo"));

    let (stream, _ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    let streamed = collect_stream(stream).await;
    assert_eq!(streamed.len(), 1);
    assert_eq!(streamed[0].content, direct[0].content);
}

#[tokio::test]
async fn stats_snapshot_reports_lines_and_peak_memory() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.py", "def a():\n    pass\n");
    touch(dir.path(), "b.py", "def b():\n    pass\n");

    let processor = processor(ProcessorConfig::default());
    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    collect_stream(stream).await;

    let stats = ctx.snapshot();
    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.lines_processed, 4);
    assert!(stats.peak_memory_mb > 0.0);
}

#[tokio::test]
async fn dropped_stream_stops_launching_batches() {
    use async_trait::async_trait;
    use codesift_core::{ElementExtractor, FileAnalysis, Language, SemanticElement};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor {
        parses: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ElementExtractor for CountingExtractor {
        async fn parse_content(
            &self,
            content: &str,
            _language: &Language,
        ) -> codesift_core::Result<Vec<SemanticElement>> {
            self.parses.fetch_add(1, Ordering::SeqCst);
            let lines = content.lines().count().max(1) as u32;
            Ok(vec![SemanticElement::new(
                "whole",
                codesift_core::ElementType::Function,
                1,
                lines,
                content.trim_end(),
            )
            .unwrap()])
        }

        async fn analyze_file(
            &self,
            _file_path: &str,
            _language: &Language,
        ) -> codesift_core::Result<FileAnalysis> {
            Ok(FileAnalysis {
                elements: Vec::new(),
                dependencies: Vec::new(),
                complexity: 1.0,
                line_count: 0,
            })
        }
    }

    let dir = TempDir::new().unwrap();
    let total = 6;
    for i in 0..total {
        touch(dir.path(), &format!("file_{}.py", i), "def f():\n    pass\n");
    }

    let parses = Arc::new(AtomicUsize::new(0));
    // Width 1 so each file is its own batch.
    let config = ProcessorConfig {
        parallel_processes: 0,
        ..Default::default()
    };
    let processor = LargeCodebaseProcessor::new(ChunkProcessor::new(
        config,
        Arc::new(CountingExtractor {
            parses: Arc::clone(&parses),
        }),
    ));

    let (stream, _ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    drop(stream);

    // Let the detached driver observe the closed channel and wind down.
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(
        parses.load(Ordering::SeqCst) < total,
        "driver kept launching batches after the consumer was gone"
    );
}

#[tokio::test]
async fn memory_pressure_runs_reclaim_hooks_between_batches() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.py", "def a():\n    pass\n");
    touch(dir.path(), "b.py", "def b():\n    pass\n");

    // A test process's RSS is always above 0.8 * 1MB, so every batch
    // boundary crosses the threshold. Width 1 gives two boundaries.
    let config = ProcessorConfig {
        max_memory_mb: 1,
        parallel_processes: 0,
        ..Default::default()
    };
    let processor = processor(config);

    let hook_runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hook_runs);
    processor.memory().register_reclaim_hook(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        0
    }));

    let (stream, ctx) = processor
        .process_repository(dir.path(), ChunkStrategy::Ast)
        .unwrap();
    collect_stream(stream).await;

    // The stream only closes once the driver is done, so by now every
    // post-batch collection pass has run.
    assert!(hook_runs.load(Ordering::SeqCst) >= 2);
    assert_eq!(ctx.snapshot().files_processed, 2);
}
