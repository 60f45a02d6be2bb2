use crate::complexity::cyclomatic_complexity;
use crate::visitor::{collect_dependencies, ElementVisitor};
use crate::LanguageRegistry;
use async_trait::async_trait;
use codesift_core::{
    CodeSiftError, ElementExtractor, FileAnalysis, Language, Result, SemanticElement,
};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

/// Tree-sitter backed implementation of the extraction facade. Parses run
/// on the blocking pool; elements are produced fresh per call and owned by
/// the caller.
pub struct TreeSitterExtractor {
    registry: Arc<LanguageRegistry>,
}

impl TreeSitterExtractor {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(LanguageRegistry::new()),
        }
    }

    pub fn with_registry(registry: Arc<LanguageRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    fn parse_blocking(
        registry: &LanguageRegistry,
        content: &str,
        language: &Language,
    ) -> Result<Vec<SemanticElement>> {
        let mut parser = registry
            .create_parser(language)
            .ok_or_else(|| CodeSiftError::Parse(format!("Unsupported language: {}", language)))?;

        let tree = parser
            .parse(content, None)
            .ok_or_else(|| CodeSiftError::Parse("Failed to parse content".to_string()))?;

        let mut visitor = ElementVisitor::new(language, content);
        visitor.visit(tree.root_node());
        Ok(visitor.elements)
    }
}

impl Default for TreeSitterExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ElementExtractor for TreeSitterExtractor {
    async fn parse_content(
        &self,
        content: &str,
        language: &Language,
    ) -> Result<Vec<SemanticElement>> {
        let registry = self.registry.clone();
        let content = content.to_string();
        let language = language.clone();

        tokio::task::spawn_blocking(move || Self::parse_blocking(&registry, &content, &language))
            .await
            .map_err(|e| CodeSiftError::Parse(e.to_string()))?
    }

    async fn analyze_file(&self, file_path: &str, language: &Language) -> Result<FileAnalysis> {
        let content = fs::read_to_string(file_path).await?;
        let registry = self.registry.clone();
        let language = language.clone();
        let path = file_path.to_string();

        tokio::task::spawn_blocking(move || {
            let mut parser = registry.create_parser(&language).ok_or_else(|| {
                CodeSiftError::Parse(format!("Unsupported language: {}", language))
            })?;
            let tree = parser
                .parse(&content, None)
                .ok_or_else(|| CodeSiftError::Parse(format!("Failed to parse {}", path)))?;

            let mut visitor = ElementVisitor::new(&language, &content);
            visitor.visit(tree.root_node());

            let analysis = FileAnalysis {
                dependencies: collect_dependencies(tree.root_node(), &content),
                complexity: cyclomatic_complexity(&tree.root_node()),
                line_count: content.lines().count(),
                elements: visitor.elements,
            };
            debug!(
                "Analyzed {}: {} elements, {} dependencies, complexity {:.0}",
                path,
                analysis.elements.len(),
                analysis.dependencies.len(),
                analysis.complexity
            );
            Ok(analysis)
        })
        .await
        .map_err(|e| CodeSiftError::Parse(e.to_string()))?
    }
}
