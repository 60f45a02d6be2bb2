use crate::{CodeSiftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Go,
    Java,
    Cpp,
    Other(String),
}

impl Language {
    /// Map a file extension (without the leading dot) to a language.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext {
            "rs" => Some(Language::Rust),
            "py" | "pyi" => Some(Language::Python),
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" => Some(Language::JavaScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            "cpp" | "cxx" | "cc" | "c" | "hpp" | "hxx" | "h" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Detect the language of a file from its path.
    pub fn detect(file_path: &str) -> Option<Language> {
        let ext = std::path::Path::new(file_path).extension()?.to_str()?;
        Self::from_extension(ext)
    }

    pub fn file_extensions(&self) -> Vec<&'static str> {
        match self {
            Language::Rust => vec!["rs"],
            Language::Python => vec!["py", "pyi"],
            Language::TypeScript => vec!["ts", "tsx"],
            Language::JavaScript => vec!["js", "jsx"],
            Language::Go => vec!["go"],
            Language::Java => vec!["java"],
            Language::Cpp => vec!["cpp", "cxx", "cc", "c", "hpp", "hxx", "h"],
            Language::Other(_) => vec![],
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Go => "go",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rust" => Ok(Language::Rust),
            "python" => Ok(Language::Python),
            "typescript" => Ok(Language::TypeScript),
            "javascript" => Ok(Language::JavaScript),
            "go" => Ok(Language::Go),
            "java" => Ok(Language::Java),
            "cpp" | "c++" => Ok(Language::Cpp),
            other => Ok(Language::Other(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Function,
    Class,
    Method,
    Struct,
    Other(String),
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementType::Function => "function",
            ElementType::Class => "class",
            ElementType::Method => "method",
            ElementType::Struct => "struct",
            ElementType::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "function" => Ok(ElementType::Function),
            "class" => Ok(ElementType::Class),
            "method" => Ok(ElementType::Method),
            "struct" => Ok(ElementType::Struct),
            other => Ok(ElementType::Other(other.to_string())),
        }
    }
}

/// A named, typed, line-bounded unit of source extracted from a parsed
/// syntax tree. Lines are 1-based and inclusive. Never mutated after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticElement {
    pub name: String,
    pub element_type: ElementType,
    pub start_line: u32,
    pub end_line: u32,
    pub content: String,
    pub parameters: Vec<String>,
    pub doc_comment: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl SemanticElement {
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        start_line: u32,
        end_line: u32,
        content: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if end_line < start_line {
            return Err(CodeSiftError::InvalidElement(format!(
                "{}: end_line {} precedes start_line {}",
                name, end_line, start_line
            )));
        }
        Ok(Self {
            name,
            element_type,
            start_line,
            end_line,
            content: content.into(),
            parameters: Vec::new(),
            doc_comment: None,
            metadata: HashMap::new(),
        })
    }

    pub fn with_parameters(mut self, parameters: Vec<String>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_doc_comment(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Number of source lines the element spans (inclusive).
    pub fn line_span(&self) -> u32 {
        self.end_line - self.start_line + 1
    }

    /// Matching key across two revisions: `"{type}:{name}"`, with the
    /// parameter list appended when non-empty.
    pub fn signature(&self) -> String {
        if self.parameters.is_empty() {
            format!("{}:{}", self.element_type, self.name)
        } else {
            format!(
                "{}:{}({})",
                self.element_type,
                self.name,
                self.parameters.join(", ")
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Added => "added",
            ChangeType::Removed => "removed",
            ChangeType::Modified => "modified",
            ChangeType::Unchanged => "unchanged",
        };
        write!(f, "{}", s)
    }
}

/// Persisted output record of one semantic change. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticChange {
    pub file_path: String,
    pub change_type: ChangeType,
    pub element_name: String,
    pub element_type: ElementType,
    pub impact_score: f64,
    pub dependencies: Vec<String>,
}

impl SemanticChange {
    pub fn new(
        file_path: impl Into<String>,
        change_type: ChangeType,
        element_name: impl Into<String>,
        element_type: ElementType,
        impact_score: f64,
    ) -> Result<Self> {
        if !(0.0..=10.0).contains(&impact_score) {
            return Err(CodeSiftError::InvalidOperation(format!(
                "impact score {} outside 0..=10",
                impact_score
            )));
        }
        Ok(Self {
            file_path: file_path.into(),
            change_type,
            element_name: element_name.into(),
            element_type,
            impact_score,
            dependencies: Vec::new(),
        })
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkType {
    Function,
    Class,
    Method,
    Struct,
    SemanticChunk,
    TextChunk,
    Other(String),
}

impl From<&ElementType> for ChunkType {
    fn from(element_type: &ElementType) -> Self {
        match element_type {
            ElementType::Function => ChunkType::Function,
            ElementType::Class => ChunkType::Class,
            ElementType::Method => ChunkType::Method,
            ElementType::Struct => ChunkType::Struct,
            ElementType::Other(s) => ChunkType::Other(s.clone()),
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChunkType::Function => "function",
            ChunkType::Class => "class",
            ChunkType::Method => "method",
            ChunkType::Struct => "struct",
            ChunkType::SemanticChunk => "semantic_chunk",
            ChunkType::TextChunk => "text_chunk",
            ChunkType::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

/// A contiguous, located span of source produced for downstream
/// consumption. Immutable value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChunk {
    pub content: String,
    pub file_path: String,
    pub language: Language,
    pub start_line: u32,
    pub end_line: u32,
    pub chunk_type: ChunkType,
}

impl CodeChunk {
    pub fn new(
        content: impl Into<String>,
        file_path: impl Into<String>,
        language: Language,
        start_line: u32,
        end_line: u32,
        chunk_type: ChunkType,
    ) -> Result<Self> {
        if end_line < start_line {
            return Err(CodeSiftError::InvalidOperation(format!(
                "chunk end_line {} precedes start_line {}",
                end_line, start_line
            )));
        }
        Ok(Self {
            content: content.into(),
            file_path: file_path.into(),
            language,
            start_line,
            end_line,
            chunk_type,
        })
    }
}

/// Per-file status reported by the version-control capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Deleted,
    Modified,
    Unknown,
}

/// File-level analysis produced by the AST extraction facade.
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub elements: Vec<SemanticElement>,
    pub dependencies: Vec<String>,
    pub complexity: f32,
    pub line_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_omits_empty_parameter_list() {
        let el = SemanticElement::new("run", ElementType::Function, 1, 4, "fn run() {}").unwrap();
        assert_eq!(el.signature(), "function:run");
    }

    #[test]
    fn signature_includes_parameters() {
        let el = SemanticElement::new("add", ElementType::Method, 10, 12, "...")
            .unwrap()
            .with_parameters(vec!["a".into(), "b".into()]);
        assert_eq!(el.signature(), "method:add(a, b)");
    }

    #[test]
    fn element_rejects_inverted_line_span() {
        let err = SemanticElement::new("bad", ElementType::Function, 5, 3, "");
        assert!(err.is_err());
    }

    #[test]
    fn line_span_is_inclusive() {
        let el = SemanticElement::new("f", ElementType::Function, 3, 14, "").unwrap();
        assert_eq!(el.line_span(), 12);
    }

    #[test]
    fn extension_detection() {
        assert_eq!(Language::detect("src/main.rs"), Some(Language::Rust));
        assert_eq!(Language::detect("app/models.py"), Some(Language::Python));
        assert_eq!(Language::detect("notes.txt"), None);
        assert_eq!(Language::detect("Makefile"), None);
    }

    #[test]
    fn change_rejects_out_of_range_impact() {
        let err = SemanticChange::new("a.py", ChangeType::Added, "f", ElementType::Function, 11.0);
        assert!(err.is_err());
    }
}
