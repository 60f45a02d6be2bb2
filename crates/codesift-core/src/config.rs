use crate::Language;
use serde::{Deserialize, Serialize};

/// Configuration for chunking and repository processing.
///
/// Values arrive pre-validated from the configuration layer; the
/// operational constants live here as named, overridable fields rather
/// than inline literals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    #[serde(default = "ProcessorConfig::default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "ProcessorConfig::default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "ProcessorConfig::default_max_memory_mb")]
    pub max_memory_mb: u64,
    #[serde(default = "ProcessorConfig::default_parallel_processes")]
    pub parallel_processes: usize,
    #[serde(default = "ProcessorConfig::default_supported_languages")]
    pub supported_languages: Vec<Language>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Files larger than this are skipped with a warning, not an error.
    #[serde(default = "ProcessorConfig::default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
    /// Wall-clock guard on one embedding-based segmentation call.
    #[serde(default = "ProcessorConfig::default_semantic_timeout_secs")]
    pub semantic_timeout_secs: u64,
    /// Fraction of `max_memory_mb` above which a collection pass runs.
    #[serde(default = "ProcessorConfig::default_gc_threshold")]
    pub gc_threshold: f64,
    /// Upper bound on batch width regardless of parallelism.
    #[serde(default = "ProcessorConfig::default_max_batch_size")]
    pub max_batch_size: usize,
}

impl ProcessorConfig {
    fn default_chunk_size() -> usize {
        1000
    }

    fn default_chunk_overlap() -> usize {
        200
    }

    fn default_max_memory_mb() -> u64 {
        1024
    }

    fn default_parallel_processes() -> usize {
        num_cpus::get()
    }

    fn default_supported_languages() -> Vec<Language> {
        vec![
            Language::Rust,
            Language::Python,
            Language::TypeScript,
            Language::JavaScript,
            Language::Go,
            Language::Java,
            Language::Cpp,
        ]
    }

    fn default_max_file_size_bytes() -> u64 {
        50 * 1024 * 1024
    }

    fn default_semantic_timeout_secs() -> u64 {
        60
    }

    fn default_gc_threshold() -> f64 {
        0.8
    }

    fn default_max_batch_size() -> usize {
        20
    }

    /// Batch width: `min(parallel_processes * 2, max_batch_size)`, at least 1.
    pub fn batch_width(&self) -> usize {
        (self.parallel_processes * 2).min(self.max_batch_size).max(1)
    }

    pub fn supports(&self, language: &Language) -> bool {
        self.supported_languages.contains(language)
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::default_chunk_size(),
            chunk_overlap: Self::default_chunk_overlap(),
            max_memory_mb: Self::default_max_memory_mb(),
            parallel_processes: Self::default_parallel_processes(),
            supported_languages: Self::default_supported_languages(),
            exclude_patterns: Vec::new(),
            max_file_size_bytes: Self::default_max_file_size_bytes(),
            semantic_timeout_secs: Self::default_semantic_timeout_secs(),
            gc_threshold: Self::default_gc_threshold(),
            max_batch_size: Self::default_max_batch_size(),
        }
    }
}

/// Multipliers applied when scoring a signature-matched change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactWeights {
    #[serde(default = "ImpactWeights::default_class_weight")]
    pub class_weight: f64,
    #[serde(default = "ImpactWeights::default_function_weight")]
    pub function_weight: f64,
    #[serde(default = "ImpactWeights::default_removed_weight")]
    pub removed_weight: f64,
    /// Applied when the element spans more than 100 lines.
    #[serde(default = "ImpactWeights::default_large_span_weight")]
    pub large_span_weight: f64,
    /// Applied when the element spans 51 to 100 lines.
    #[serde(default = "ImpactWeights::default_medium_span_weight")]
    pub medium_span_weight: f64,
    #[serde(default = "ImpactWeights::default_max_impact")]
    pub max_impact: f64,
}

impl ImpactWeights {
    fn default_class_weight() -> f64 {
        3.0
    }

    fn default_function_weight() -> f64 {
        2.0
    }

    fn default_removed_weight() -> f64 {
        2.5
    }

    fn default_large_span_weight() -> f64 {
        1.5
    }

    fn default_medium_span_weight() -> f64 {
        1.2
    }

    fn default_max_impact() -> f64 {
        10.0
    }
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self {
            class_weight: Self::default_class_weight(),
            function_weight: Self::default_function_weight(),
            removed_weight: Self::default_removed_weight(),
            large_span_weight: Self::default_large_span_weight(),
            medium_span_weight: Self::default_medium_span_weight(),
            max_impact: Self::default_max_impact(),
        }
    }
}

/// Configuration for the semantic diff detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    #[serde(default = "DiffConfig::default_supported_languages")]
    pub supported_languages: Vec<Language>,
    /// Below this Jaccard similarity a matched element counts as modified.
    #[serde(default = "DiffConfig::default_modified_threshold")]
    pub modified_threshold: f64,
    /// Fixed score for every element of a newly added file.
    #[serde(default = "DiffConfig::default_added_file_impact")]
    pub added_file_impact: f64,
    /// Fixed score for every element of a deleted file.
    #[serde(default = "DiffConfig::default_removed_file_impact")]
    pub removed_file_impact: f64,
    #[serde(default)]
    pub impact: ImpactWeights,
}

impl DiffConfig {
    fn default_supported_languages() -> Vec<Language> {
        ProcessorConfig::default_supported_languages()
    }

    fn default_modified_threshold() -> f64 {
        0.95
    }

    fn default_added_file_impact() -> f64 {
        2.0
    }

    fn default_removed_file_impact() -> f64 {
        5.0
    }

    pub fn supports(&self, language: &Language) -> bool {
        self.supported_languages.contains(language)
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            supported_languages: Self::default_supported_languages(),
            modified_threshold: Self::default_modified_threshold(),
            added_file_impact: Self::default_added_file_impact(),
            removed_file_impact: Self::default_removed_file_impact(),
            impact: ImpactWeights::default(),
        }
    }
}
