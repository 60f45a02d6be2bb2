//! Signature-matching semantic diff detection.
//!
//! Elements extracted from both revisions of each changed file are matched
//! on their signatures; survivors are compared by line-set similarity and
//! every non-unchanged pairing is scored with a bounded impact heuristic.

pub mod detector;
pub mod impact;
pub mod summary;

pub use detector::{ElementComparison, SemanticDiffDetector};
pub use impact::impact_score;
pub use summary::{change_summary, ChangeSummary, ImpactDistribution};
