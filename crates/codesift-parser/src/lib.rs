pub mod complexity;
pub mod extractor;
pub mod language;
pub mod visitor;

pub use extractor::TreeSitterExtractor;
pub use language::{LanguageConfig, LanguageRegistry};
pub use visitor::ElementVisitor;
