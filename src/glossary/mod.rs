use thiserror::Error;

/// CSV import and export
pub mod csv;
/// Legacy `trigger => replacement` text format
pub mod legacy;
/// Rule store: priority ordering, application, JSON persistence
pub mod manager;
/// Glossary rule value type
pub mod rule;

pub use manager::{load_saved_glossary, write_saved_glossary, GlossaryManager};
pub use rule::{GlossaryRule, MatchType, RuleError, RuleRecord};

/// Errors from glossary import
#[derive(Debug, Error)]
pub enum GlossaryError {
    /// Malformed CSV input
    #[error("invalid glossary CSV: {0}")]
    Csv(#[from] ::csv::Error),

    /// Required CSV column is absent from the header
    #[error("glossary CSV is missing the '{0}' column")]
    MissingColumn(&'static str),

    /// CSV output was not valid UTF-8
    #[error("glossary CSV is not valid UTF-8")]
    Encoding,
}
