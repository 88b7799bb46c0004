/// Glossary rule to regex translation
pub mod compiler;
/// Timeout-guarded regex search
pub mod matcher;
/// Static pattern checks (length, nested repetition, syntax)
pub mod validator;

pub use matcher::{safe_search, safe_search_with_timeout, BoundedMatcher, TitleMatcher};
pub use validator::{validate, ValidationError};
