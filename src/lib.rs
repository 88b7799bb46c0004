//! Dictate Rules - glossary rewriting and app-specific prompts for dictation
//!
//! Rule engine behind transcript cleanup: glossary substitution with strict
//! priority ordering, and prompt selection from the active application, both
//! built on validated, time-bounded pattern matching.

/// Per-application prompt rules and resolution
pub mod app_prompts;
/// Configuration management
pub mod config;
/// Glossary rules, application and persistence
pub mod glossary;
/// Pattern validation, compilation and bounded matching
pub mod pattern;
/// LLM system prompt composition
pub mod prompt;
/// Rule persistence backends
pub mod storage;
/// Logging setup
pub mod telemetry;
