use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::pattern::compiler;
use crate::pattern::ValidationError;

/// How a glossary trigger is matched against transcript text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    /// Whole-word literal
    Word,
    /// Literal text, whole-word or substring depending on `word_boundary`
    #[default]
    Phrase,
    /// User-supplied regular expression
    Regex,
}

impl MatchType {
    /// Lowercase name used in JSON, CSV and prompt output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Phrase => "phrase",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "phrase" => Ok(Self::Phrase),
            "regex" => Ok(Self::Regex),
            _ => Err(RuleError::UnknownMatchType(s.to_owned())),
        }
    }
}

/// Errors raised while constructing a glossary rule
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// Trigger is empty after trimming
    #[error("trigger must not be empty")]
    EmptyTrigger,

    /// Replacement is empty after trimming
    #[error("replacement must not be empty")]
    EmptyReplacement,

    /// Match type is not one of word, phrase or regex
    #[error("unknown match type: {0}")]
    UnknownMatchType(String),
}

/// Serialized shape of a rule, shared by JSON and CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// Text or pattern to look for
    pub trigger: String,
    /// Text substituted for each match
    pub replacement: String,
    /// Matching mode
    #[serde(default)]
    pub match_type: MatchType,
    /// Match case exactly
    #[serde(default)]
    pub case_sensitive: bool,
    /// Anchor literal triggers on word boundaries
    #[serde(default = "default_word_boundary")]
    pub word_boundary: bool,
    /// Free-form note shown in editors
    #[serde(default)]
    pub description: Option<String>,
}

const fn default_word_boundary() -> bool {
    true
}

/// Compiled regex tagged with the manager generation it was built for
#[derive(Debug, Clone)]
pub(crate) struct CompiledPattern {
    generation: u64,
    regex: Result<Regex, ValidationError>,
}

/// A single glossary replacement rule
///
/// Rules are immutable once built. The only mutable part is the compiled
/// pattern cache, which the owning [`GlossaryManager`](super::GlossaryManager)
/// clears whenever it reorders its rules.
#[derive(Debug, Clone)]
pub struct GlossaryRule {
    trigger: String,
    replacement: String,
    match_type: MatchType,
    case_sensitive: bool,
    word_boundary: bool,
    description: Option<String>,
    compiled: OnceLock<CompiledPattern>,
}

impl GlossaryRule {
    /// Creates a phrase rule with default options
    ///
    /// Trigger and replacement are trimmed.
    ///
    /// # Errors
    /// Returns [`RuleError`] if either side is empty after trimming
    pub fn new(trigger: &str, replacement: &str) -> Result<Self, RuleError> {
        let trigger = trigger.trim();
        let replacement = replacement.trim();
        if trigger.is_empty() {
            return Err(RuleError::EmptyTrigger);
        }
        if replacement.is_empty() {
            return Err(RuleError::EmptyReplacement);
        }

        Ok(Self {
            trigger: trigger.to_owned(),
            replacement: replacement.to_owned(),
            match_type: MatchType::default(),
            case_sensitive: false,
            word_boundary: true,
            description: None,
            compiled: OnceLock::new(),
        })
    }

    /// Sets the match type
    #[must_use]
    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self.compiled = OnceLock::new();
        self
    }

    /// Sets case sensitivity
    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self.compiled = OnceLock::new();
        self
    }

    /// Sets word-boundary anchoring for literal triggers
    #[must_use]
    pub fn with_word_boundary(mut self, word_boundary: bool) -> Self {
        self.word_boundary = word_boundary;
        self.compiled = OnceLock::new();
        self
    }

    /// Sets the description; blank descriptions are dropped
    #[must_use]
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        self
    }

    /// Builds a rule from its serialized record
    ///
    /// # Errors
    /// Returns [`RuleError`] if trigger or replacement is empty
    pub fn from_record(record: RuleRecord) -> Result<Self, RuleError> {
        Ok(Self::new(&record.trigger, &record.replacement)?
            .with_match_type(record.match_type)
            .with_case_sensitive(record.case_sensitive)
            .with_word_boundary(record.word_boundary)
            .with_description(record.description.as_deref()))
    }

    /// Serializable copy of this rule
    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            trigger: self.trigger.clone(),
            replacement: self.replacement.clone(),
            match_type: self.match_type,
            case_sensitive: self.case_sensitive,
            word_boundary: self.word_boundary,
            description: self.description.clone(),
        }
    }

    /// Text or pattern this rule looks for
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Text substituted for each match
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Matching mode
    pub const fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// Whether matching is case-sensitive
    pub const fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Whether literal triggers are anchored on word boundaries
    pub const fn word_boundary(&self) -> bool {
        self.word_boundary
    }

    /// Optional description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of whitespace-separated words in the trigger
    pub fn word_count(&self) -> usize {
        self.trigger.split_whitespace().count()
    }

    /// Whether a compiled pattern is currently cached
    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Returns the compiled pattern for `generation`, compiling on first use.
    ///
    /// A cache entry from another generation is ignored and the pattern is
    /// compiled again without being stored.
    pub(crate) fn compiled_for(&self, generation: u64) -> Result<Regex, ValidationError> {
        let cached = self.compiled.get_or_init(|| CompiledPattern {
            generation,
            regex: compiler::compile(self),
        });
        if cached.generation == generation {
            cached.regex.clone()
        } else {
            compiler::compile(self)
        }
    }

    pub(crate) fn clear_compiled(&mut self) {
        self.compiled.take();
    }

    /// Case-insensitive trigger comparison used for upsert and removal
    pub(crate) fn has_trigger(&self, trigger: &str) -> bool {
        self.trigger.to_lowercase() == trigger.trim().to_lowercase()
    }
}
