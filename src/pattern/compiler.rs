use regex::Regex;

use super::validator::{self, ValidationError};
use crate::glossary::{GlossaryRule, MatchType};

/// Builds the pattern text a glossary rule matches with
///
/// Regex rules use the trigger verbatim. Word and phrase rules match the
/// trigger literally, anchored on word boundaries when `word_boundary` is set.
pub fn pattern_text(rule: &GlossaryRule) -> String {
    match rule.match_type() {
        MatchType::Regex => rule.trigger().to_owned(),
        MatchType::Word | MatchType::Phrase => {
            let escaped = regex::escape(rule.trigger());
            if rule.word_boundary() {
                format!(r"\b{escaped}\b")
            } else {
                escaped
            }
        }
    }
}

/// Compiles a glossary rule into a matcher
///
/// Regex triggers go through the full validator. Word and phrase triggers
/// are escaped literals, so only the compiled-size limit applies to them.
///
/// # Errors
/// Returns [`ValidationError`] if a regex trigger fails validation, or if a
/// literal trigger is too large to compile.
pub fn compile(rule: &GlossaryRule) -> Result<Regex, ValidationError> {
    let pattern = pattern_text(rule);
    let case_insensitive = !rule.case_sensitive();
    match rule.match_type() {
        MatchType::Regex => validator::validated_regex(&pattern, case_insensitive),
        MatchType::Word | MatchType::Phrase => validator::sized_regex(&pattern, case_insensitive),
    }
}
