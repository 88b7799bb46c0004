use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Maximum pattern length in characters
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Nesting depth at which a repeated group is rejected (`(a+)+` has depth 1)
pub const MAX_REPETITION_DEPTH: usize = 1;

/// Upper bound on the compiled program size, in bytes
const COMPILED_SIZE_LIMIT: usize = 1 << 20;

/// Reasons a pattern is refused before it is ever matched
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Pattern exceeds [`MAX_PATTERN_LENGTH`]
    #[error("regex pattern too long ({length} > {max} chars)")]
    TooLong {
        /// Length of the rejected pattern in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// A repeated group wraps another repetition, e.g. `(a+)+`
    #[error("regex has too many nested repetitions ({depth} >= {max})")]
    TooManyNestedRepetitions {
        /// Deepest nesting found
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// The regex engine refused the pattern
    #[error("invalid regex syntax: {0}")]
    SyntaxError(String),
}

/// Validates a user-supplied pattern without matching anything.
///
/// Runs the length check, then the nested-repetition scan, then a trial
/// compile. The first failing check wins.
///
/// # Errors
/// Returns the [`ValidationError`] for the first check that fails.
pub fn validate(pattern: &str) -> Result<(), ValidationError> {
    validated_regex(pattern, false).map(|_| ())
}

/// Same checks as [`validate`], handing back the compiled regex.
pub(crate) fn validated_regex(
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ValidationError> {
    let length = pattern.chars().count();
    if length > MAX_PATTERN_LENGTH {
        return Err(ValidationError::TooLong {
            length,
            max: MAX_PATTERN_LENGTH,
        });
    }

    let depth = nested_repetition_depth(pattern);
    if depth >= MAX_REPETITION_DEPTH {
        return Err(ValidationError::TooManyNestedRepetitions {
            depth,
            max: MAX_REPETITION_DEPTH,
        });
    }

    sized_regex(pattern, case_insensitive)
}

/// Compiles `pattern` under the compiled-size limit only.
///
/// For pattern text built from escaped literals, which has no repetition
/// for the static checks to find.
pub(crate) fn sized_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, ValidationError> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .size_limit(COMPILED_SIZE_LIMIT)
        .build()
        .map_err(|e| ValidationError::SyntaxError(e.to_string()))
}

#[derive(Debug)]
struct GroupFrame {
    capturing: bool,
    has_repetition: bool,
}

const fn is_repetition(c: char) -> bool {
    matches!(c, '*' | '+' | '?' | '{')
}

/// Deepest `(…repeated…)repeated` nesting in `pattern`, 0 if none.
fn nested_repetition_depth(pattern: &str) -> usize {
    let chars: Vec<char> = pattern.chars().collect();
    let mut stack: Vec<GroupFrame> = Vec::new();
    let mut max_depth = 0;

    let mut i = 0;
    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        match chars[i] {
            '\\' => {
                // escaped char is a literal, never an operator
                i += 1;
            }
            '(' => {
                // a trailing "(" opens nothing; the syntax check reports it
                if let Some(next) = next {
                    let capturing = next != '?';
                    stack.push(GroupFrame {
                        capturing,
                        has_repetition: false,
                    });
                    if !capturing {
                        // the "?" of "(?:" is group syntax, not a quantifier
                        i += 1;
                    }
                }
            }
            ')' => {
                if let Some(frame) = stack.pop() {
                    let repeated = next.is_some_and(is_repetition);
                    if frame.capturing && repeated && frame.has_repetition {
                        let flagged_ancestors =
                            stack.iter().filter(|g| g.has_repetition).count();
                        max_depth = max_depth.max(1 + flagged_ancestors);
                    }
                    if repeated || frame.has_repetition {
                        if let Some(parent) = stack.last_mut() {
                            parent.has_repetition = true;
                        }
                    }
                }
            }
            c if is_repetition(c) => {
                if let Some(frame) = stack.last_mut() {
                    frame.has_repetition = true;
                }
            }
            _ => {}
        }
        i += 1;
    }

    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_patterns_pass() {
        assert!(validate("hello").is_ok());
        assert!(validate(r"gpt-\d+").is_ok());
        assert!(validate(".*Gmail.*").is_ok());
        assert!(validate(r"(foo|bar) baz").is_ok());
    }

    #[test]
    fn test_too_long() {
        let pattern = "a".repeat(501);
        assert_eq!(
            validate(&pattern),
            Err(ValidationError::TooLong {
                length: 501,
                max: MAX_PATTERN_LENGTH
            })
        );
        assert!(validate(&"a".repeat(500)).is_ok());
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 300 two-byte chars is 600 bytes but only 300 chars
        let pattern = "é".repeat(300);
        assert!(validate(&pattern).is_ok());
    }

    #[test]
    fn test_nested_plus_rejected() {
        assert!(matches!(
            validate("(a+)+"),
            Err(ValidationError::TooManyNestedRepetitions { depth: 1, .. })
        ));
    }

    #[test]
    fn test_nested_star_and_deeper_nesting_rejected() {
        assert!(matches!(
            validate("(a*)*"),
            Err(ValidationError::TooManyNestedRepetitions { .. })
        ));
        assert!(matches!(
            validate("((a*)*)*"),
            Err(ValidationError::TooManyNestedRepetitions { .. })
        ));
        assert!(matches!(
            validate(r"(\w{2,})+x"),
            Err(ValidationError::TooManyNestedRepetitions { .. })
        ));
    }

    #[test]
    fn test_depth_counts_flagged_ancestors() {
        assert_eq!(nested_repetition_depth("(a+)+"), 1);
        assert_eq!(nested_repetition_depth("(b*(a+)+)"), 2);
        assert_eq!(nested_repetition_depth("(a)+"), 0);
        assert_eq!(nested_repetition_depth("(a+)"), 0);
    }

    #[test]
    fn test_escaped_operators_ignored() {
        assert!(validate(r"(a\+)+").is_ok());
        assert!(validate(r"\(a+\)+").is_ok());
    }

    #[test]
    fn test_non_capturing_group_not_checked() {
        assert_eq!(nested_repetition_depth("(?:a+)+"), 0);
        assert!(validate("(?:a+)+").is_ok());
    }

    #[test]
    fn test_non_capturing_group_flags_parent() {
        // the inner repetition still counts for the enclosing capture group
        assert_eq!(nested_repetition_depth("((?:a+))+"), 1);
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            validate("(unclosed"),
            Err(ValidationError::SyntaxError(_))
        ));
        assert!(matches!(validate("["), Err(ValidationError::SyntaxError(_))));
    }

    #[test]
    fn test_length_checked_before_nesting() {
        let pattern = format!("(a+)+{}", "b".repeat(500));
        assert!(matches!(
            validate(&pattern),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_case_insensitive_compile() {
        let re = validated_regex("gmail", true).unwrap();
        assert!(re.is_match("GMAIL - Chrome"));
        let re = validated_regex("gmail", false).unwrap();
        assert!(!re.is_match("GMAIL - Chrome"));
    }
}
