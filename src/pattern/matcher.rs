use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::validator;

/// Default wall-clock budget for a single search
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Trait for window-title matching (enables testing via mocking)
///
/// The context resolver only needs a yes/no answer per rule. Production code
/// uses [`BoundedMatcher`]; tests use `MockTitleMatcher` (via `mockall`).
#[cfg_attr(test, mockall::automock)]
pub trait TitleMatcher {
    /// Returns true if `pattern` matches somewhere in `title`
    fn is_match(&self, pattern: &str, title: &str) -> bool;
}

/// Case-insensitive regex search with a latency budget
#[derive(Debug, Clone, Copy)]
pub struct BoundedMatcher {
    timeout: Duration,
}

impl BoundedMatcher {
    /// Creates a matcher that waits at most `timeout` per search
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Configured per-search timeout
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for BoundedMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl TitleMatcher for BoundedMatcher {
    fn is_match(&self, pattern: &str, title: &str) -> bool {
        safe_search_with_timeout(pattern, title, self.timeout)
    }
}

/// [`safe_search_with_timeout`] with the default 500ms budget
pub fn safe_search(pattern: &str, text: &str) -> bool {
    safe_search_with_timeout(pattern, text, DEFAULT_TIMEOUT)
}

/// Searches `text` for `pattern` (case-insensitive), failing closed.
///
/// The pattern is validated first; any validation failure is logged and
/// reported as no match. The search itself runs on a one-shot worker thread
/// and the caller waits at most `timeout` for it.
///
/// A timed-out worker is not cancelled. It keeps running until the search
/// finishes on its own, so the timeout bounds the caller's latency, not the
/// CPU spent. With the linear-time `regex` engine that work is bounded by
/// the input size.
pub fn safe_search_with_timeout(pattern: &str, text: &str, timeout: Duration) -> bool {
    let regex = match validator::validated_regex(pattern, true) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(pattern = pattern, error = %e, "invalid regex pattern");
            return false;
        }
    };

    let (tx, rx) = mpsc::sync_channel(1);
    let haystack = text.to_owned();
    let spawned = thread::Builder::new()
        .name("regex-search".to_owned())
        .spawn(move || {
            // receiver may be gone after a timeout
            let _ = tx.send(regex.is_match(&haystack));
        });

    if let Err(e) = spawned {
        warn!(pattern = pattern, error = %e, "failed to spawn regex worker");
        return false;
    }

    match rx.recv_timeout(timeout) {
        Ok(matched) => {
            debug!(pattern = pattern, matched = matched, "regex search completed");
            matched
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                pattern = pattern,
                timeout_ms = timeout.as_millis(),
                "regex search timed out (potential ReDoS)"
            );
            false
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!(pattern = pattern, "regex worker exited without a result");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_match() {
        assert!(safe_search(".*Gmail.*", "Gmail - Chrome"));
        assert!(!safe_search(".*Gmail.*", "Other - Chrome"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(safe_search("todo", "My TODO list"));
    }

    #[test]
    fn test_nested_repetition_rejected_before_matching() {
        assert!(!safe_search("(a+)+", "aaaa"));
    }

    #[test]
    fn test_invalid_syntax_is_no_match() {
        assert!(!safe_search("[", "anything"));
    }

    #[test]
    fn test_too_long_is_no_match() {
        let pattern = "a".repeat(501);
        assert!(!safe_search(&pattern, &"a".repeat(600)));
    }

    #[test]
    fn test_slow_search_times_out_as_no_match() {
        use std::time::Instant;

        // Non-ASCII text with a Unicode word boundary and no literal to
        // prefilter on, so the engine scans all of it before the match
        let haystack = format!("{} 123", "é".repeat(8 * 1024 * 1024));
        let pattern = r"\b\d{3}\b";

        let started = Instant::now();
        let bounded = safe_search_with_timeout(pattern, &haystack, Duration::from_millis(1));
        let bounded_elapsed = started.elapsed();

        let started = Instant::now();
        let full = safe_search_with_timeout(pattern, &haystack, Duration::from_secs(60));
        let full_elapsed = started.elapsed();

        assert!(full, "the match exists when given enough time");
        assert!(!bounded, "an over-budget search reports no match");
        assert!(
            bounded_elapsed * 2 < full_elapsed,
            "caller waited {bounded_elapsed:?}, full scan took {full_elapsed:?}"
        );
    }

    #[test]
    fn test_bounded_matcher_uses_timeout() {
        let matcher = BoundedMatcher::new(Duration::from_secs(1));
        assert_eq!(matcher.timeout(), Duration::from_secs(1));
        assert!(matcher.is_match(r"\.py$", "main.py"));
        assert!(!matcher.is_match(r"\.py$", "main.rs"));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(BoundedMatcher::default().timeout(), DEFAULT_TIMEOUT);
    }
}
