use tracing::debug;

use super::rule::AppPromptMap;
use crate::pattern::{BoundedMatcher, TitleMatcher};

/// Foreground application details supplied by the platform layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveContext {
    /// Executable name, e.g. `chrome.exe`
    pub process_name: Option<String>,
    /// Title of the focused window
    pub window_title: Option<String>,
}

impl ActiveContext {
    /// Context for `process_name` with an optional window title
    pub fn new(process_name: &str, window_title: Option<&str>) -> Self {
        Self {
            process_name: Some(process_name.to_owned()),
            window_title: window_title.map(str::to_owned),
        }
    }
}

/// [`resolve_with`] using a [`BoundedMatcher`] with the default timeout
pub fn resolve<'a>(map: &'a AppPromptMap, context: Option<&ActiveContext>) -> Option<&'a str> {
    resolve_with(map, context, &BoundedMatcher::default())
}

/// Picks the prompt for the active application
///
/// Rules for the process are scanned in stored order. The first rule whose
/// window-title pattern matches wins. Otherwise the first rule without a
/// pattern is the fallback. Returns `None` without a context, without a
/// process name, or for an unknown process.
pub fn resolve_with<'a>(
    map: &'a AppPromptMap,
    context: Option<&ActiveContext>,
    matcher: &dyn TitleMatcher,
) -> Option<&'a str> {
    let context = context?;
    let process = context.process_name.as_deref().filter(|p| !p.is_empty())?;
    let rules = map.get(process)?;
    let window_title = context.window_title.as_deref().unwrap_or_default();

    let mut fallback = None;
    for rule in rules {
        match rule.window_title_regex() {
            Some(pattern) => {
                if !window_title.is_empty() && matcher.is_match(pattern, window_title) {
                    debug!(process = process, pattern = pattern, "window-specific prompt matched");
                    return Some(rule.prompt());
                }
            }
            None => {
                fallback = fallback.or(Some(rule.prompt()));
            }
        }
    }

    debug!(process = process, fallback = fallback.is_some(), "no window-specific prompt matched");
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_prompts::normalize;
    use crate::pattern::matcher::MockTitleMatcher;
    use serde_json::json;

    fn chrome_map() -> AppPromptMap {
        normalize(&json!({
            "chrome.exe": [
                {"prompt": "Gmail", "window_title_regex": ".*Gmail.*"},
                {"prompt": "Browser"}
            ]
        }))
    }

    #[test]
    fn test_window_specific_rule_wins() {
        let map = chrome_map();
        let ctx = ActiveContext::new("chrome.exe", Some("Gmail - Chrome"));
        assert_eq!(resolve(&map, Some(&ctx)), Some("Gmail"));
    }

    #[test]
    fn test_falls_back_to_process_default() {
        let map = chrome_map();
        let ctx = ActiveContext::new("chrome.exe", Some("Other - Chrome"));
        assert_eq!(resolve(&map, Some(&ctx)), Some("Browser"));
    }

    #[test]
    fn test_unknown_process_and_missing_context() {
        let map = chrome_map();
        let ctx = ActiveContext::new("notepad.exe", Some("Untitled"));
        assert_eq!(resolve(&map, Some(&ctx)), None);
        assert_eq!(resolve(&map, None), None);
        assert_eq!(resolve(&map, Some(&ActiveContext::default())), None);
    }

    #[test]
    fn test_case_insensitive_title_match() {
        let map = normalize(&json!({
            "notepad.exe": [
                {"window_title_regex": "todo", "prompt": "Todo prompt"},
                {"prompt": "Default notepad prompt"}
            ]
        }));
        let ctx = ActiveContext::new("notepad.exe", Some("My TODO list"));
        assert_eq!(resolve(&map, Some(&ctx)), Some("Todo prompt"));
    }

    #[test]
    fn test_invalid_regex_falls_through() {
        let map = normalize(&json!({
            "edge.exe": [{"window_title_regex": "[", "prompt": "Broken"}, {"prompt": "Fallback"}]
        }));
        let ctx = ActiveContext::new("edge.exe", Some("Welcome"));
        assert_eq!(resolve(&map, Some(&ctx)), Some("Fallback"));
    }

    #[test]
    fn test_no_default_returns_none() {
        let map = normalize(&json!({
            "code.exe": [{"window_title_regex": "\\.py", "prompt": "Python"}]
        }));
        let ctx = ActiveContext::new("code.exe", Some("main.rs"));
        assert_eq!(resolve(&map, Some(&ctx)), None);
    }

    #[test]
    fn test_first_default_is_kept() {
        let map = normalize(&json!({"app.exe": ["First", "Second"]}));
        let ctx = ActiveContext::new("app.exe", None);
        assert_eq!(resolve(&map, Some(&ctx)), Some("First"));
    }

    #[test]
    fn test_default_before_regex_does_not_block_later_match() {
        let map = normalize(&json!({
            "app.exe": ["Default", {"prompt": "Specific", "window_title_regex": "report"}]
        }));
        let ctx = ActiveContext::new("app.exe", Some("Quarterly report"));
        assert_eq!(resolve(&map, Some(&ctx)), Some("Specific"));
    }

    #[test]
    fn test_scan_stops_at_first_match() {
        let map = normalize(&json!({
            "app.exe": [
                {"prompt": "One", "window_title_regex": "a"},
                {"prompt": "Two", "window_title_regex": "b"},
                {"prompt": "Three", "window_title_regex": "c"}
            ]
        }));

        let mut matcher = MockTitleMatcher::new();
        matcher
            .expect_is_match()
            .withf(|pattern, title| pattern == "a" && title == "title")
            .times(1)
            .returning(|_, _| false);
        matcher
            .expect_is_match()
            .withf(|pattern, title| pattern == "b" && title == "title")
            .times(1)
            .returning(|_, _| true);
        matcher
            .expect_is_match()
            .withf(|pattern, _| pattern == "c")
            .never();

        let ctx = ActiveContext::new("app.exe", Some("title"));
        assert_eq!(resolve_with(&map, Some(&ctx), &matcher), Some("Two"));
    }

    #[test]
    fn test_empty_title_skips_matcher() {
        let map = chrome_map();
        let mut matcher = MockTitleMatcher::new();
        matcher.expect_is_match().never();

        let ctx = ActiveContext::new("chrome.exe", Some(""));
        assert_eq!(resolve_with(&map, Some(&ctx), &matcher), Some("Browser"));
    }
}
