//! Line-based glossary format kept for older saves and the settings text box.
//!
//! One rule per line, `trigger => replacement` or `trigger = replacement`.
//! Blank lines and lines starting with `#` are ignored.

use tracing::debug;

use super::rule::GlossaryRule;

/// Parses legacy glossary text into rules, skipping lines that don't form one
pub fn parse(text: &str) -> Vec<GlossaryRule> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let (trigger, replacement) = line
                .split_once("=>")
                .or_else(|| line.split_once('='))?;

            match GlossaryRule::new(trigger, replacement) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    debug!(line = line, error = %e, "skipping legacy glossary line");
                    None
                }
            }
        })
        .collect()
}

/// Renders rules as `trigger => replacement` lines
pub fn render(rules: &[GlossaryRule]) -> String {
    rules
        .iter()
        .map(|rule| format!("{} => {}", rule.trigger(), rule.replacement()))
        .collect::<Vec<_>>()
        .join("\n")
}
