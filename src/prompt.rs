use crate::glossary::GlossaryManager;

/// Heading placed above the glossary lines
pub const GLOSSARY_HEADING: &str = "Glossary entries (prioritized):";

/// Heading placed above an application-specific prompt
pub const APP_PROMPT_HEADING: &str = "Application-specific instructions:";

/// Builds the LLM system prompt from its parts
///
/// Layout: glossary block (only when rules exist), the base prompt, the
/// application prompt (only when one was resolved), then any extra context
/// such as text around the cursor. Sections are separated by blank lines.
pub fn build_system_prompt(
    base: &str,
    glossary: Option<&GlossaryManager>,
    app_prompt: Option<&str>,
    context: Option<&str>,
) -> String {
    let mut sections = Vec::with_capacity(4);

    if let Some(glossary) = glossary.filter(|g| !g.is_empty()) {
        sections.push(format!("{GLOSSARY_HEADING}\n{}", glossary.format_for_prompt()));
    }

    let base = base.trim();
    if !base.is_empty() {
        sections.push(base.to_owned());
    }

    if let Some(app_prompt) = app_prompt.map(str::trim).filter(|p| !p.is_empty()) {
        sections.push(format!("{APP_PROMPT_HEADING}\n{app_prompt}"));
    }

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        sections.push(context.to_owned());
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::GlossaryRule;

    #[test]
    fn test_glossary_leads_the_prompt() {
        let glossary =
            GlossaryManager::new([GlossaryRule::new("AppName", "Whisper Dictate").unwrap()]);
        let prompt = build_system_prompt("system prompt", Some(&glossary), None, None);

        assert!(prompt.starts_with(GLOSSARY_HEADING));
        assert!(prompt.contains("AppName → Whisper Dictate"));
        assert!(prompt.ends_with("\n\nsystem prompt"));
    }

    #[test]
    fn test_app_prompt_appended() {
        let prompt = build_system_prompt("base", None, Some("Write like an email"), None);
        assert_eq!(
            prompt,
            "base\n\nApplication-specific instructions:\nWrite like an email"
        );
    }

    #[test]
    fn test_empty_glossary_and_blank_app_prompt_omitted() {
        let empty = GlossaryManager::default();
        let prompt = build_system_prompt("base", Some(&empty), Some("  "), Some(""));
        assert_eq!(prompt, "base");
    }

    #[test]
    fn test_context_comes_last() {
        let prompt = build_system_prompt("base", None, Some("App specific"), Some("Some context"));
        assert!(prompt.contains(APP_PROMPT_HEADING));
        assert!(prompt.contains("App specific"));
        assert!(prompt.ends_with("\n\nSome context"));
    }
}
