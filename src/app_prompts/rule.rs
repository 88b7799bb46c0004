use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-application prompt rules keyed by process name
///
/// Rules for a process keep the order they were given in; resolution scans
/// them front to back.
pub type AppPromptMap = BTreeMap<String, Vec<AppPromptRule>>;

/// One prompt for an application, optionally limited to matching window titles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppPromptRule {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    window_title_regex: Option<String>,
}

impl AppPromptRule {
    /// Builds a rule; `None` when the prompt is blank.
    ///
    /// A blank `window_title_regex` is treated as absent. Non-blank values
    /// are kept as given.
    pub fn new(prompt: &str, window_title_regex: Option<&str>) -> Option<Self> {
        if prompt.trim().is_empty() {
            return None;
        }
        Some(Self {
            prompt: prompt.to_owned(),
            window_title_regex: window_title_regex
                .filter(|r| !r.trim().is_empty())
                .map(str::to_owned),
        })
    }

    /// Instruction text for the LLM
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Window-title pattern, if this rule is title-specific
    pub fn window_title_regex(&self) -> Option<&str> {
        self.window_title_regex.as_deref()
    }
}

/// Raw settings value for a single rule, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRuleValue {
    /// Bare string: the prompt itself
    StringPrompt(String),
    /// Object with a `prompt` and optional `window_title_regex`
    StructuredPrompt {
        /// Prompt text
        prompt: String,
        /// Window-title pattern, when present as a string
        window_title_regex: Option<String>,
    },
    /// Anything else
    Invalid,
}

impl From<&Value> for RawRuleValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(prompt) => Self::StringPrompt(prompt.clone()),
            Value::Object(fields) => match fields.get("prompt") {
                Some(Value::String(prompt)) => Self::StructuredPrompt {
                    prompt: prompt.clone(),
                    window_title_regex: fields
                        .get("window_title_regex")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                },
                _ => Self::Invalid,
            },
            _ => Self::Invalid,
        }
    }
}

impl RawRuleValue {
    /// Validated rule, `None` for invalid or blank entries
    pub fn into_rule(self) -> Option<AppPromptRule> {
        match self {
            Self::StringPrompt(prompt) => AppPromptRule::new(&prompt, None),
            Self::StructuredPrompt {
                prompt,
                window_title_regex,
            } => AppPromptRule::new(&prompt, window_title_regex.as_deref()),
            Self::Invalid => None,
        }
    }
}

/// Normalizes raw settings data into an [`AppPromptMap`]
///
/// Each process maps to a string, an object with a `prompt`, or a list of
/// either. Malformed entries are dropped, as are processes left without any
/// rule. Anything other than a JSON object yields an empty map.
pub fn normalize(raw: &Value) -> AppPromptMap {
    let Some(processes) = raw.as_object() else {
        return AppPromptMap::new();
    };

    processes
        .iter()
        .filter_map(|(process, value)| {
            let rules: Vec<AppPromptRule> = match value {
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| RawRuleValue::from(item).into_rule())
                    .collect(),
                single => RawRuleValue::from(single).into_rule().into_iter().collect(),
            };
            (!rules.is_empty()).then(|| (process.clone(), rules))
        })
        .collect()
}

/// Flat, editable view of one rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppPromptEntry {
    /// Executable name, e.g. `chrome.exe`
    pub process_name: String,
    /// Window-title pattern, empty for the process default
    pub window_title_regex: String,
    /// Instruction text
    pub prompt: String,
}

/// Flattens the map into entries, process by process, rules in order
pub fn rules_to_entries(map: &AppPromptMap) -> Vec<AppPromptEntry> {
    map.iter()
        .flat_map(|(process, rules)| {
            rules.iter().map(move |rule| AppPromptEntry {
                process_name: process.clone(),
                window_title_regex: rule.window_title_regex().unwrap_or_default().to_owned(),
                prompt: rule.prompt().to_owned(),
            })
        })
        .collect()
}

/// Rebuilds the map from edited entries
///
/// Fields are trimmed; entries with a blank process name or prompt are
/// dropped. Entries for the same process keep their relative order.
pub fn entries_to_rules(entries: &[AppPromptEntry]) -> AppPromptMap {
    let mut map = AppPromptMap::new();
    for entry in entries {
        let process = entry.process_name.trim();
        if process.is_empty() {
            continue;
        }
        let Some(rule) = AppPromptRule::new(
            entry.prompt.trim(),
            Some(entry.window_title_regex.trim()),
        ) else {
            continue;
        };
        map.entry(process.to_owned()).or_default().push(rule);
    }
    map
}
