use std::cmp::Reverse;
use std::fmt::Write as _;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::legacy;
use super::rule::{GlossaryRule, MatchType, RuleRecord};
use crate::storage::RuleStorage;

/// Ordered set of glossary rules
///
/// Rules are kept sorted so that triggers with more words come first, and
/// among those the longer trigger wins. [`apply`](Self::apply) relies on that
/// order to substitute the most specific phrases before their fragments.
#[derive(Debug, Clone, Default)]
pub struct GlossaryManager {
    rules: Vec<GlossaryRule>,
    generation: u64,
}

impl GlossaryManager {
    /// Creates a manager holding `rules` in priority order
    pub fn new(rules: impl IntoIterator<Item = GlossaryRule>) -> Self {
        let mut manager = Self {
            rules: rules.into_iter().collect(),
            generation: 0,
        };
        manager.resort();
        manager
    }

    /// Rules in priority order
    pub fn rules(&self) -> &[GlossaryRule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rules are configured
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Cache generation, bumped on every structural change
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Inserts `rule`, replacing any rule with the same trigger (ignoring case)
    pub fn upsert(&mut self, rule: GlossaryRule) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.has_trigger(rule.trigger())) {
            debug!(trigger = rule.trigger(), "replacing glossary rule");
            *existing = rule;
        } else {
            debug!(trigger = rule.trigger(), "adding glossary rule");
            self.rules.push(rule);
        }
        self.resort();
    }

    /// Removes the rule whose trigger matches (ignoring case), if any
    pub fn remove(&mut self, trigger: &str) {
        let before = self.rules.len();
        self.rules.retain(|r| !r.has_trigger(trigger));
        if self.rules.len() != before {
            debug!(trigger = trigger, "removed glossary rule");
        }
        self.resort();
    }

    /// Stable sort by `(-word_count, -char_count)`, then drop compiled caches
    fn resort(&mut self) {
        self.rules
            .sort_by_key(|r| Reverse((r.word_count(), r.trigger().chars().count())));
        self.generation = self.generation.wrapping_add(1);
        for rule in &mut self.rules {
            rule.clear_compiled();
        }
    }

    /// Rewrites `text` by applying every rule in priority order
    ///
    /// Each rule replaces all of its matches with its replacement, taken
    /// literally. Later rules see the output of earlier ones. Rules whose
    /// pattern fails validation are skipped.
    pub fn apply(&self, text: &str) -> String {
        if self.rules.is_empty() || text.is_empty() {
            return text.to_owned();
        }

        let mut result = text.to_owned();
        for rule in &self.rules {
            let regex = match rule.compiled_for(self.generation) {
                Ok(regex) => regex,
                Err(e) => {
                    warn!(trigger = rule.trigger(), error = %e, "skipping glossary rule");
                    continue;
                }
            };

            let replaced = regex.replace_all(&result, regex::NoExpand(rule.replacement()));
            if let std::borrow::Cow::Owned(updated) = replaced {
                debug!(
                    trigger = rule.trigger(),
                    replacement = rule.replacement(),
                    "glossary rule applied"
                );
                result = updated;
            }
        }

        result
    }

    /// Renders rules as `trigger → replacement` lines for an LLM prompt
    ///
    /// Non-default options are appended: ` (match=word|regex)`,
    /// ` (case-sensitive)` and ` (partial-ok)` for rules without word
    /// boundaries.
    pub fn format_for_prompt(&self) -> String {
        let mut lines = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let mut line = format!("{} → {}", rule.trigger(), rule.replacement());
            if rule.match_type() != MatchType::Phrase {
                let _ = write!(line, " (match={})", rule.match_type());
            }
            if rule.case_sensitive() {
                line.push_str(" (case-sensitive)");
            }
            if !rule.word_boundary() {
                line.push_str(" (partial-ok)");
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Renders rules as legacy `trigger => replacement` lines
    pub fn to_legacy_text(&self) -> String {
        legacy::render(&self.rules)
    }

    /// Serializes all rules as a pretty JSON array
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        let records: Vec<RuleRecord> = self.rules.iter().map(GlossaryRule::to_record).collect();
        serde_json::to_string_pretty(&records)
    }

    /// Parses a JSON array of rule records, dropping invalid entries
    ///
    /// Each record is read on its own, so one malformed entry never costs
    /// the rest of the glossary.
    ///
    /// # Errors
    /// Returns error if `contents` is not a JSON array
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        Self::from_value(serde_json::from_str(contents)?)
    }

    fn from_value(value: Value) -> serde_json::Result<Self> {
        let items: Vec<Value> = serde_json::from_value(value)?;
        let rules = items.into_iter().filter_map(|item| {
            let record = serde_json::from_value::<RuleRecord>(item)
                .map_err(|e| warn!(error = %e, "dropping malformed glossary record"))
                .ok()?;
            let trigger = record.trigger.clone();
            GlossaryRule::from_record(record)
                .map_err(|e| {
                    warn!(trigger = %trigger, error = %e, "dropping invalid glossary rule");
                })
                .ok()
        });
        Ok(Self::new(rules))
    }

    /// Persists rules as JSON. Returns false (and logs) on failure.
    pub fn save_to(&self, storage: &dyn RuleStorage) -> bool {
        let json = match self.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "could not serialize glossary");
                return false;
            }
        };

        match storage.write(&json) {
            Ok(()) => {
                info!(rules = self.rules.len(), "glossary saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "could not save glossary");
                false
            }
        }
    }

    /// Loads rules from storage
    ///
    /// JSON is tried first; text that is not JSON at all is read as legacy
    /// `trigger => replacement` lines. A missing or unreadable file, or JSON
    /// that is not an array, yields an empty manager.
    pub fn load_from(storage: &dyn RuleStorage) -> Self {
        let contents = match storage.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                debug!("no saved glossary");
                return Self::default();
            }
            Err(e) => {
                warn!(error = %e, "could not read saved glossary");
                return Self::default();
            }
        };

        let value = match serde_json::from_str::<Value>(&contents) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "glossary is not JSON, reading legacy format");
                let manager = Self::new(legacy::parse(&contents));
                info!(rules = manager.len(), "legacy glossary loaded");
                return manager;
            }
        };

        match Self::from_value(value) {
            Ok(manager) => {
                info!(rules = manager.len(), "glossary loaded");
                manager
            }
            Err(e) => {
                warn!(error = %e, "saved glossary is not a list of rules");
                Self::default()
            }
        }
    }
}

/// Loads the saved glossary as legacy text, or `default` when there is none
pub fn load_saved_glossary(storage: &dyn RuleStorage, default: &str) -> String {
    let text = GlossaryManager::load_from(storage).to_legacy_text();
    if text.trim().is_empty() {
        default.to_owned()
    } else {
        text
    }
}

/// Parses legacy glossary text and saves it as JSON
pub fn write_saved_glossary(storage: &dyn RuleStorage, text: &str) -> bool {
    GlossaryManager::new(legacy::parse(text)).save_to(storage)
}
