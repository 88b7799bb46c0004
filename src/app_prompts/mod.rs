/// Prompt resolution for the active application
pub mod resolver;
/// App prompt rule types and normalization
pub mod rule;
/// Persistence inside the settings document
pub mod settings;

pub use resolver::{resolve, resolve_with, ActiveContext};
pub use rule::{
    entries_to_rules, normalize, rules_to_entries, AppPromptEntry, AppPromptMap, AppPromptRule,
    RawRuleValue,
};
pub use settings::{load_app_prompts, load_settings, save_app_prompts, save_settings};
