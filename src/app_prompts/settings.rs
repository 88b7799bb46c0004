use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::rule::{normalize, AppPromptMap};
use crate::storage::RuleStorage;

/// Key holding app prompts inside the settings document
pub const APP_PROMPTS_KEY: &str = "app_prompts";

/// Loads the settings document, always containing an `app_prompts` object
///
/// A missing, unreadable or malformed document yields
/// `{"app_prompts": {}}`.
pub fn load_settings(storage: &dyn RuleStorage) -> Map<String, Value> {
    let mut settings = match storage.read() {
        Ok(Some(contents)) => match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(settings)) => settings,
            Ok(_) => {
                warn!("settings document is not a JSON object, ignoring");
                Map::new()
            }
            Err(e) => {
                warn!(error = %e, "could not parse saved settings");
                Map::new()
            }
        },
        Ok(None) => {
            debug!("no saved settings");
            Map::new()
        }
        Err(e) => {
            warn!(error = %e, "could not read saved settings");
            Map::new()
        }
    };

    settings
        .entry(APP_PROMPTS_KEY)
        .or_insert_with(|| Value::Object(Map::new()));
    settings
}

/// Persists the settings document. Returns false (and logs) on failure.
pub fn save_settings(storage: &dyn RuleStorage, settings: &Map<String, Value>) -> bool {
    let json = match serde_json::to_string_pretty(settings) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "could not serialize settings");
            return false;
        }
    };

    match storage.write(&json) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not save settings");
            false
        }
    }
}

/// Loads and normalizes the app prompt rules from the settings document
pub fn load_app_prompts(storage: &dyn RuleStorage) -> AppPromptMap {
    let settings = load_settings(storage);
    let map = settings
        .get(APP_PROMPTS_KEY)
        .map(normalize)
        .unwrap_or_default();
    info!(processes = map.len(), "app prompts loaded");
    map
}

/// Replaces the app prompt rules in the settings document, keeping other keys
pub fn save_app_prompts(storage: &dyn RuleStorage, map: &AppPromptMap) -> bool {
    let mut settings = load_settings(storage);
    let rules = match serde_json::to_value(map) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(error = %e, "could not serialize app prompts");
            return false;
        }
    };
    settings.insert(APP_PROMPTS_KEY.to_owned(), rules);
    save_settings(storage, &settings)
}
