use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub glossary: GlossaryConfig,
    pub app_prompts: AppPromptsConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GlossaryConfig {
    pub enabled: bool,
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppPromptsConfig {
    pub settings_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatcherConfig {
    pub timeout_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self { timeout_ms: 500 }
    }
}

impl MatcherConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_path: String,
}

const DEFAULT_CONFIG: &str = r#"[glossary]
enabled = true
path = "~/.dictate-rules/glossary.json"

[app_prompts]
settings_path = "~/.dictate-rules/settings.json"

[matcher]
timeout_ms = 500

[telemetry]
enabled = false
log_path = "~/.dictate-rules/dictate-rules.log"
"#;

impl Config {
    /// Load config from ~/.dictate-rules.toml
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        toml::from_str(&contents).context("failed to parse config TOML")
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".dictate-rules.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}
