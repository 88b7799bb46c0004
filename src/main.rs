use anyhow::{Context, Result};
use std::io::Read;

use dictate_rules::app_prompts::{self, ActiveContext};
use dictate_rules::config::Config;
use dictate_rules::glossary::GlossaryManager;
use dictate_rules::pattern::BoundedMatcher;
use dictate_rules::storage::FileStorage;
use dictate_rules::telemetry;

/// Usage: `dictate-rules [PROCESS [WINDOW_TITLE]] < transcript.txt`
///
/// Prints the glossary-rewritten transcript on stdout and logs the prompt
/// resolved for the given application.
fn main() -> Result<()> {
    let config = Config::load()?;
    telemetry::init(config.telemetry.enabled, &config.telemetry.log_path)?;
    tracing::info!("dictate-rules starting");

    let glossary = if config.glossary.enabled {
        let path = Config::expand_path(&config.glossary.path)?;
        GlossaryManager::load_from(&FileStorage::new(path))
    } else {
        GlossaryManager::default()
    };

    let settings_path = Config::expand_path(&config.app_prompts.settings_path)?;
    let prompts = app_prompts::load_app_prompts(&FileStorage::new(settings_path));

    let mut args = std::env::args().skip(1);
    let context = args.next().map(|process| ActiveContext {
        process_name: Some(process),
        window_title: args.next(),
    });

    let matcher = BoundedMatcher::new(config.matcher.timeout());
    match app_prompts::resolve_with(&prompts, context.as_ref(), &matcher) {
        Some(prompt) => tracing::info!(prompt = prompt, "app prompt resolved"),
        None => tracing::info!("no app prompt for active context"),
    }

    let mut transcript = String::new();
    std::io::stdin()
        .read_to_string(&mut transcript)
        .context("failed to read transcript from stdin")?;

    println!("{}", glossary.apply(transcript.trim_end()));

    Ok(())
}
