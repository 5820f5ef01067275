use crate::output::print_json;
use clap::Subcommand;
use siteid_core::config::{EngineConfig, WarnLevel};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(config: &EngineConfig, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Validate => validate(config, json),
    }
}

fn show(config: &EngineConfig, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(config);
    }
    match config.reference_year {
        Some(year) => println!("reference_year:        {year}"),
        None => println!("reference_year:        (current year, {})", config.year()),
    }
    println!("fix.max_concurrency:   {}", config.fix.max_concurrency);
    println!("fix.effect_timeout_ms: {}", config.fix.effect_timeout_ms);
    Ok(())
}

fn validate(config: &EngineConfig, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({
            "warnings": warnings,
        }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
