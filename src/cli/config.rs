//! `config init` and `config check`.

use std::path::PathBuf;

use asset_governance::config::{default_config_path, GovernanceConfig};
use asset_governance::logging::init_logging;
use tracing::info;

fn resolve(path: Option<String>) -> PathBuf {
    path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Write the commented default configuration.
pub fn init(path: Option<String>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve(path);
    if path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    GovernanceConfig::create_default(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// Load, validate and print the effective rules.
pub fn check(path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve(path);
    let config = GovernanceConfig::load(&path)?;
    init_logging(&config.logging)?;

    let rules = &config.rules;
    info!(path = %path.display(), "configuration valid");

    println!("Configuration: {}", path.display());
    println!("  min_duration_blocks:   {}", rules.min_duration_blocks);
    println!("  vote_window_blocks:    {}", rules.vote_window_blocks);
    println!("  bookkeeper_population: {}", rules.bookkeeper_population);
    println!("  approval_percent:      {}", rules.approval_percent);
    println!(
        "  approval:              more than {} valid votes",
        rules.approval_threshold()
    );
    println!(
        "  title length:          {}..={} chars",
        rules.title_min_chars, rules.title_max_chars
    );
    println!("  description_max_chars: {}", rules.description_max_chars);
    println!(
        "  logging:               {} ({})",
        config.logging.level, config.logging.format
    );
    Ok(())
}
