//! CLI module for the LLM fit advisor
//!
//! Subcommands:
//! - `resolve`: estimate GPU memory from an identifier
//! - `profile`: save, show or clear the hardware profile
//! - `recommend`: rank catalog models against the saved profile
//! - `validate`: check the catalog and device database files

pub mod display;
pub mod profile;
pub mod recommend;
pub mod resolve;
pub mod validate;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// LLM fit advisor - which local models will run well on this machine
#[derive(Parser)]
#[command(name = "llm-fit-advisor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Estimate usable GPU memory for a GPU identifier
    Resolve(resolve::ResolveArgs),

    /// Manage the saved hardware profile
    Profile(profile::ProfileArgs),

    /// Recommend models for the saved hardware profile
    Recommend(recommend::RecommendArgs),

    /// Validate the model catalog and device database
    Validate(validate::ValidateArgs),
}

/// Load `.env` and configuration, then start logging
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = config_or_default(AppConfig::load());
    logging::init_logging(&config.logging);

    config
}

/// Logging is not up yet, so a bad config source is reported on stderr
fn config_or_default(loaded: Result<AppConfig, ::config::ConfigError>) -> AppConfig {
    loaded.unwrap_or_else(|e| {
        eprintln!("Warning: invalid configuration, using defaults: {}", e);
        AppConfig::default()
    })
}
