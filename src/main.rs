//! plinth - a small static site builder.

mod build;
mod cli;
mod compiler;
mod config;
mod logger;
mod pipeline;
mod serve;
mod setup;
mod utils;

use anyhow::Result;
use build::build_site;
use clap::Parser;
use cli::Cli;
use config::SiteConfig;
use serve::serve_site;
use std::path::Path;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        log!("error"; "{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    build_site(&config)?;
    if cli.is_serve() {
        serve_site(&config)?;
    }

    Ok(())
}

/// Load and validate configuration from CLI arguments.
///
/// A missing config file falls back to defaults.
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);
    config.validate()?;

    if config.verbose {
        let path = config.root_relative(&config.config_path);
        if config.config_path.is_file() {
            log!("config"; "loaded {path}");
        } else {
            log!("config"; "{path} not found, using defaults");
        }
    }

    Ok(config)
}
