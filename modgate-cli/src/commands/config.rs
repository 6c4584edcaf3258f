//! `modgate config`: create and inspect the configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use modgate::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a config file with default values if none exists
    Init,

    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

pub fn run(command: ConfigCommands, path: Option<PathBuf>) -> Result<(), CliError> {
    let path = path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init => run_init(path),
        ConfigCommands::Show => run_show(path),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn run_init(path: PathBuf) -> Result<(), CliError> {
    if path.exists() {
        println!("{}", style("Existing configuration found!").yellow().bold());
        println!("  {}", path.display());
        return Ok(());
    }

    ConfigFile::default().save_to(&path)?;
    println!("{} Created {}", style("✓").green(), style(path.display()).cyan());
    Ok(())
}

fn run_show(path: PathBuf) -> Result<(), CliError> {
    let config = ConfigFile::load_from(&path)?;
    let or_unset = |value: Option<&std::path::Path>| {
        value.map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
    };

    println!("[manifest]");
    println!(
        "  url = {}",
        if config.manifest.url.is_empty() { "(not set)" } else { &config.manifest.url }
    );
    println!("  timeout = {}", config.manifest.timeout);
    println!();
    println!("[paths]");
    println!("  plugin_dir = {}", or_unset(config.paths.plugin_dir.as_deref()));
    println!("  ui_dir = {}", or_unset(config.paths.ui_dir.as_deref()));
    println!();
    println!("[patches]");
    println!("  root_document = {}", config.patches.root_document);
    println!("  staging_dir = {}", config.patches.staging_dir);
    println!();
    println!("[packages]");
    println!("  artifact_extension = {}", config.packages.artifact_extension);
    Ok(())
}
