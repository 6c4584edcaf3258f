//! ModGate CLI - development host for the update engine
//!
//! Drives the engine from a terminal the way a game's plugin loader would:
//! an update check, the package operations, shadow cleanup, and tools for
//! authoring and testing patch documents.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{ConfigCommands, PatchCommands, Settings};
use error::CliError;

#[derive(Parser)]
#[command(name = "modgate")]
#[command(version = modgate::VERSION)]
#[command(about = "Keep game add-on mods and UI patches up to date", long_about = None)]
struct Cli {
    /// Config file (default: ~/.modgate/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Manifest URL, overriding [manifest] url
    #[arg(long, global = true)]
    manifest_url: Option<String>,

    /// Plugin directory, overriding [paths] plugin_dir
    #[arg(long, global = true)]
    plugin_dir: Option<PathBuf>,

    /// UI directory, overriding [paths] ui_dir
    #[arg(long, global = true)]
    ui_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the manifest, patch the UI and update installed packages
    Check {
        /// Installed package as NAME=VERSION (repeatable)
        #[arg(long = "installed", value_name = "NAME=VERSION")]
        installed: Vec<String>,
    },

    /// Download a package's binary from the manifest
    Install {
        /// Package name as listed in the manifest
        name: String,
    },

    /// Delete a package's binary
    Uninstall { name: String },

    /// Re-enable a deactivated package
    Activate { name: String },

    /// Disable a package without deleting it
    Deactivate { name: String },

    /// Show the on-disk state of a package
    Status { name: String },

    /// List the mods offered by the manifest
    List,

    /// Delete every shadow file under the UI directory
    Cleanup,

    /// Patch document tools
    #[command(subcommand)]
    Patch(PatchCommands),

    /// Configuration file management
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        manifest_url,
        plugin_dir,
        ui_dir,
        command,
    } = cli;

    // Patch tools and config management work without a configured install.
    let command = match command {
        Commands::Patch(command) => return commands::patch::run(command),
        Commands::Config(command) => return commands::config::run(command, config),
        other => other,
    };

    let _logging = commands::init_logging()?;
    tracing::info!(version = modgate::VERSION, "modgate starting");
    let settings = Settings::load(config, manifest_url, plugin_dir, ui_dir)?;

    match command {
        Commands::Check { installed } => commands::check::run(&settings, &installed),
        Commands::Install { name } => commands::packages::install(&settings, &name),
        Commands::Uninstall { name } => commands::packages::uninstall(&settings, &name),
        Commands::Activate { name } => commands::packages::activate(&settings, &name),
        Commands::Deactivate { name } => commands::packages::deactivate(&settings, &name),
        Commands::Status { name } => commands::packages::status(&settings, &name),
        Commands::List => commands::packages::list(&settings),
        Commands::Cleanup => commands::cleanup::run(&settings),
        Commands::Patch(_) | Commands::Config(_) => unreachable!("handled above"),
    }
}
