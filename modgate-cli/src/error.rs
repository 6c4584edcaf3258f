//! CLI error handling with user-friendly messages.

use std::fmt;
use std::path::PathBuf;
use std::process;

use modgate::config::ConfigFileError;
use modgate::gate::GateError;
use modgate::manager::ManagerError;
use modgate::patch::PatchError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Engine operation failed
    Manager(ManagerError),
    /// Update check could not be started or joined
    Gate(GateError),
    /// A patch document did not parse
    Patch { path: PathBuf, error: PatchError },
    /// Failed to read or write a file
    File { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Run 'modgate config init' to create a config file, then edit:");
                eprintln!("  {}", modgate::config::config_file_path().display());
            }
            CliError::Manager(ManagerError::AlreadyExists { .. }) => {
                eprintln!();
                eprintln!("A previous update was interrupted. Remove the file above and retry.");
            }
            CliError::Manager(ManagerError::PackageLost { backup, .. }) => {
                eprintln!();
                eprintln!("Restore the package manually from:");
                eprintln!("  {}", backup.display());
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Manager(e) => write!(f, "{}", e),
            CliError::Gate(e) => write!(f, "{}", e),
            CliError::Patch { path, error } => {
                write!(f, "Invalid patch '{}': {}", path.display(), error)
            }
            CliError::File { path, error } => {
                write!(f, "Failed to access '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Manager(e) => Some(e),
            CliError::Gate(e) => Some(e),
            CliError::Patch { error, .. } => Some(error),
            CliError::File { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        CliError::Manager(e)
    }
}

impl From<GateError> for CliError {
    fn from(e: GateError) -> Self {
        CliError::Gate(e)
    }
}
