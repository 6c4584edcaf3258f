//! `modgate patch`: author and test patch documents offline.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use console::style;
use modgate::patch::{HunkOutcome, PatchDocument};

use crate::error::CliError;

/// Patch subcommands.
#[derive(Debug, Subcommand)]
pub enum PatchCommands {
    /// Create a patch document turning OLD into NEW
    Make {
        old: PathBuf,
        new: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply a patch document to a base file
    Apply {
        patch: PathBuf,

        /// Base file; a missing file is patched as empty content
        base: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: PatchCommands) -> Result<(), CliError> {
    match command {
        PatchCommands::Make { old, new, output } => {
            let document = PatchDocument::make(&read(&old)?, &read(&new)?);
            if document.is_empty() {
                eprintln!("{} files are identical", style("-").yellow());
            }
            emit(output.as_deref(), &document.to_text())
        }
        PatchCommands::Apply {
            patch,
            base,
            output,
        } => {
            let document = PatchDocument::parse(&read(&patch)?).map_err(|error| {
                CliError::Patch {
                    path: patch.clone(),
                    error,
                }
            })?;
            let base_content = if base.exists() {
                read(&base)?
            } else {
                eprintln!("{} {} does not exist, patching empty content", style("!").yellow(), base.display());
                String::new()
            };

            let result = document.apply(&base_content);
            for (index, outcome) in result.outcomes.iter().enumerate() {
                let marker = match outcome {
                    HunkOutcome::NotFound => style("✗").red(),
                    HunkOutcome::Fuzzy { .. } => style("~").yellow(),
                    _ => style("✓").green(),
                };
                eprintln!("{} hunk {}: {}", marker, index + 1, outcome);
            }
            emit(output.as_deref(), &result.content)
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|error| CliError::File {
        path: path.to_path_buf(),
        error,
    })
}

fn emit(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => fs::write(path, content).map_err(|error| CliError::File {
            path: path.to_path_buf(),
            error,
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
