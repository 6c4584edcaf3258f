//! `modgate cleanup`: remove every shadow file, as a host does at unload.

use console::style;

use super::Settings;
use crate::error::CliError;

pub fn run(settings: &Settings) -> Result<(), CliError> {
    let installer = settings.bundle_installer()?;
    let report = installer.cleanup();

    for path in &report.removed {
        println!("  removed {}", path.display());
    }
    for (path, reason) in &report.failed {
        println!("{} {}: {}", style("✗").red(), path.display(), reason);
    }

    if report.is_clean() {
        println!(
            "{} {} shadow files removed",
            style("✓").green(),
            report.removed.len()
        );
        Ok(())
    } else {
        Err(CliError::Config(format!(
            "{} shadow files could not be removed",
            report.failed.len()
        )))
    }
}
