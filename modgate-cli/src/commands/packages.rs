//! Explicit package operations.

use console::style;
use modgate::manager::OperationOutcome;
use tokio_util::sync::CancellationToken;

use super::Settings;
use crate::error::CliError;

fn print_outcome(name: &str, outcome: &OperationOutcome) {
    match outcome {
        OperationOutcome::Applied { .. } => {
            println!("{} {}: {}", style("✓").green(), style(name).bold(), outcome)
        }
        OperationOutcome::NoOp { .. } => {
            println!("{} {}: {}", style("-").yellow(), style(name).bold(), outcome)
        }
    }
}

pub fn install(settings: &Settings, name: &str) -> Result<(), CliError> {
    let manager = settings.package_manager()?;
    let manifest = settings.fetch_manifest()?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    ctrlc::set_handler(move || on_signal.cancel())
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let outcome = manager.install(name, &manifest, &cancel)?;
    print_outcome(name, &outcome);
    Ok(())
}

pub fn uninstall(settings: &Settings, name: &str) -> Result<(), CliError> {
    let manager = settings.package_manager()?;
    let manifest = settings.fetch_manifest()?;
    let outcome = manager.uninstall(name, &manifest)?;
    print_outcome(name, &outcome);
    Ok(())
}

pub fn activate(settings: &Settings, name: &str) -> Result<(), CliError> {
    let manager = settings.package_manager()?;
    let manifest = settings.fetch_manifest()?;
    let outcome = manager.activate(name, &manifest)?;
    print_outcome(name, &outcome);
    Ok(())
}

pub fn deactivate(settings: &Settings, name: &str) -> Result<(), CliError> {
    let manager = settings.package_manager()?;
    let manifest = settings.fetch_manifest()?;
    let outcome = manager.deactivate(name, &manifest)?;
    print_outcome(name, &outcome);
    Ok(())
}

pub fn status(settings: &Settings, name: &str) -> Result<(), CliError> {
    let manager = settings.package_manager()?;
    println!(
        "{}: {} ({})",
        style(name).bold(),
        manager.state(name),
        manager.artifact_path(name).display()
    );
    Ok(())
}

pub fn list(settings: &Settings) -> Result<(), CliError> {
    let manifest = settings.fetch_manifest()?;
    let manager = settings.package_manager()?;

    for entry in manifest.entries() {
        let descriptor = entry.descriptor();
        if descriptor.name.is_empty() {
            continue;
        }
        let kind = if entry.is_core() { " (core)" } else { "" };
        println!(
            "{}{} v{} by {} [{}]",
            style(&descriptor.name).bold(),
            kind,
            descriptor.version,
            if descriptor.author.is_empty() { "unknown" } else { &descriptor.author },
            manager.state(&descriptor.name)
        );
        if !descriptor.description.is_empty() {
            println!("    {}", style(&descriptor.description).dim());
        }
    }
    Ok(())
}
