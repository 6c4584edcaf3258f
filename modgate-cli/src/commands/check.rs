//! `modgate check`: one full update check, as a host would run it at load.

use std::sync::Arc;

use console::style;
use modgate::gate::{CoreOutcome, Gate, HostCapabilities, Transport, UpdateReport};
use modgate::host::{RecordingHost, StaticRegistry};
use modgate::manager::PackageUpdateOutcome;
use modgate::package::InstalledPackageRecord;

use super::Settings;
use crate::error::CliError;

/// Parse a `NAME=VERSION` argument.
pub fn parse_installed(arg: &str) -> Result<InstalledPackageRecord, CliError> {
    let (name, version) = arg
        .split_once('=')
        .map(|(n, v)| (n.trim(), v.trim()))
        .filter(|(n, v)| !n.is_empty() && !v.is_empty())
        .ok_or_else(|| {
            CliError::InvalidArgument(format!("'{}' is not in NAME=VERSION form", arg))
        })?;
    Ok(InstalledPackageRecord::new(name, version))
}

pub fn run(settings: &Settings, installed: &[String]) -> Result<(), CliError> {
    let records = installed
        .iter()
        .map(|arg| parse_installed(arg))
        .collect::<Result<Vec<_>, _>>()?;
    let config = settings.config.to_gate_config()?;

    let recorder = Arc::new(RecordingHost::new());
    let host = HostCapabilities {
        registry: Arc::new(StaticRegistry::new(records)),
        redirector: recorder.clone(),
        events: recorder.clone(),
    };
    let gate = Gate::new(
        config,
        host,
        Transport::http(settings.config.timeout()),
        Arc::clone(&settings.logger),
    );

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        CliError::Config(format!("Failed to start async runtime: {}", e))
    })?;

    println!("Checking {} ...", style(&settings.config.manifest.url).cyan());
    let report = runtime.block_on(async {
        let handle = gate.on_load()?;
        let cancel = handle.cancellation();
        ctrlc::set_handler(move || {
            println!();
            println!("Cancelling update check...");
            cancel.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;
        Ok::<_, CliError>(handle.wait().await?)
    })?;

    print_report(&report);
    for (original, replacement) in recorder.redirects() {
        println!(
            "  {} {} -> {}",
            style("redirect").cyan(),
            original.display(),
            replacement.display()
        );
    }
    Ok(())
}

fn print_report(report: &UpdateReport) {
    if let Some(e) = &report.manifest_error {
        println!("{} {}", style("✗").red(), e);
        return;
    }

    match &report.core {
        Some(CoreOutcome::Bundle(Ok(bundle))) => println!(
            "{} UI patched: {} documents, {} hunks not applied",
            style("✓").green(),
            bundle.documents.len(),
            bundle.failed_hunks()
        ),
        Some(CoreOutcome::Bundle(Err(e))) => println!("{} UI patch failed: {}", style("✗").red(), e),
        Some(CoreOutcome::Injected(Ok(()))) => println!("{} UI snippet injected", style("✓").green()),
        Some(CoreOutcome::Injected(Err(e))) => {
            println!("{} UI injection failed: {}", style("✗").red(), e)
        }
        Some(CoreOutcome::Skipped) | None => {}
    }

    for package in &report.packages {
        match &package.outcome {
            Ok(PackageUpdateOutcome::NotInstalled) => {}
            Ok(outcome @ PackageUpdateOutcome::Updated { .. }) => {
                println!("{} {} {}", style("✓").green(), style(&package.name).bold(), outcome)
            }
            Ok(outcome) => println!("  {} {}", package.name, style(outcome).dim()),
            Err(e) => println!("{} {} {}", style("✗").red(), style(&package.name).bold(), e),
        }
    }

    println!();
    println!("{}", report);
}
