//! Detect and remediate command implementations
//!
//! Both commands load the manifest, pick a registry backend, resolve user
//! identities once and hand everything to the core runner. The only
//! difference is the run mode.

use std::path::Path;

use colored::{ColoredString, Colorize};
use serde_json::json;
use tracing::debug;

use regmgmt_core::{
    EvaluationResult, IdentityContext, LoadedHiveIdentities, Manifest, MemoryRegistry,
    RegistryBackend, RunMode, RunReport, RunStatus, Runner, Scope, Snapshot, StaticIdentities,
    StatusToken,
};

use crate::cli::{EvaluateArgs, ScopeArg};
use crate::error::Result;

/// Run a detection or remediation pass and return the process exit code.
pub fn run_evaluate(args: &EvaluateArgs, mode: RunMode) -> Result<i32> {
    let mut manifest = Manifest::load(&args.config)?;
    match args.scope {
        ScopeArg::All => {}
        ScopeArg::User => manifest.clear_scope(Scope::Machine),
        ScopeArg::Machine => manifest.clear_scope(Scope::User),
    }
    manifest.retain_groups(&args.group);

    let backend = open_backend(args.snapshot.as_deref())?;
    let identities = resolve_identities(&manifest, backend.as_ref(), &args.sid);

    let report = Runner::new(backend.as_ref(), mode, &identities).run(&manifest);

    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    Ok(report.exit_code())
}

fn open_backend(snapshot: Option<&Path>) -> Result<Box<dyn RegistryBackend>> {
    if let Some(path) = snapshot {
        debug!(path = %path.display(), "Loading registry snapshot");
        let registry: MemoryRegistry = Snapshot::load(path)?.into_registry()?;
        return Ok(Box::new(registry));
    }
    live_backend()
}

#[cfg(windows)]
fn live_backend() -> Result<Box<dyn RegistryBackend>> {
    Ok(Box::new(regmgmt_core::WindowsRegistry::new()))
}

#[cfg(not(windows))]
fn live_backend() -> Result<Box<dyn RegistryBackend>> {
    Err(crate::error::CliError::user(
        "The live registry is only available on Windows. Use --snapshot to evaluate offline.",
    ))
}

/// Resolve identities only when user-scope groups will actually run.
fn resolve_identities(
    manifest: &Manifest,
    backend: &dyn RegistryBackend,
    sids: &[String],
) -> IdentityContext {
    if manifest.user_groups.is_empty() {
        return IdentityContext::default();
    }
    if sids.is_empty() {
        IdentityContext::resolve(&LoadedHiveIdentities::new(backend))
    } else {
        IdentityContext::resolve(&StaticIdentities::new(sids.to_vec()))
    }
}

fn paint(status: StatusToken) -> ColoredString {
    let token = status.as_str();
    match status {
        StatusToken::Compliant => token.green().bold(),
        StatusToken::NonCompliant => token.yellow().bold(),
        StatusToken::Remediated | StatusToken::Deleted | StatusToken::DeletedKey => {
            token.cyan().bold()
        }
        StatusToken::Error => token.red().bold(),
    }
}

fn print_result(result: &EvaluationResult) {
    let rest = result
        .message
        .strip_prefix(result.status.as_str())
        .unwrap_or(&result.message);
    println!("   {}{}", paint(result.status), rest);
}

fn print_report(report: &RunReport) {
    let mut current: Option<(&str, &str)> = None;
    for result in &report.results {
        let header = (result.group.as_str(), result.path.as_str());
        if current != Some(header) {
            println!("{} {} ({})", "=>".blue().bold(), result.group, result.path.dimmed());
            current = Some(header);
        }
        print_result(result);
    }

    for scope in &report.skipped_scopes {
        println!(
            "{} No {} identities resolved; {}-scope settings skipped.",
            "SKIPPED".yellow().bold(),
            scope,
            scope
        );
    }

    println!();
    println!("{}", report.summary());
    let status = report.status();
    let line = status.to_string();
    match status {
        RunStatus::Success | RunStatus::Compliant => println!("{}", line.green().bold()),
        RunStatus::Failed | RunStatus::NonCompliant => println!("{}", line.red().bold()),
    }
}

fn print_json(report: &RunReport) -> Result<()> {
    let output = json!({
        "report": report,
        "summary": report.summary(),
        "status": report.status(),
        "exit_code": report.exit_code(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
