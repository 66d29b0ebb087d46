//! Run driver
//!
//! The [`Runner`] resolves concrete registry roots for every configuration
//! group, evaluates each setting once per root, and collects the results
//! into a [`RunReport`]. A failing setting never stops the run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{ConfigurationGroup, Manifest, Scope};
use crate::engine::{EvaluationResult, Evaluator, RemediationOutcome};
use crate::identity::IdentityContext;
use crate::registry::{Hive, RegistryBackend, RegistryPath};

/// Whether a run only reports drift or also corrects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Detect,
    Remediate,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Detect => f.write_str("detection"),
            RunMode::Remediate => f.write_str("remediation"),
        }
    }
}

/// Counts over a run's results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub mode: RunMode,
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub remediated: usize,
    pub failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} evaluated, {} compliant, {} non-compliant",
            self.total, self.compliant, self.non_compliant
        )?;
        if self.mode == RunMode::Remediate {
            write!(f, ", {} remediated, {} failed", self.remediated, self.failed)?;
        }
        Ok(())
    }
}

/// Final verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Remediation run without failures
    Success,
    /// Remediation run with at least one failed setting
    Failed,
    /// Detection run that found drift
    NonCompliant,
    /// Detection run without drift
    Compliant,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Success | RunStatus::Compliant => 0,
            RunStatus::Failed | RunStatus::NonCompliant => 1,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
            RunStatus::NonCompliant => "NON-COMPLIANT",
            RunStatus::Compliant => "COMPLIANT",
        };
        write!(f, "[REGISTRYMGMT] {}", word)
    }
}

/// Results of one run, in evaluation order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub results: Vec<EvaluationResult>,
    /// Scopes that had groups but no roots to apply them to
    pub skipped_scopes: Vec<Scope>,
}

impl RunReport {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            started_at: Utc::now(),
            results: Vec::new(),
            skipped_scopes: Vec::new(),
        }
    }

    pub fn summary(&self) -> Summary {
        let count = |f: fn(&EvaluationResult) -> bool| self.results.iter().filter(|r| f(r)).count();
        Summary {
            mode: self.mode,
            total: self.results.len(),
            compliant: count(|r| !r.needs_remediation),
            non_compliant: count(|r| r.needs_remediation),
            remediated: count(|r| r.outcome == RemediationOutcome::Succeeded),
            failed: count(|r| r.outcome == RemediationOutcome::Failed),
        }
    }

    pub fn status(&self) -> RunStatus {
        let summary = self.summary();
        match self.mode {
            RunMode::Remediate if summary.failed > 0 => RunStatus::Failed,
            RunMode::Remediate => RunStatus::Success,
            RunMode::Detect if summary.non_compliant > 0 => RunStatus::NonCompliant,
            RunMode::Detect => RunStatus::Compliant,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.status().exit_code()
    }
}

/// Drives a whole manifest through the evaluator
pub struct Runner<'a> {
    evaluator: Evaluator<'a>,
    identities: &'a IdentityContext,
}

impl<'a> Runner<'a> {
    pub fn new(backend: &'a dyn RegistryBackend, mode: RunMode, identities: &'a IdentityContext) -> Self {
        Self {
            evaluator: Evaluator::new(backend, mode),
            identities,
        }
    }

    /// Evaluate user-scope groups for every identity, then machine-scope
    /// groups once.
    pub fn run(&self, manifest: &Manifest) -> RunReport {
        let mode = self.evaluator.mode();
        info!(%mode, settings = manifest.setting_count(), "Starting run");
        let mut report = RunReport::new(mode);

        if !manifest.user_groups.is_empty() {
            if self.identities.is_empty() {
                warn!("No user identities resolved, skipping user-scope settings");
                report.skipped_scopes.push(Scope::User);
            } else {
                for group in &manifest.user_groups {
                    for root in self.identities.user_roots(&group.base_path) {
                        self.run_group(group, &root, &mut report);
                    }
                }
            }
        }

        for group in &manifest.machine_groups {
            let root = RegistryPath::new(Hive::LocalMachine, &group.base_path);
            self.run_group(group, &root, &mut report);
        }

        info!(status = %report.status(), "{}", report.summary());
        report
    }

    fn run_group(&self, group: &ConfigurationGroup, root: &RegistryPath, report: &mut RunReport) {
        debug!(group = %group.name, path = %root, "Evaluating group");
        for setting in &group.settings {
            report
                .results
                .push(self.evaluator.evaluate(&group.name, root, setting));
        }
    }
}
