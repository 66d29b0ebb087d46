//! Evaluation results

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::config::Action;

/// Leading token of a status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusToken {
    Compliant,
    NonCompliant,
    Remediated,
    Deleted,
    DeletedKey,
    Error,
}

impl StatusToken {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusToken::Compliant => "[COMPLIANT]",
            StatusToken::NonCompliant => "[NON-COMPLIANT]",
            StatusToken::Remediated => "[REMEDIATED]",
            StatusToken::Deleted => "[DELETED]",
            StatusToken::DeletedKey => "[DELETED KEY]",
            StatusToken::Error => "[ERROR]",
        }
    }
}

impl fmt::Display for StatusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether remediation was attempted and how it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemediationOutcome {
    NotAttempted,
    Succeeded,
    Failed,
}

/// Category of a per-setting failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidValueFormat,
    WriteFailed,
    VerificationFailed,
}

/// A contained per-setting failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl From<&Error> for Failure {
    fn from(error: &Error) -> Self {
        let kind = match error {
            Error::InvalidValueFormat { .. } => FailureKind::InvalidValueFormat,
            Error::VerificationFailed { .. } => FailureKind::VerificationFailed,
            _ => FailureKind::WriteFailed,
        };
        Self {
            kind,
            detail: error.to_string(),
        }
    }
}

/// Outcome of evaluating one setting against one registry root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Configuration group the setting belongs to
    pub group: String,
    pub setting_name: String,
    /// Registry root the setting was evaluated under
    pub path: String,
    pub action: Action,
    /// True iff the state did not match the declaration when first checked
    pub needs_remediation: bool,
    pub outcome: RemediationOutcome,
    pub status: StatusToken,
    /// Status line, starting with the status token
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl EvaluationResult {
    pub fn is_failed(&self) -> bool {
        self.outcome == RemediationOutcome::Failed
    }
}

/// Identity of a result under construction
pub(crate) struct ResultBuilder {
    pub group: String,
    pub setting_name: String,
    pub path: String,
    pub action: Action,
}

impl ResultBuilder {
    fn finish(
        self,
        needs_remediation: bool,
        outcome: RemediationOutcome,
        status: StatusToken,
        detail: &str,
        failure: Option<Failure>,
    ) -> EvaluationResult {
        let message = format!("{} {}{}", status, self.setting_name, detail);
        EvaluationResult {
            group: self.group,
            setting_name: self.setting_name,
            path: self.path,
            action: self.action,
            needs_remediation,
            outcome,
            status,
            message,
            failure,
        }
    }

    /// `detail` is appended verbatim after the setting name.
    pub fn compliant(self, detail: &str) -> EvaluationResult {
        self.finish(
            false,
            RemediationOutcome::NotAttempted,
            StatusToken::Compliant,
            detail,
            None,
        )
    }

    pub fn non_compliant(self, detail: &str) -> EvaluationResult {
        self.finish(
            true,
            RemediationOutcome::NotAttempted,
            StatusToken::NonCompliant,
            detail,
            None,
        )
    }

    pub fn remediated(self, status: StatusToken, detail: &str) -> EvaluationResult {
        self.finish(true, RemediationOutcome::Succeeded, status, detail, None)
    }

    pub fn failed(self, error: &Error) -> EvaluationResult {
        let detail = format!(": {}", error);
        self.finish(
            true,
            RemediationOutcome::Failed,
            StatusToken::Error,
            &detail,
            Some(Failure::from(error)),
        )
    }
}
