//! Compliance Evaluator
//!
//! Runs one declared setting against one registry root. Detection never
//! fails: unreadable state is scored as absent. Remediation failures are
//! captured on the returned result so the caller can move on to the next
//! setting.

use tracing::{info, warn};

use super::compare::is_compliant;
use super::reader::{key_present, read_value, try_key_present, try_value_present, value_present};
use super::result::{EvaluationResult, ResultBuilder, StatusToken};
use super::writer;
use crate::config::{DeleteKeySetting, DeleteSetting, SetSetting, Setting};
use crate::registry::{RegistryBackend, RegistryPath};
use crate::run::RunMode;
use crate::{Error, Result};

/// Evaluates settings against a registry backend in a fixed run mode.
pub struct Evaluator<'a> {
    backend: &'a dyn RegistryBackend,
    mode: RunMode,
}

impl<'a> Evaluator<'a> {
    pub fn new(backend: &'a dyn RegistryBackend, mode: RunMode) -> Self {
        Self { backend, mode }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Evaluate `setting` under `root`, remediating if the mode says so.
    pub fn evaluate(&self, group: &str, root: &RegistryPath, setting: &Setting) -> EvaluationResult {
        let builder = ResultBuilder {
            group: group.to_string(),
            setting_name: setting.name().to_string(),
            path: root.to_string(),
            action: setting.action(),
        };

        let result = match setting {
            Setting::Set(s) => self.evaluate_set(builder, root, s),
            Setting::Delete(s) => self.evaluate_delete(builder, root, s),
            Setting::DeleteKey(s) => self.evaluate_delete_key(builder, root, s),
        };

        if result.is_failed() {
            warn!(path = %root, setting = %result.setting_name, "{}", result.message);
        }
        result
    }

    fn evaluate_set(&self, builder: ResultBuilder, root: &RegistryPath, s: &SetSetting) -> EvaluationResult {
        let current = read_value(self.backend, root, &s.name);
        if is_compliant(&current, s.kind, &s.value) {
            return builder.compliant("");
        }

        let was = current.display_for(s.kind);
        if self.mode == RunMode::Detect {
            return builder.non_compliant(&format!(" (current: {}, expected: {})", was, s.value));
        }

        match self.remediate_set(root, s) {
            Ok(()) => {
                info!(path = %root, name = %s.name, was = %was, now = %s.value, "Remediated value");
                builder.remediated(StatusToken::Remediated, &format!(" (was: {}, now: {})", was, s.value))
            }
            Err(e) => builder.failed(&e),
        }
    }

    fn remediate_set(&self, root: &RegistryPath, s: &SetSetting) -> Result<()> {
        writer::write_value(self.backend, root, &s.name, s.kind, &s.value)?;

        let after = read_value(self.backend, root, &s.name);
        if is_compliant(&after, s.kind, &s.value) {
            Ok(())
        } else {
            Err(Error::VerificationFailed {
                target: format!("{}\\{}", root, s.name),
                detail: format!("read back {} after writing {}", after.display_for(s.kind), s.value),
            })
        }
    }

    fn evaluate_delete(&self, builder: ResultBuilder, root: &RegistryPath, s: &DeleteSetting) -> EvaluationResult {
        if !value_present(self.backend, root, &s.name) {
            return builder.compliant(" (not present)");
        }
        if self.mode == RunMode::Detect {
            return builder.non_compliant(" (exists, should be deleted)");
        }

        let outcome = writer::delete_value(self.backend, root, &s.name).and_then(|()| {
            verify_absent(
                format!("{}\\{}", root, s.name),
                "value",
                try_value_present(self.backend, root, &s.name),
            )
        });

        match outcome {
            Ok(()) => {
                info!(path = %root, name = %s.name, "Deleted value");
                builder.remediated(StatusToken::Deleted, "")
            }
            Err(e) => builder.failed(&e),
        }
    }

    fn evaluate_delete_key(
        &self,
        builder: ResultBuilder,
        root: &RegistryPath,
        s: &DeleteKeySetting,
    ) -> EvaluationResult {
        let target = root.join(&s.name);
        if !key_present(self.backend, &target) {
            return builder.compliant(" (key not present)");
        }
        if self.mode == RunMode::Detect {
            return builder.non_compliant(" (key exists, should be deleted)");
        }

        let outcome = writer::delete_tree(self.backend, &target).and_then(|()| {
            verify_absent(target.to_string(), "key", try_key_present(self.backend, &target))
        });

        match outcome {
            Ok(()) => {
                info!(path = %target, "Deleted key");
                builder.remediated(StatusToken::DeletedKey, "")
            }
            Err(e) => builder.failed(&e),
        }
    }
}

/// Post-delete check: only a successful read showing absence verifies.
fn verify_absent(target: String, what: &str, present: Result<bool>) -> Result<()> {
    match present {
        Ok(false) => Ok(()),
        Ok(true) => Err(Error::VerificationFailed {
            target,
            detail: format!("{} still present after delete", what),
        }),
        Err(e) => Err(Error::VerificationFailed {
            target,
            detail: format!("could not confirm removal: {}", e),
        }),
    }
}
