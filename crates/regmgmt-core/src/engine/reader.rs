//! Value Reader
//!
//! Reads registry state and renders it in canonical form. For detection
//! every failure degrades to [`ReadOutcome::Absent`]: a value the engine
//! cannot see is a value that is not set. The `try_` variants surface
//! failures for post-remediation checks.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::{RegistryBackend, RegistryData, RegistryPath, same_name};
use crate::value::{CanonicalValue, ValueKind};
use crate::{Error, Result};

/// What the Reader found for a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadOutcome {
    Present(CanonicalValue),
    Absent,
}

impl ReadOutcome {
    pub fn is_present(&self) -> bool {
        matches!(self, ReadOutcome::Present(_))
    }

    /// Human-readable current value, `not set` when absent.
    pub fn display(&self) -> String {
        match self {
            ReadOutcome::Present(value) => value.to_string(),
            ReadOutcome::Absent => "not set".to_string(),
        }
    }

    /// Like [`display`](Self::display), but names the stored kind when it
    /// differs from `expected`, so `100 (String)` is not mistaken for DWord 100.
    pub fn display_for(&self, expected: ValueKind) -> String {
        match self {
            ReadOutcome::Present(value) if value.kind != expected => {
                format!("{} ({})", value, value.kind)
            }
            _ => self.display(),
        }
    }
}

/// Render native registry data in canonical form.
pub fn canonicalize(data: &RegistryData) -> CanonicalValue {
    match data {
        RegistryData::String(s) => CanonicalValue::text(ValueKind::String, s.clone()),
        RegistryData::ExpandString(s) => CanonicalValue::text(ValueKind::ExpandString, s.clone()),
        RegistryData::DWord(n) => CanonicalValue::integer(ValueKind::DWord, i64::from(*n as i32)),
        RegistryData::QWord(n) => CanonicalValue::integer(ValueKind::QWord, *n as i64),
        RegistryData::Binary(bytes) => CanonicalValue::text(
            ValueKind::Binary,
            bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(","),
        ),
        RegistryData::MultiString(items) => {
            CanonicalValue::text(ValueKind::MultiString, items.join("|"))
        }
    }
}

fn try_read(
    backend: &dyn RegistryBackend,
    root: &RegistryPath,
    name: &str,
) -> Result<Option<RegistryData>> {
    backend
        .read_value(root, name)
        .map_err(|source| Error::ReadFailed {
            path: format!("{}\\{}", root, name),
            source,
        })
}

/// Read a value and canonicalize it.
pub fn read_value(backend: &dyn RegistryBackend, root: &RegistryPath, name: &str) -> ReadOutcome {
    match try_read(backend, root, name) {
        Ok(Some(data)) => ReadOutcome::Present(canonicalize(&data)),
        Ok(None) => {
            debug!(path = %root, name, "Value not set");
            ReadOutcome::Absent
        }
        Err(e) => {
            debug!(error = %e, "Treating unreadable value as absent");
            ReadOutcome::Absent
        }
    }
}

/// Whether a key exists, surfacing backend failures.
pub fn try_key_present(backend: &dyn RegistryBackend, path: &RegistryPath) -> Result<bool> {
    backend.key_exists(path).map_err(|source| Error::ReadFailed {
        path: path.to_string(),
        source,
    })
}

/// Whether a value name is enumerable under an existing key, surfacing
/// backend failures.
///
/// The key existing is not enough: the name must appear among the key's
/// value names.
pub fn try_value_present(
    backend: &dyn RegistryBackend,
    root: &RegistryPath,
    name: &str,
) -> Result<bool> {
    if !try_key_present(backend, root)? {
        return Ok(false);
    }
    let names = backend.value_names(root).map_err(|source| Error::ReadFailed {
        path: format!("{}\\{}", root, name),
        source,
    })?;
    Ok(names.iter().any(|n| same_name(n, name)))
}

/// Whether a key exists. Failures count as absent.
pub fn key_present(backend: &dyn RegistryBackend, path: &RegistryPath) -> bool {
    try_key_present(backend, path).unwrap_or_else(|e| {
        debug!(error = %e, "Treating unreadable key as absent");
        false
    })
}

/// Whether a value name is enumerable. Failures count as absent.
pub fn value_present(backend: &dyn RegistryBackend, root: &RegistryPath, name: &str) -> bool {
    try_value_present(backend, root, name).unwrap_or_else(|e| {
        debug!(error = %e, "Treating unreadable value as absent");
        false
    })
}
