//! Registry snapshots
//!
//! A snapshot is a TOML description of registry keys and typed values. It is
//! loaded into a [`MemoryRegistry`] through the Value Writer, so a manifest
//! can be evaluated offline against a known state.
//!
//! ```toml
//! [[keys]]
//! path = 'HKLM\SOFTWARE\Contoso'
//!
//! [[keys.values]]
//! name = "AwesomeLevel"
//! type = "DWord"
//! value = 5
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{MemoryRegistry, RegistryBackend, RegistryPath};
use crate::engine::writer;
use crate::value::{DeclaredValue, ValueKind};
use crate::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotValue {
    name: String,
    #[serde(rename = "type")]
    kind: ValueKind,
    value: DeclaredValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotKey {
    path: String,
    #[serde(default)]
    values: Vec<SnapshotValue>,
}

/// Parsed registry snapshot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    keys: Vec<SnapshotKey>,
}

impl Snapshot {
    pub fn parse(content: &str) -> Result<Self> {
        let snapshot: Snapshot = toml::from_str(content)?;
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Write every key and value into `backend`.
    pub fn apply_to(&self, backend: &dyn RegistryBackend) -> Result<()> {
        for key in &self.keys {
            let path = RegistryPath::parse(&key.path)?;
            backend.create_key(&path).map_err(|source| Error::WriteFailed {
                path: path.to_string(),
                source,
            })?;
            for value in &key.values {
                writer::write_value(backend, &path, &value.name, value.kind, &value.value)?;
            }
        }
        debug!(keys = self.keys.len(), "Applied snapshot");
        Ok(())
    }

    /// Materialize the snapshot as a fresh in-memory registry.
    pub fn into_registry(self) -> Result<MemoryRegistry> {
        let registry = MemoryRegistry::new();
        self.apply_to(&registry)?;
        Ok(registry)
    }
}
