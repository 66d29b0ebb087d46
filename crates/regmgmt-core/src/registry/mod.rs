//! Registry backend abstraction
//!
//! The engine talks to the registry only through [`RegistryBackend`], so the
//! same evaluation logic runs against the live Windows registry and against
//! an in-memory store loaded from a snapshot.

mod memory;
mod path;
mod snapshot;
#[cfg(windows)]
mod windows;

pub use memory::MemoryRegistry;
pub use path::{Hive, RegistryPath, fold_name, normalize_subkey, same_name};
pub use snapshot::Snapshot;
#[cfg(windows)]
pub use windows::WindowsRegistry;

use std::io;

use crate::value::ValueKind;

/// Native registry data, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryData {
    String(String),
    ExpandString(String),
    DWord(u32),
    QWord(u64),
    Binary(Vec<u8>),
    MultiString(Vec<String>),
}

impl RegistryData {
    pub fn kind(&self) -> ValueKind {
        match self {
            RegistryData::String(_) => ValueKind::String,
            RegistryData::ExpandString(_) => ValueKind::ExpandString,
            RegistryData::DWord(_) => ValueKind::DWord,
            RegistryData::QWord(_) => ValueKind::QWord,
            RegistryData::Binary(_) => ValueKind::Binary,
            RegistryData::MultiString(_) => ValueKind::MultiString,
        }
    }
}

/// Trait for registry access.
///
/// Methods mirror the native registry API closely and report failures as
/// `std::io::Error`; the engine decides which failures are fatal to a
/// setting and which degrade to "absent".
pub trait RegistryBackend: Send + Sync {
    /// Whether the key exists. Hive roots always exist.
    fn key_exists(&self, path: &RegistryPath) -> io::Result<bool>;

    /// Read a value.
    ///
    /// Returns `Ok(None)` when either the key or the value is missing.
    fn read_value(&self, path: &RegistryPath, name: &str) -> io::Result<Option<RegistryData>>;

    /// Names of the values stored directly under the key.
    fn value_names(&self, path: &RegistryPath) -> io::Result<Vec<String>>;

    /// Names of the direct subkeys of the key.
    fn subkey_names(&self, path: &RegistryPath) -> io::Result<Vec<String>>;

    /// Create the key and any missing ancestors. Succeeds if it already exists.
    fn create_key(&self, path: &RegistryPath) -> io::Result<()>;

    /// Write a value under an existing key, replacing any previous value.
    fn set_value(&self, path: &RegistryPath, name: &str, data: &RegistryData) -> io::Result<()>;

    /// Remove a value from an existing key.
    fn delete_value(&self, path: &RegistryPath, name: &str) -> io::Result<()>;

    /// Remove a key with all of its values and descendants.
    fn delete_tree(&self, path: &RegistryPath) -> io::Result<()>;
}
