//! In-memory registry backend
//!
//! Keys and value names are matched case-insensitively, as in the native
//! registry, while enumeration returns names as they were first written.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RegistryBackend, RegistryData, RegistryPath, same_name};

#[derive(Debug)]
struct KeyNode {
    path: RegistryPath,
    values: Vec<(String, RegistryData)>,
}

impl KeyNode {
    fn new(path: RegistryPath) -> Self {
        Self {
            path,
            values: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.values
            .iter()
            .position(|(existing, _)| same_name(existing, name))
    }

    fn put(&mut self, name: &str, data: RegistryData) {
        match self.position(name) {
            Some(idx) => self.values[idx].1 = data,
            None => self.values.push((name.to_string(), data)),
        }
    }
}

#[derive(Debug)]
struct PinnedValue {
    key: String,
    name: String,
    data: RegistryData,
}

#[derive(Debug, Default)]
struct State {
    keys: BTreeMap<String, KeyNode>,
    denied: Vec<String>,
    pinned: Vec<PinnedValue>,
}

impl State {
    fn is_denied(&self, path: &RegistryPath) -> bool {
        let key = path.folded();
        self.denied
            .iter()
            .any(|d| key == *d || key.starts_with(&format!("{}\\", d)))
    }

    fn pinned(&self, key: &str, name: &str) -> Option<&RegistryData> {
        self.pinned
            .iter()
            .find(|p| p.key == key && same_name(&p.name, name))
            .map(|p| &p.data)
    }

    fn insert_lineage(&mut self, path: &RegistryPath) {
        for ancestor in path.lineage() {
            self.keys
                .entry(ancestor.folded())
                .or_insert_with(|| KeyNode::new(ancestor));
        }
    }

    fn node_mut(&mut self, path: &RegistryPath) -> io::Result<&mut KeyNode> {
        self.keys.get_mut(&path.folded()).ok_or_else(|| not_found(path))
    }
}

fn not_found(path: &RegistryPath) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("key {} does not exist", path))
}

fn access_denied(path: &RegistryPath) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("access to {} is denied", path),
    )
}

/// Registry backend held entirely in memory.
///
/// Besides backing tests and offline snapshots, it can simulate the two
/// failure modes the engine must tolerate: rejected writes
/// ([`deny_writes`](Self::deny_writes)) and another agent re-applying a value
/// right after the engine changes it ([`pin_value`](Self::pin_value)).
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<State>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a value, creating the key as needed. Ignores fault injection.
    pub fn with_value(self, path: &RegistryPath, name: &str, data: RegistryData) -> Self {
        {
            let mut state = self.state();
            state.insert_lineage(path);
            if let Some(node) = state.keys.get_mut(&path.folded()) {
                node.put(name, data);
            }
        }
        self
    }

    /// Seed an empty key, creating ancestors as needed.
    pub fn with_key(self, path: &RegistryPath) -> Self {
        self.state().insert_lineage(path);
        self
    }

    /// Reject every write, value delete and tree delete at or below `path`.
    pub fn deny_writes(&self, path: &RegistryPath) {
        self.state().denied.push(path.folded());
    }

    /// Keep a value fixed at `data`: later writes and deletes of it appear to
    /// succeed but the value is immediately restored.
    pub fn pin_value(&self, path: &RegistryPath, name: &str, data: RegistryData) {
        let mut state = self.state();
        state.insert_lineage(path);
        if let Some(node) = state.keys.get_mut(&path.folded()) {
            node.put(name, data.clone());
        }
        state.pinned.push(PinnedValue {
            key: path.folded(),
            name: name.to_string(),
            data,
        });
    }

    /// Number of keys currently stored, excluding hive roots.
    pub fn key_count(&self) -> usize {
        self.state().keys.len()
    }
}

impl RegistryBackend for MemoryRegistry {
    fn key_exists(&self, path: &RegistryPath) -> io::Result<bool> {
        if path.is_hive_root() {
            return Ok(true);
        }
        Ok(self.state().keys.contains_key(&path.folded()))
    }

    fn read_value(&self, path: &RegistryPath, name: &str) -> io::Result<Option<RegistryData>> {
        let state = self.state();
        let Some(node) = state.keys.get(&path.folded()) else {
            return Ok(None);
        };
        Ok(node.position(name).map(|idx| node.values[idx].1.clone()))
    }

    fn value_names(&self, path: &RegistryPath) -> io::Result<Vec<String>> {
        if path.is_hive_root() {
            return Ok(Vec::new());
        }
        let state = self.state();
        let node = state.keys.get(&path.folded()).ok_or_else(|| not_found(path))?;
        Ok(node.values.iter().map(|(name, _)| name.clone()).collect())
    }

    fn subkey_names(&self, path: &RegistryPath) -> io::Result<Vec<String>> {
        let state = self.state();
        if !path.is_hive_root() && !state.keys.contains_key(&path.folded()) {
            return Err(not_found(path));
        }
        Ok(state
            .keys
            .values()
            .filter(|node| is_child_of(&node.path, path))
            .filter_map(|node| node.path.leaf_name().map(str::to_string))
            .collect())
    }

    fn create_key(&self, path: &RegistryPath) -> io::Result<()> {
        let mut state = self.state();
        if state.is_denied(path) && !state.keys.contains_key(&path.folded()) {
            return Err(access_denied(path));
        }
        state.insert_lineage(path);
        Ok(())
    }

    fn set_value(&self, path: &RegistryPath, name: &str, data: &RegistryData) -> io::Result<()> {
        let mut state = self.state();
        if state.is_denied(path) {
            return Err(access_denied(path));
        }
        let effective = state
            .pinned(&path.folded(), name)
            .cloned()
            .unwrap_or_else(|| data.clone());
        state.node_mut(path)?.put(name, effective);
        Ok(())
    }

    fn delete_value(&self, path: &RegistryPath, name: &str) -> io::Result<()> {
        let mut state = self.state();
        if state.is_denied(path) {
            return Err(access_denied(path));
        }
        if state.pinned(&path.folded(), name).is_some() {
            return Ok(());
        }
        let node = state.node_mut(path)?;
        let idx = node.position(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("value '{}' does not exist under {}", name, path),
            )
        })?;
        node.values.remove(idx);
        Ok(())
    }

    fn delete_tree(&self, path: &RegistryPath) -> io::Result<()> {
        if path.is_hive_root() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to delete hive root {}", path),
            ));
        }
        let mut state = self.state();
        if state.is_denied(path) {
            return Err(access_denied(path));
        }
        let key = path.folded();
        if !state.keys.contains_key(&key) {
            return Err(not_found(path));
        }
        let prefix = format!("{}\\", key);
        state.keys.retain(|k, _| *k != key && !k.starts_with(&prefix));
        Ok(())
    }
}

fn is_child_of(candidate: &RegistryPath, parent: &RegistryPath) -> bool {
    candidate
        .parent()
        .is_some_and(|p| p.folded() == parent.folded())
}
