//! Hive-rooted registry paths

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Top-level registry namespaces the engine targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hive {
    /// The per-machine store (`HKEY_LOCAL_MACHINE`)
    LocalMachine,
    /// The loaded per-user stores (`HKEY_USERS`)
    Users,
}

impl Hive {
    /// Short display name, e.g. `HKLM`
    pub fn short_name(&self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKLM",
            Hive::Users => "HKU",
        }
    }

    /// Recognize a hive segment, case-insensitively.
    ///
    /// Accepts short names, full `HKEY_*` names and the PowerShell drive
    /// form with a trailing colon (`HKLM:`).
    pub fn from_segment(segment: &str) -> Option<Self> {
        let segment = segment.trim_end_matches(':').to_ascii_uppercase();
        match segment.as_str() {
            "HKLM" | "HKEY_LOCAL_MACHINE" => Some(Hive::LocalMachine),
            "HKU" | "HKEY_USERS" => Some(Hive::Users),
            _ => None,
        }
    }
}

impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Normalize a subkey fragment to backslash separators with no empty segments.
pub fn normalize_subkey(subkey: &str) -> String {
    subkey
        .split(['\\', '/'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\\")
}

/// Case-fold a key or value name. Keys and value names share this rule.
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Whether two key or value names refer to the same registry entry.
pub fn same_name(a: &str, b: &str) -> bool {
    fold_name(a) == fold_name(b)
}

/// A registry key path: a hive plus a backslash-separated subkey.
///
/// The subkey is kept normalized, so `SOFTWARE//Contoso/` and
/// `SOFTWARE\Contoso` are the same path. An empty subkey is the hive root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    hive: Hive,
    subkey: String,
}

impl RegistryPath {
    pub fn new(hive: Hive, subkey: &str) -> Self {
        Self {
            hive,
            subkey: normalize_subkey(subkey),
        }
    }

    /// The root key of a hive.
    pub fn hive_root(hive: Hive) -> Self {
        Self {
            hive,
            subkey: String::new(),
        }
    }

    /// Parse a full path such as `HKLM\SOFTWARE\Contoso` or
    /// `HKEY_USERS/S-1-5-21-.../Software`.
    pub fn parse(path: &str) -> Result<Self> {
        let normalized = normalize_subkey(path);
        let (head, rest) = match normalized.split_once('\\') {
            Some((head, rest)) => (head, rest),
            None => (normalized.as_str(), ""),
        };

        let hive = Hive::from_segment(head).ok_or_else(|| Error::InvalidPath {
            path: path.to_string(),
            reason: format!("'{}' is not a supported hive", head),
        })?;

        Ok(Self::new(hive, rest))
    }

    pub fn hive(&self) -> Hive {
        self.hive
    }

    /// The subkey below the hive, without a leading separator.
    pub fn subkey(&self) -> &str {
        &self.subkey
    }

    pub fn is_hive_root(&self) -> bool {
        self.subkey.is_empty()
    }

    /// Join one or more path segments onto this path.
    pub fn join(&self, segment: &str) -> Self {
        let segment = normalize_subkey(segment);
        let subkey = match (self.subkey.is_empty(), segment.is_empty()) {
            (_, true) => self.subkey.clone(),
            (true, false) => segment,
            (false, false) => format!("{}\\{}", self.subkey, segment),
        };
        Self {
            hive: self.hive,
            subkey,
        }
    }

    /// The parent key, or `None` for a hive root.
    pub fn parent(&self) -> Option<Self> {
        if self.subkey.is_empty() {
            return None;
        }
        let subkey = match self.subkey.rfind('\\') {
            Some(idx) => self.subkey[..idx].to_string(),
            None => String::new(),
        };
        Some(Self {
            hive: self.hive,
            subkey,
        })
    }

    /// The last path segment, or `None` for a hive root.
    pub fn leaf_name(&self) -> Option<&str> {
        if self.subkey.is_empty() {
            None
        } else {
            self.subkey.rsplit('\\').next()
        }
    }

    /// Ancestors from the first subkey segment down to this path itself.
    pub fn lineage(&self) -> Vec<Self> {
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(path) = current {
            if path.is_hive_root() {
                break;
            }
            current = path.parent();
            chain.push(path);
        }
        chain.reverse();
        chain
    }

    /// Case-folded form for identity comparisons; registry keys are
    /// case-insensitive.
    pub fn folded(&self) -> String {
        fold_name(&self.to_string())
    }
}

impl fmt::Display for RegistryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subkey.is_empty() {
            write!(f, "{}", self.hive)
        } else {
            write!(f, "{}\\{}", self.hive, self.subkey)
        }
    }
}
