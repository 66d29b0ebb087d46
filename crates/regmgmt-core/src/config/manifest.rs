//! Manifest parsing for settings files
//!
//! A manifest holds the configuration groups for both scopes. Groups are
//! validated and their base paths normalized once at load time.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::setting::Setting;
use crate::registry::{Hive, normalize_subkey};
use crate::{Error, Result};

/// Which registry roots a group applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Applied to every resolved user hive under `HKU`
    User,
    /// Applied once under `HKLM`
    Machine,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::User => f.write_str("user"),
            Scope::Machine => f.write_str("machine"),
        }
    }
}

/// A named bundle of settings under one base path
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Scope-relative key path, without a hive or user segment
    pub base_path: String,
    /// Evaluated in declaration order
    #[serde(default)]
    pub settings: Vec<Setting>,
}

impl ConfigurationGroup {
    fn validate(&mut self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidSetting {
                name: self.base_path.clone(),
                reason: "group name must not be empty".to_string(),
            });
        }

        let normalized = normalize_subkey(&self.base_path);
        let first = normalized.split('\\').next().unwrap_or_default();
        if Hive::from_segment(first).is_some() || first.eq_ignore_ascii_case("HKCU") {
            return Err(Error::InvalidPath {
                path: self.base_path.clone(),
                reason: format!("base path of group '{}' must be scope-relative", self.name),
            });
        }
        if normalized.is_empty() {
            return Err(Error::InvalidPath {
                path: self.base_path.clone(),
                reason: format!("base path of group '{}' is empty", self.name),
            });
        }
        self.base_path = normalized;
        Ok(())
    }
}

/// Settings manifest parsed from a TOML file
///
/// ```toml
/// [[user]]
/// name = "Browser"
/// base_path = 'SOFTWARE\Policies\Contoso\Browser'
///
/// [[user.settings]]
/// name = "BlogURL"
/// type = "String"
/// value = "https://x"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "user")]
    pub user_groups: Vec<ConfigurationGroup>,

    #[serde(default, rename = "machine")]
    pub machine_groups: Vec<ConfigurationGroup>,
}

impl Manifest {
    /// Parse and validate a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use regmgmt_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [[machine]]
    /// name = "Installer"
    /// base_path = 'SOFTWARE/Policies/Microsoft/Windows/Installer/'
    ///
    /// [[machine.settings]]
    /// action = "Delete"
    /// name = "PreventInstallationFromMsi"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.machine_groups[0].base_path, r"SOFTWARE\Policies\Microsoft\Windows\Installer");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest: Manifest = toml::from_str(content)?;
        for group in manifest
            .user_groups
            .iter_mut()
            .chain(manifest.machine_groups.iter_mut())
        {
            group.validate()?;
        }
        Ok(manifest)
    }

    /// Load a manifest from a file
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist, or a parse or
    /// validation error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn groups(&self, scope: Scope) -> &[ConfigurationGroup] {
        match scope {
            Scope::User => &self.user_groups,
            Scope::Machine => &self.machine_groups,
        }
    }

    /// Drop every group of the given scope
    pub fn clear_scope(&mut self, scope: Scope) {
        match scope {
            Scope::User => self.user_groups.clear(),
            Scope::Machine => self.machine_groups.clear(),
        }
    }

    /// Keep only the named groups (case-insensitive). An empty filter keeps
    /// everything.
    pub fn retain_groups(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        let wanted = |group: &ConfigurationGroup| names.iter().any(|n| n.eq_ignore_ascii_case(&group.name));
        self.user_groups.retain(wanted);
        self.machine_groups.retain(wanted);
    }

    /// Number of declared settings across both scopes
    pub fn setting_count(&self) -> usize {
        self.user_groups
            .iter()
            .chain(&self.machine_groups)
            .map(|g| g.settings.len())
            .sum()
    }
}
