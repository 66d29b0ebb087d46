//! Declared settings
//!
//! Settings are written loosely in configuration (an optional `action`, with
//! `type` and `value` only meaningful for `Set`) and decoded once into the
//! closed [`Setting`] enum, so evaluation never inspects optional fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::value::{DeclaredValue, ValueKind};

/// What a setting asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Ensure a value exists with the declared type and data
    #[default]
    Set,
    /// Ensure a value does not exist
    Delete,
    /// Ensure a subkey and everything under it does not exist
    DeleteKey,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Set => "Set",
            Action::Delete => "Delete",
            Action::DeleteKey => "DeleteKey",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSetting {
    /// Value name
    pub name: String,
    pub kind: ValueKind,
    pub value: DeclaredValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSetting {
    /// Value name
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteKeySetting {
    /// Subkey name, relative to the group's base path
    pub name: String,
}

/// A validated declared setting
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSetting")]
pub enum Setting {
    Set(SetSetting),
    Delete(DeleteSetting),
    DeleteKey(DeleteKeySetting),
}

impl Setting {
    pub fn name(&self) -> &str {
        match self {
            Setting::Set(s) => &s.name,
            Setting::Delete(s) => &s.name,
            Setting::DeleteKey(s) => &s.name,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Setting::Set(_) => Action::Set,
            Setting::Delete(_) => Action::Delete,
            Setting::DeleteKey(_) => Action::DeleteKey,
        }
    }
}

/// Setting as written in configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSetting {
    name: String,
    #[serde(default)]
    action: Action,
    #[serde(rename = "type", default)]
    kind: Option<ValueKind>,
    #[serde(default)]
    value: Option<DeclaredValue>,
}

impl TryFrom<RawSetting> for Setting {
    type Error = Error;

    fn try_from(raw: RawSetting) -> Result<Self, Self::Error> {
        let name = raw.name.trim().to_string();
        let invalid = |reason: &str| Error::InvalidSetting {
            name: name.clone(),
            reason: reason.to_string(),
        };

        // The default value is the unnamed "(Default)" entry, which is a
        // legitimate Set/Delete target; only subkeys need a name.
        if name.is_empty() && raw.action == Action::DeleteKey {
            return Err(invalid("DeleteKey requires a subkey name"));
        }

        let setting = match raw.action {
            Action::Set => {
                let kind = raw.kind.ok_or_else(|| invalid("Set requires a type"))?;
                let value = raw.value.ok_or_else(|| invalid("Set requires a value"))?;
                Setting::Set(SetSetting { name, kind, value })
            }
            Action::Delete => Setting::Delete(DeleteSetting { name }),
            Action::DeleteKey => {
                if name.contains(['\\', '/']) {
                    return Err(invalid("DeleteKey name must be a single subkey"));
                }
                Setting::DeleteKey(DeleteKeySetting { name })
            }
        };
        Ok(setting)
    }
}
