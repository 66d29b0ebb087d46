//! Registry value types, declared values and their canonical form

use std::fmt;

use serde::{Deserialize, Serialize};

/// The registry value types a setting can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(alias = "REG_SZ")]
    String,
    #[serde(alias = "REG_EXPAND_SZ")]
    ExpandString,
    #[serde(alias = "REG_DWORD")]
    DWord,
    #[serde(alias = "REG_QWORD")]
    QWord,
    #[serde(alias = "REG_BINARY")]
    Binary,
    #[serde(alias = "REG_MULTI_SZ")]
    MultiString,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "String",
            ValueKind::ExpandString => "ExpandString",
            ValueKind::DWord => "DWord",
            ValueKind::QWord => "QWord",
            ValueKind::Binary => "Binary",
            ValueKind::MultiString => "MultiString",
        };
        f.write_str(name)
    }
}

/// A declared logical value, as written in configuration.
///
/// Its meaning depends on the [`ValueKind`] it is paired with: an integer for
/// DWord/QWord, a comma-separated hex string for Binary, a pipe-delimited
/// string or a list for MultiString, plain text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredValue {
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for DeclaredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredValue::Integer(n) => write!(f, "{}", n),
            DeclaredValue::Text(s) => f.write_str(s),
            DeclaredValue::List(items) => f.write_str(&items.join("|")),
        }
    }
}

impl From<i64> for DeclaredValue {
    fn from(n: i64) -> Self {
        DeclaredValue::Integer(n)
    }
}

impl From<&str> for DeclaredValue {
    fn from(s: &str) -> Self {
        DeclaredValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for DeclaredValue {
    fn from(items: Vec<String>) -> Self {
        DeclaredValue::List(items)
    }
}

/// Comparable payload of a canonical value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CanonicalData {
    Integer(i64),
    Text(String),
}

/// Read-side normalized value.
///
/// Binary data is rendered as `"3c,00,1f"`, multi-strings as `"A|B|C"` and
/// integers as their signed logical value, so two values are equivalent iff
/// their kinds and data are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalValue {
    pub kind: ValueKind,
    pub data: CanonicalData,
}

impl CanonicalValue {
    pub fn text(kind: ValueKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            data: CanonicalData::Text(text.into()),
        }
    }

    pub fn integer(kind: ValueKind, n: i64) -> Self {
        Self {
            kind,
            data: CanonicalData::Integer(n),
        }
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            CanonicalData::Integer(n) => write!(f, "{}", n),
            CanonicalData::Text(s) => f.write_str(s),
        }
    }
}
