//! Value Writer
//!
//! Coerces declared values into native registry data and applies writes and
//! deletions. Any rejected operation surfaces as [`Error::WriteFailed`].

use tracing::debug;

use crate::registry::{RegistryBackend, RegistryData, RegistryPath};
use crate::value::{DeclaredValue, ValueKind};
use crate::{Error, Result};

fn invalid(kind: ValueKind, value: &DeclaredValue, reason: impl Into<String>) -> Error {
    Error::InvalidValueFormat {
        kind,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_hex_bytes(text: &str) -> std::result::Result<Vec<u8>, String> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(str::trim)
        .map(|token| {
            if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(format!("'{}' is not a two-digit hex byte", token));
            }
            u8::from_str_radix(token, 16).map_err(|e| e.to_string())
        })
        .collect()
}

/// REG_MULTI_SZ is terminated by an empty string, so an empty item would
/// truncate the value on the live registry.
fn multi_string_items(items: Vec<String>) -> std::result::Result<Vec<String>, String> {
    if items.iter().any(String::is_empty) {
        return Err("MultiString items must not be empty".to_string());
    }
    Ok(items)
}

/// Coerce a declared value into the native representation for `kind`.
pub fn coerce(kind: ValueKind, declared: &DeclaredValue) -> Result<RegistryData> {
    let data = match (kind, declared) {
        (ValueKind::String, DeclaredValue::Text(s)) => RegistryData::String(s.clone()),
        (ValueKind::String, DeclaredValue::Integer(n)) => RegistryData::String(n.to_string()),
        (ValueKind::ExpandString, DeclaredValue::Text(s)) => RegistryData::ExpandString(s.clone()),
        (ValueKind::ExpandString, DeclaredValue::Integer(n)) => {
            RegistryData::ExpandString(n.to_string())
        }
        (ValueKind::DWord, DeclaredValue::Integer(n)) => {
            let n = i32::try_from(*n)
                .map_err(|_| invalid(kind, declared, "out of range for a 32-bit integer"))?;
            RegistryData::DWord(n as u32)
        }
        (ValueKind::DWord, DeclaredValue::Text(s)) => {
            let n: i32 = s
                .trim()
                .parse()
                .map_err(|_| invalid(kind, declared, "not a 32-bit integer"))?;
            RegistryData::DWord(n as u32)
        }
        (ValueKind::QWord, DeclaredValue::Integer(n)) => RegistryData::QWord(*n as u64),
        (ValueKind::QWord, DeclaredValue::Text(s)) => {
            let n: i64 = s
                .trim()
                .parse()
                .map_err(|_| invalid(kind, declared, "not a 64-bit integer"))?;
            RegistryData::QWord(n as u64)
        }
        (ValueKind::Binary, DeclaredValue::Text(s)) => {
            RegistryData::Binary(parse_hex_bytes(s).map_err(|reason| invalid(kind, declared, reason))?)
        }
        (ValueKind::MultiString, DeclaredValue::Text(s)) => {
            let items = if s.is_empty() {
                Vec::new()
            } else {
                s.split('|').map(str::to_string).collect()
            };
            RegistryData::MultiString(multi_string_items(items).map_err(|reason| invalid(kind, declared, reason))?)
        }
        (ValueKind::MultiString, DeclaredValue::List(items)) => RegistryData::MultiString(
            multi_string_items(items.clone()).map_err(|reason| invalid(kind, declared, reason))?,
        ),
        (_, DeclaredValue::List(_)) => {
            return Err(invalid(kind, declared, "a list is only valid for MultiString"));
        }
        (_, DeclaredValue::Integer(_)) => {
            return Err(invalid(kind, declared, "expected a string value"));
        }
    };
    Ok(data)
}

fn write_failed(path: &RegistryPath, name: Option<&str>) -> impl FnOnce(std::io::Error) -> Error {
    let path = match name {
        Some(name) => format!("{}\\{}", path, name),
        None => path.to_string(),
    };
    move |source| Error::WriteFailed { path, source }
}

/// Write a declared value, creating the key and its ancestors as needed.
///
/// The value is coerced before anything is touched, so a malformed
/// declaration never leaves an empty key behind.
pub fn write_value(
    backend: &dyn RegistryBackend,
    root: &RegistryPath,
    name: &str,
    kind: ValueKind,
    declared: &DeclaredValue,
) -> Result<()> {
    let data = coerce(kind, declared)?;
    backend.create_key(root).map_err(write_failed(root, None))?;
    backend
        .set_value(root, name, &data)
        .map_err(write_failed(root, Some(name)))?;
    debug!(path = %root, name, kind = %kind, "Wrote value");
    Ok(())
}

/// Remove a single value.
pub fn delete_value(backend: &dyn RegistryBackend, root: &RegistryPath, name: &str) -> Result<()> {
    backend
        .delete_value(root, name)
        .map_err(write_failed(root, Some(name)))
}

/// Remove a key and everything below it.
pub fn delete_tree(backend: &dyn RegistryBackend, path: &RegistryPath) -> Result<()> {
    backend.delete_tree(path).map_err(write_failed(path, None))
}
