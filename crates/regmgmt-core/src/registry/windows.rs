//! Live Windows registry backend
//!
//! All keys are opened in the 64-bit registry view so that a 32-bit host
//! process sees the same `SOFTWARE` tree as native tools.

use std::io;

use winreg::enums::{
    HKEY_LOCAL_MACHINE, HKEY_USERS, KEY_ALL_ACCESS, KEY_READ, KEY_SET_VALUE, KEY_WOW64_64KEY,
    RegType,
};
use winreg::types::{FromRegValue, ToRegValue};
use winreg::{RegKey, RegValue};

use super::{Hive, RegistryBackend, RegistryData, RegistryPath};

/// Registry backend over the native Win32 registry API.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsRegistry;

impl WindowsRegistry {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, path: &RegistryPath, access: u32) -> io::Result<RegKey> {
        let hive = predefined(path.hive());
        if path.is_hive_root() {
            return Ok(hive);
        }
        hive.open_subkey_with_flags(path.subkey(), access | KEY_WOW64_64KEY)
    }

    /// Open a key, mapping "not found" to `None`.
    fn open_existing(&self, path: &RegistryPath, access: u32) -> io::Result<Option<RegKey>> {
        match self.open(path, access) {
            Ok(key) => Ok(Some(key)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn predefined(hive: Hive) -> RegKey {
    match hive {
        Hive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
        Hive::Users => RegKey::predef(HKEY_USERS),
    }
}

impl RegistryBackend for WindowsRegistry {
    fn key_exists(&self, path: &RegistryPath) -> io::Result<bool> {
        Ok(self.open_existing(path, KEY_READ)?.is_some())
    }

    fn read_value(&self, path: &RegistryPath, name: &str) -> io::Result<Option<RegistryData>> {
        let Some(key) = self.open_existing(path, KEY_READ)? else {
            return Ok(None);
        };
        match key.get_raw_value(name) {
            Ok(raw) => decode(raw).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn value_names(&self, path: &RegistryPath) -> io::Result<Vec<String>> {
        self.open(path, KEY_READ)?
            .enum_values()
            .map(|entry| entry.map(|(name, _)| name))
            .collect()
    }

    fn subkey_names(&self, path: &RegistryPath) -> io::Result<Vec<String>> {
        self.open(path, KEY_READ)?.enum_keys().collect()
    }

    fn create_key(&self, path: &RegistryPath) -> io::Result<()> {
        if path.is_hive_root() {
            return Ok(());
        }
        predefined(path.hive())
            .create_subkey_with_flags(path.subkey(), KEY_ALL_ACCESS | KEY_WOW64_64KEY)
            .map(|_| ())
    }

    fn set_value(&self, path: &RegistryPath, name: &str, data: &RegistryData) -> io::Result<()> {
        self.open(path, KEY_SET_VALUE)?
            .set_raw_value(name, &encode(data))
    }

    fn delete_value(&self, path: &RegistryPath, name: &str) -> io::Result<()> {
        self.open(path, KEY_SET_VALUE)?.delete_value(name)
    }

    fn delete_tree(&self, path: &RegistryPath) -> io::Result<()> {
        let (Some(parent), Some(leaf)) = (path.parent(), path.leaf_name()) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to delete hive root {}", path),
            ));
        };
        self.open(&parent, KEY_ALL_ACCESS)?.delete_subkey_all(leaf)
    }
}

fn fixed<const N: usize>(bytes: &[u8], what: &str) -> io::Result<[u8; N]> {
    bytes
        .get(..N)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} value has {} bytes, expected {}", what, bytes.len(), N),
            )
        })
}

fn decode(raw: RegValue) -> io::Result<RegistryData> {
    let data = match raw.vtype {
        RegType::REG_SZ => RegistryData::String(String::from_reg_value(&raw)?),
        RegType::REG_EXPAND_SZ => RegistryData::ExpandString(String::from_reg_value(&raw)?),
        RegType::REG_DWORD => RegistryData::DWord(u32::from_le_bytes(fixed(&raw.bytes, "REG_DWORD")?)),
        RegType::REG_QWORD => RegistryData::QWord(u64::from_le_bytes(fixed(&raw.bytes, "REG_QWORD")?)),
        RegType::REG_MULTI_SZ => {
            let mut items = Vec::<String>::from_reg_value(&raw)?;
            // An empty REG_MULTI_SZ decodes as a single empty item
            while items.last().is_some_and(String::is_empty) {
                items.pop();
            }
            RegistryData::MultiString(items)
        }
        // Anything else is compared by its raw bytes
        _ => RegistryData::Binary(raw.bytes),
    };
    Ok(data)
}

fn encode(data: &RegistryData) -> RegValue {
    match data {
        RegistryData::String(s) => s.to_reg_value(),
        RegistryData::ExpandString(s) => RegValue {
            vtype: RegType::REG_EXPAND_SZ,
            ..s.to_reg_value()
        },
        RegistryData::DWord(n) => n.to_reg_value(),
        RegistryData::QWord(n) => n.to_reg_value(),
        RegistryData::Binary(b) => RegValue {
            bytes: b.clone(),
            vtype: RegType::REG_BINARY,
        },
        RegistryData::MultiString(items) => items.to_reg_value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_string_encoding_round_trips() {
        let data = RegistryData::MultiString(vec!["A".into(), "B".into()]);
        assert_eq!(decode(encode(&data)).unwrap(), data);
    }

    #[test]
    fn expand_string_keeps_placeholders() {
        let data = RegistryData::ExpandString("%ProgramFiles%\\Contoso".into());
        assert_eq!(decode(encode(&data)).unwrap(), data);
    }

    #[test]
    fn empty_multi_string_round_trips() {
        let data = RegistryData::MultiString(Vec::new());
        assert_eq!(decode(encode(&data)).unwrap(), data);
    }

    #[test]
    fn values_keep_their_native_type() {
        assert!(matches!(encode(&RegistryData::ExpandString("%TEMP%".into())).vtype, RegType::REG_EXPAND_SZ));
        assert!(matches!(encode(&RegistryData::DWord(100)).vtype, RegType::REG_DWORD));
        assert!(matches!(encode(&RegistryData::QWord(1)).vtype, RegType::REG_QWORD));
    }

    #[test]
    fn short_dword_is_invalid_data() {
        let raw = RegValue {
            bytes: vec![1, 0],
            vtype: RegType::REG_DWORD,
        };
        assert_eq!(decode(raw).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}
