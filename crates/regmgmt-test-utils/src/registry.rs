//! Registry fixtures

use regmgmt_core::{Hive, MemoryRegistry, RegistryPath};

/// A local account SID
pub const LOCAL_USER_SID: &str = "S-1-5-21-1004336348-1177238915-682003330-1001";

/// A cloud-joined account SID
pub const CLOUD_USER_SID: &str = "S-1-12-1-3451234567-1234567890-2345678901-3456789012";

/// `HKLM\<subkey>`
pub fn machine_path(subkey: &str) -> RegistryPath {
    RegistryPath::new(Hive::LocalMachine, subkey)
}

/// `HKU\<sid>\<subkey>`
pub fn user_path(sid: &str, subkey: &str) -> RegistryPath {
    RegistryPath::new(Hive::Users, sid).join(subkey)
}

/// A registry with the given user hives loaded, plus the service and
/// `_Classes` hives a real machine always has.
pub fn with_loaded_users(sids: &[&str]) -> MemoryRegistry {
    let users = RegistryPath::hive_root(Hive::Users);
    let mut registry = MemoryRegistry::new()
        .with_key(&users.join(".DEFAULT"))
        .with_key(&users.join("S-1-5-18"));
    for sid in sids {
        registry = registry
            .with_key(&users.join(sid).join("Software"))
            .with_key(&users.join(&format!("{}_Classes", sid)));
    }
    registry
}
