//! Configuration fixtures

use std::fs;
use std::path::PathBuf;

use regmgmt_core::Manifest;
use tempfile::TempDir;

/// Parse a manifest, panicking on invalid fixtures.
pub fn manifest(toml: &str) -> Manifest {
    Manifest::parse(toml).expect("fixture manifest must be valid")
}

/// Write `content` to `name` inside a fresh temporary directory.
///
/// The directory is returned alongside the path so it outlives the test.
pub fn write_temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write fixture file");
    (dir, path)
}

/// The scenario manifest: one user group and two machine groups covering
/// every action.
pub const SCENARIO_MANIFEST: &str = r#"
[[user]]
name = "Blog"
description = "Per-user blog settings"
base_path = 'Software\Contoso\Blog'

[[user.settings]]
name = "BlogURL"
type = "String"
value = "https://x"

[[machine]]
name = "Contoso"
description = "Machine-wide Contoso settings"
base_path = 'SOFTWARE\Contoso'

[[machine.settings]]
name = "AwesomeLevel"
type = "DWord"
value = 100

[[machine.settings]]
action = "DeleteKey"
name = "OldVendor"

[[machine]]
name = "Installer"
description = "Windows Installer policy"
base_path = 'SOFTWARE\Policies\Microsoft\Windows\Installer'

[[machine.settings]]
action = "Delete"
name = "PreventInstallationFromMsi"
"#;
