//! End-to-end scenarios through the runner
//!
//! Each test builds an in-memory registry, runs a manifest through
//! [`Runner`] and checks both the reported messages and the registry state
//! left behind.

use pretty_assertions::assert_eq;
use regmgmt_core::{
    IdentityContext, LoadedHiveIdentities, MemoryRegistry, RegistryBackend, RegistryData,
    RunMode, RunReport, RunStatus, Runner, Scope, StaticIdentities,
};
use regmgmt_test_utils::config::manifest;
use regmgmt_test_utils::registry::{LOCAL_USER_SID, machine_path, user_path, with_loaded_users};

fn run(registry: &MemoryRegistry, toml: &str, mode: RunMode) -> RunReport {
    let manifest = manifest(toml);
    let identities = IdentityContext::resolve(&LoadedHiveIdentities::new(registry));
    Runner::new(registry, mode, &identities).run(&manifest)
}

fn messages(report: &RunReport) -> Vec<&str> {
    report.results.iter().map(|r| r.message.as_str()).collect()
}

const BLOG: &str = r#"
[[user]]
name = "Blog"
base_path = 'Software\Contoso\Blog'

[[user.settings]]
name = "BlogURL"
type = "String"
value = "https://x"
"#;

const AWESOME: &str = r#"
[[machine]]
name = "Contoso"
base_path = 'SOFTWARE\Contoso'

[[machine.settings]]
name = "AwesomeLevel"
type = "DWord"
value = 100
"#;

const INSTALLER: &str = r#"
[[machine]]
name = "Installer"
base_path = 'SOFTWARE\Policies\Microsoft\Windows\Installer'

[[machine.settings]]
action = "Delete"
name = "PreventInstallationFromMsi"
"#;

const OLD_VENDOR: &str = r#"
[[machine]]
name = "Cleanup"
base_path = 'SOFTWARE'

[[machine.settings]]
action = "DeleteKey"
name = "OldVendor"
"#;

#[test]
fn set_already_compliant() {
    let registry = with_loaded_users(&[LOCAL_USER_SID]).with_value(
        &user_path(LOCAL_USER_SID, r"Software\Contoso\Blog"),
        "BlogURL",
        RegistryData::String("https://x".into()),
    );

    for mode in [RunMode::Detect, RunMode::Remediate] {
        let report = run(&registry, BLOG, mode);
        assert_eq!(messages(&report), vec!["[COMPLIANT] BlogURL"]);
        assert_eq!(report.exit_code(), 0);
    }
}

#[test]
fn set_remediates_absent_value() {
    let registry = MemoryRegistry::new();

    let report = run(&registry, AWESOME, RunMode::Remediate);

    assert_eq!(
        messages(&report),
        vec!["[REMEDIATED] AwesomeLevel (was: not set, now: 100)"]
    );
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(
        registry
            .read_value(&machine_path(r"SOFTWARE\Contoso"), "AwesomeLevel")
            .unwrap(),
        Some(RegistryData::DWord(100))
    );
}

#[test]
fn delete_detection_reports_without_touching() {
    let installer = machine_path(r"SOFTWARE\Policies\Microsoft\Windows\Installer");
    let registry =
        MemoryRegistry::new().with_value(&installer, "PreventInstallationFromMsi", RegistryData::DWord(1));

    let report = run(&registry, INSTALLER, RunMode::Detect);

    assert_eq!(
        messages(&report),
        vec!["[NON-COMPLIANT] PreventInstallationFromMsi (exists, should be deleted)"]
    );
    assert_eq!(report.status(), RunStatus::NonCompliant);
    assert_eq!(report.exit_code(), 1);
    assert!(
        registry
            .read_value(&installer, "PreventInstallationFromMsi")
            .unwrap()
            .is_some()
    );
}

#[test]
fn delete_key_removes_whole_subtree() {
    let old_vendor = machine_path(r"SOFTWARE\OldVendor");
    let registry = MemoryRegistry::new()
        .with_value(&old_vendor, "InstallDir", RegistryData::String(r"C:\Old".into()))
        .with_value(&old_vendor.join(r"Product\1.0"), "Version", RegistryData::String("1.0".into()))
        .with_key(&machine_path(r"SOFTWARE\Keep"));

    let report = run(&registry, OLD_VENDOR, RunMode::Remediate);

    assert_eq!(messages(&report), vec!["[DELETED KEY] OldVendor"]);
    assert_eq!(report.exit_code(), 0);
    assert!(!registry.key_exists(&old_vendor).unwrap());
    assert!(!registry.key_exists(&old_vendor.join("Product")).unwrap());
    assert!(registry.key_exists(&machine_path(r"SOFTWARE\Keep")).unwrap());
}

#[test]
fn delete_key_already_absent_is_compliant() {
    let registry = MemoryRegistry::new().with_key(&machine_path("SOFTWARE"));
    let before = registry.key_count();

    let report = run(&registry, OLD_VENDOR, RunMode::Remediate);

    assert_eq!(messages(&report), vec!["[COMPLIANT] OldVendor (key not present)"]);
    assert_eq!(report.summary().remediated, 0);
    assert_eq!(registry.key_count(), before);
}

#[test]
fn no_identities_skips_user_scope_only() {
    // Only service hives are loaded: nothing resolves as a user.
    let registry = with_loaded_users(&[]);
    let toml = format!("{}{}", BLOG, AWESOME);

    let report = run(&registry, &toml, RunMode::Remediate);

    assert_eq!(report.skipped_scopes, vec![Scope::User]);
    assert_eq!(
        messages(&report),
        vec!["[REMEDIATED] AwesomeLevel (was: not set, now: 100)"]
    );
    assert_eq!(report.status(), RunStatus::Success);
}

#[test]
fn user_scope_never_falls_back_to_service_hives() {
    let registry = with_loaded_users(&[]);

    let report = run(&registry, BLOG, RunMode::Remediate);

    assert!(report.results.is_empty());
    assert_eq!(report.exit_code(), 0);
    assert!(
        !registry
            .key_exists(&user_path(".DEFAULT", r"Software\Contoso"))
            .unwrap()
    );
    assert!(
        !registry
            .key_exists(&user_path("S-1-5-18", r"Software\Contoso"))
            .unwrap()
    );
}

#[test]
fn failure_in_middle_setting_is_isolated() {
    let contoso = machine_path(r"SOFTWARE\Contoso");
    let registry = MemoryRegistry::new().with_key(&contoso);
    registry.deny_writes(&contoso.join("Locked"));

    let toml = r#"
[[machine]]
name = "First"
base_path = 'SOFTWARE\Contoso'

[[machine.settings]]
name = "A"
type = "String"
value = "one"

[[machine]]
name = "Locked"
base_path = 'SOFTWARE\Contoso\Locked'

[[machine.settings]]
name = "B"
type = "String"
value = "two"

[[machine]]
name = "Last"
base_path = 'SOFTWARE\Contoso'

[[machine.settings]]
name = "C"
type = "String"
value = "three"
"#;

    let report = run(&registry, toml, RunMode::Remediate);
    let summary = report.summary();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.remediated, 2);
    assert_eq!(summary.failed, 1);
    assert!(report.results[1].message.starts_with("[ERROR] B: "));
    assert_eq!(report.status(), RunStatus::Failed);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        registry.read_value(&contoso, "C").unwrap(),
        Some(RegistryData::String("three".into()))
    );
}

#[test]
fn overridden_write_fails_verification() {
    let contoso = machine_path(r"SOFTWARE\Contoso");
    let registry = MemoryRegistry::new();
    registry.pin_value(&contoso, "AwesomeLevel", RegistryData::DWord(5));

    let report = run(&registry, AWESOME, RunMode::Remediate);

    let result = &report.results[0];
    assert!(result.is_failed());
    assert!(result.message.starts_with("[ERROR] AwesomeLevel: Verification failed"));
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn explicit_identities_apply_per_user() {
    let registry = MemoryRegistry::new();
    let sids = vec![
        LOCAL_USER_SID.to_string(),
        "S-1-12-1-1111111111-2222222222-3333333333-4444444444".to_string(),
    ];
    let identities = IdentityContext::resolve(&StaticIdentities::new(sids.clone()));

    let report = Runner::new(&registry, RunMode::Remediate, &identities).run(&manifest(BLOG));

    assert_eq!(report.summary().remediated, 2);
    for sid in &sids {
        assert_eq!(
            registry
                .read_value(&user_path(sid, r"Software\Contoso\Blog"), "BlogURL")
                .unwrap(),
            Some(RegistryData::String("https://x".into()))
        );
    }
}
