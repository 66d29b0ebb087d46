//! Tests for the Runner: scope resolution, aggregation and exit codes

use pretty_assertions::assert_eq;
use regmgmt_core::{
    IdentityContext, LoadedHiveIdentities, MemoryRegistry, RegistryBackend, RegistryData,
    RemediationOutcome, RunMode, RunStatus, Runner, Scope, StaticIdentities,
};
use regmgmt_test_utils::config::{SCENARIO_MANIFEST, manifest};
use regmgmt_test_utils::registry::{
    CLOUD_USER_SID, LOCAL_USER_SID, machine_path, user_path, with_loaded_users,
};

#[test]
fn user_groups_apply_to_every_loaded_user() {
    let registry = with_loaded_users(&[LOCAL_USER_SID, CLOUD_USER_SID]);
    let identities = IdentityContext::resolve(&LoadedHiveIdentities::new(&registry));
    let manifest = manifest(SCENARIO_MANIFEST);

    let report = Runner::new(&registry, RunMode::Remediate, &identities).run(&manifest);

    let blog: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.setting_name == "BlogURL")
        .collect();
    assert_eq!(blog.len(), 2);
    for sid in [LOCAL_USER_SID, CLOUD_USER_SID] {
        assert_eq!(
            registry
                .read_value(&user_path(sid, "Software\\Contoso\\Blog"), "BlogURL")
                .unwrap(),
            Some(RegistryData::String("https://x".into()))
        );
    }
    assert_eq!(report.status(), RunStatus::Success);
}

#[test]
fn no_identities_skips_user_scope_only() {
    let registry = with_loaded_users(&[]);
    let identities = IdentityContext::resolve(&LoadedHiveIdentities::new(&registry));
    let manifest = manifest(SCENARIO_MANIFEST);

    let report = Runner::new(&registry, RunMode::Remediate, &identities).run(&manifest);

    assert_eq!(report.skipped_scopes, vec![Scope::User]);
    assert!(report.results.iter().all(|r| r.path.starts_with("HKLM")));
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.status(), RunStatus::Success);
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn failure_is_isolated_to_one_setting() {
    let registry = MemoryRegistry::new();
    registry.deny_writes(&machine_path("SOFTWARE\\Contoso\\Locked"));
    let manifest = manifest(
        r#"
[[machine]]
name = "First"
base_path = 'SOFTWARE\Contoso\Open'

[[machine.settings]]
name = "One"
type = "DWord"
value = 1

[[machine]]
name = "Second"
base_path = 'SOFTWARE\Contoso\Locked'

[[machine.settings]]
name = "Two"
type = "DWord"
value = 2

[[machine]]
name = "Third"
base_path = 'SOFTWARE\Contoso\Open'

[[machine.settings]]
name = "Three"
type = "DWord"
value = 3
"#,
    );
    let identities = IdentityContext::default();

    let report = Runner::new(&registry, RunMode::Remediate, &identities).run(&manifest);

    let outcomes: Vec<_> = report.results.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            RemediationOutcome::Succeeded,
            RemediationOutcome::Failed,
            RemediationOutcome::Succeeded
        ]
    );
    assert_eq!(report.status(), RunStatus::Failed);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn detection_never_modifies_registry() {
    let registry = MemoryRegistry::new()
        .with_key(&machine_path("SOFTWARE\\Contoso\\OldVendor"))
        .with_value(
            &machine_path("SOFTWARE\\Policies\\Microsoft\\Windows\\Installer"),
            "PreventInstallationFromMsi",
            RegistryData::DWord(1),
        );
    let keys_before = registry.key_count();
    let identities = IdentityContext::default();

    let report = Runner::new(&registry, RunMode::Detect, &identities).run(&manifest(SCENARIO_MANIFEST));

    assert_eq!(report.status(), RunStatus::NonCompliant);
    assert_eq!(report.summary().non_compliant, 3);
    assert_eq!(registry.key_count(), keys_before);
    assert!(registry.read_value(&machine_path("SOFTWARE\\Contoso"), "AwesomeLevel").unwrap().is_none());
}

#[test]
fn static_identities_drive_user_roots() {
    let registry = MemoryRegistry::new();
    let identities = IdentityContext::resolve(&StaticIdentities::new(vec![LOCAL_USER_SID.to_string()]));

    let report = Runner::new(&registry, RunMode::Detect, &identities).run(&manifest(SCENARIO_MANIFEST));

    let blog = report
        .results
        .iter()
        .find(|r| r.setting_name == "BlogURL")
        .expect("user setting evaluated");
    assert_eq!(
        blog.path,
        format!("HKU\\{}\\Software\\Contoso\\Blog", LOCAL_USER_SID)
    );
}

#[test]
fn report_serializes_to_json() {
    let registry = MemoryRegistry::new();
    let identities = IdentityContext::default();
    let report = Runner::new(&registry, RunMode::Detect, &identities).run(&manifest(SCENARIO_MANIFEST));

    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["mode"], "Detect");
    assert_eq!(json["skipped_scopes"][0], "User");
    assert_eq!(json["results"][0]["action"], "Set");
    assert_eq!(json["results"][0]["needs_remediation"], true);
}
