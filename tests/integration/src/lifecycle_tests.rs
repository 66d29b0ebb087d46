//! Detect, remediate, detect again
//!
//! Drives the full scenario manifest across a drifted machine and checks
//! that a second pass finds nothing left to do.

use pretty_assertions::assert_eq;
use regmgmt_core::{
    IdentityContext, LoadedHiveIdentities, Manifest, MemoryRegistry, RegistryData, RunMode,
    RunReport, RunStatus, Runner, StatusToken,
};
use regmgmt_test_utils::config::{SCENARIO_MANIFEST, manifest};
use regmgmt_test_utils::registry::{
    CLOUD_USER_SID, LOCAL_USER_SID, machine_path, user_path, with_loaded_users,
};

fn drifted_machine() -> MemoryRegistry {
    with_loaded_users(&[LOCAL_USER_SID, CLOUD_USER_SID])
        .with_value(
            &user_path(LOCAL_USER_SID, r"Software\Contoso\Blog"),
            "BlogURL",
            RegistryData::String("https://old".into()),
        )
        .with_value(
            &machine_path(r"SOFTWARE\Contoso"),
            "AwesomeLevel",
            RegistryData::String("100".into()),
        )
        .with_value(
            &machine_path(r"SOFTWARE\Contoso\OldVendor\Cache"),
            "Size",
            RegistryData::QWord(4096),
        )
        .with_value(
            &machine_path(r"SOFTWARE\Policies\Microsoft\Windows\Installer"),
            "PreventInstallationFromMsi",
            RegistryData::DWord(1),
        )
}

fn run(registry: &MemoryRegistry, manifest: &Manifest, mode: RunMode) -> RunReport {
    let identities = IdentityContext::resolve(&LoadedHiveIdentities::new(registry));
    Runner::new(registry, mode, &identities).run(manifest)
}

fn statuses(report: &RunReport) -> Vec<StatusToken> {
    report.results.iter().map(|r| r.status).collect()
}

#[test]
fn detect_then_remediate_then_detect() {
    let registry = drifted_machine();
    let manifest = manifest(SCENARIO_MANIFEST);

    let detected = run(&registry, &manifest, RunMode::Detect);
    assert_eq!(detected.status(), RunStatus::NonCompliant);
    assert_eq!(
        statuses(&detected),
        vec![StatusToken::NonCompliant; 5],
        "two users, a string-typed DWord, a stale key and a stale value"
    );
    assert_eq!(
        detected.results[2].message,
        "[NON-COMPLIANT] AwesomeLevel (current: 100 (String), expected: 100)"
    );

    let remediated = run(&registry, &manifest, RunMode::Remediate);
    assert_eq!(remediated.status(), RunStatus::Success);
    assert_eq!(
        statuses(&remediated),
        vec![
            StatusToken::Remediated,
            StatusToken::Remediated,
            StatusToken::Remediated,
            StatusToken::DeletedKey,
            StatusToken::Deleted,
        ]
    );
    assert_eq!(
        remediated.summary().to_string(),
        "Summary: 5 evaluated, 0 compliant, 5 non-compliant, 5 remediated, 0 failed"
    );

    let again = run(&registry, &manifest, RunMode::Remediate);
    assert_eq!(statuses(&again), vec![StatusToken::Compliant; 5]);
    assert_eq!(again.summary().remediated, 0);

    let verified = run(&registry, &manifest, RunMode::Detect);
    assert_eq!(verified.status(), RunStatus::Compliant);
    assert_eq!(verified.exit_code(), 0);
}

#[test]
fn results_follow_user_then_machine_order() {
    let registry = drifted_machine();
    let report = run(&registry, &manifest(SCENARIO_MANIFEST), RunMode::Detect);

    let order: Vec<(&str, &str)> = report
        .results
        .iter()
        .map(|r| (r.group.as_str(), r.setting_name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Blog", "BlogURL"),
            ("Blog", "BlogURL"),
            ("Contoso", "AwesomeLevel"),
            ("Contoso", "OldVendor"),
            ("Installer", "PreventInstallationFromMsi"),
        ]
    );
    // Loaded hives enumerate in key order.
    assert!(report.results[0].path.contains(CLOUD_USER_SID));
    assert!(report.results[1].path.contains(LOCAL_USER_SID));
}

#[test]
fn report_serializes_for_automation() {
    let registry = drifted_machine();
    let report = run(&registry, &manifest(SCENARIO_MANIFEST), RunMode::Detect);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "Detect");
    assert_eq!(json["results"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["results"][4]["action"], "Delete");
}
