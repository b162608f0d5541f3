use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use workband_history::{HistoryLog, WorkloadHistoryRecord, HISTORY_SCHEMA_VERSION};
use workband_history::WorkloadHistoryState;
use workband_store::InstalledWorkloadStore;

use crate::dispatch::{
    command_env, format_history_lines, format_pack_lines, run_history, run_install, run_list,
    run_resolve, run_uninstall, CommandEnv,
};
use crate::render::{render_status_line, OutputStyle};

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn test_dotnet_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let counter = TEST_ROOT_COUNTER.fetch_add(1, Ordering::SeqCst);
    path.push(format!(
        "workband-cli-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    path
}

fn test_env(dotnet_root: &PathBuf) -> CommandEnv {
    command_env(Some(dotnet_root.clone()), Some("8.0.103".to_string()))
        .expect("command env must build")
}

fn seed_manifest(env: &CommandEnv, id: &str, content: &str) {
    let dir = env.layout.manifest_dir(env.scope.feature_band, id);
    fs::create_dir_all(&dir).expect("must create manifest dir");
    fs::write(env.layout.manifest_path(env.scope.feature_band, id), content)
        .expect("must write manifest");
    fs::write(
        env.layout
            .manifest_installed_marker_path(env.scope.feature_band, id),
        "",
    )
    .expect("must write installed marker");
}

fn seed_android_manifest(env: &CommandEnv) {
    seed_manifest(
        env,
        "sdk.android",
        r#"
id = "sdk.android"
version = "34.0.1"
feature_band = "8.0.100"

[workloads.android]
packs = ["android.sdk"]

[packs."android.sdk"]
version = "34.0.1"
kind = "sdk"
[packs."android.sdk".paths]
"linux-x64" = "packs/android.sdk/linux-x64"
"#,
    );
}

fn command_line(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

#[test]
fn command_env_derives_feature_band_from_sdk_version() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    assert_eq!(env.scope.feature_band.to_string(), "8.0.100");
    assert_eq!(env.scope.dotnet_root, root);
}

#[test]
fn command_env_rejects_invalid_sdk_version() {
    let root = test_dotnet_root();
    let err = command_env(Some(root), Some("not-a-version".to_string()))
        .expect_err("must reject invalid SDK version");
    assert!(err.to_string().contains("not-a-version"));
}

#[test]
fn resolve_prints_pack_closure_with_rid_paths() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    let lines = run_resolve(&env, &["android".to_string()], Some("linux-x64"))
        .expect("must resolve");
    assert_eq!(
        lines,
        vec!["android.sdk 34.0.1 sdk (manifest sdk.android) [linux-x64: packs/android.sdk/linux-x64]"]
    );

    let lines = run_resolve(&env, &["android".to_string()], Some("osx-arm64"))
        .expect("must resolve");
    assert_eq!(
        lines,
        vec!["android.sdk 34.0.1 sdk (manifest sdk.android) [osx-arm64: no path]"]
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn install_records_workloads_and_history() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    let lines = run_install(
        &env,
        &["android".to_string()],
        command_line(&["workband", "install", "android"]),
    )
    .expect("install must succeed");
    assert!(lines[0].contains("recorded 1 installed workload(s)"));
    assert!(lines.iter().any(|line| line.contains("android.sdk 34.0.1 sdk")));

    let installed = InstalledWorkloadStore::new(env.layout.clone())
        .read(env.scope.feature_band)
        .expect("must read installed record");
    assert_eq!(installed, vec!["android"]);

    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let (records, unknown) = log.read().expect("must read history");
    assert_eq!(records.len(), 1);
    assert!(!unknown);
    assert!(records[0].succeeded);
    assert_eq!(
        records[0].command_line,
        vec!["workband", "install", "android"]
    );
    assert!(records[0].state_before.installed_workloads.is_empty());
    assert_eq!(records[0].state_after.installed_workloads, vec!["android"]);
    assert_eq!(
        records[0].state_after.manifest_versions.get("sdk.android"),
        Some(&"34.0.1".to_string())
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn failed_install_records_failure_and_mutates_nothing() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    let err = run_install(
        &env,
        &["maui".to_string()],
        command_line(&["workband", "install", "maui"]),
    )
    .expect_err("unknown workload must fail");
    assert!(err.to_string().contains("maui"));

    let installed = InstalledWorkloadStore::new(env.layout.clone())
        .read(env.scope.feature_band)
        .expect("must read installed record");
    assert!(installed.is_empty());

    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let (records, _) = log.read().expect("must read history");
    assert_eq!(records.len(), 1);
    assert!(!records[0].succeeded);
    assert!(records[0]
        .error_message
        .as_deref()
        .expect("failure must carry an error message")
        .contains("maui"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn uninstall_removes_workload_and_appends_history() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    run_install(
        &env,
        &["android".to_string()],
        command_line(&["workband", "install", "android"]),
    )
    .expect("install must succeed");
    let lines = run_uninstall(
        &env,
        &["android".to_string()],
        command_line(&["workband", "uninstall", "android"]),
    )
    .expect("uninstall must succeed");
    assert!(lines[0].contains("removed 1 workload(s)"));

    let installed = InstalledWorkloadStore::new(env.layout.clone())
        .read(env.scope.feature_band)
        .expect("must read installed record");
    assert!(installed.is_empty());

    let log = HistoryLog::new(env.layout.history_log_path(env.scope.feature_band));
    let (records, _) = log.read().expect("must read history");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.succeeded));
    assert!(records[0].time_started_unix_ms <= records[1].time_started_unix_ms);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn list_reports_installed_workloads() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    let lines = run_list(&env).expect("list must succeed");
    assert_eq!(lines, vec!["No workloads installed for feature band 8.0.100"]);

    run_install(
        &env,
        &["android".to_string()],
        command_line(&["workband", "install", "android"]),
    )
    .expect("install must succeed");
    let lines = run_list(&env).expect("list must succeed");
    assert_eq!(lines, vec!["android"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn history_flags_unknown_records() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    seed_android_manifest(&env);

    run_install(
        &env,
        &["android".to_string()],
        command_line(&["workband", "install", "android"]),
    )
    .expect("install must succeed");

    let log_path = env.layout.history_log_path(env.scope.feature_band);
    let mut raw = fs::read_to_string(&log_path).expect("must read history log");
    raw.push_str("{\"version\":7,\"shape\":\"unknown\"}\n");
    fs::write(&log_path, raw).expect("must write tampered history log");

    let (lines, unknown_records) = run_history(&env).expect("history must read");
    assert!(unknown_records);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ok"));
    assert!(lines[0].contains("workband install android"));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn history_is_empty_for_fresh_band() {
    let root = test_dotnet_root();
    let env = test_env(&root);
    let (lines, unknown_records) = run_history(&env).expect("history must read");
    assert!(!unknown_records);
    assert_eq!(lines, vec!["No workload history for feature band 8.0.100"]);
}

#[test]
fn format_history_lines_show_status_and_error() {
    let record = WorkloadHistoryRecord {
        version: HISTORY_SCHEMA_VERSION,
        time_started_unix_ms: 1_000,
        time_completed_unix_ms: 1_050,
        command_line: command_line(&["workband", "install", "maui"]),
        state_before: WorkloadHistoryState::default(),
        state_after: WorkloadHistoryState::default(),
        succeeded: false,
        error_message: Some("unknown workload id 'maui'".to_string()),
    };

    let lines = format_history_lines(&[record]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("failed"));
    assert!(lines[0].contains("workband install maui"));
    assert!(lines[0].contains("unknown workload id 'maui'"));
}

#[test]
fn format_pack_lines_handles_empty_set() {
    let lines = format_pack_lines(&Default::default(), None);
    assert_eq!(lines, vec!["No packs required"]);
}

#[test]
fn render_status_line_plain_has_no_escape_codes() {
    let line = render_status_line(OutputStyle::Plain, "install", "workload state updated");
    assert_eq!(line, "install: workload state updated");

    let rich = render_status_line(OutputStyle::Rich, "install", "workload state updated");
    assert!(rich.contains("workload state updated"));
}
