//! End-to-end audit tests against the in-memory gateway.

use bp_auditor::gateway::{PacingConfig, ResilientGateway, RetryConfig};
use bp_auditor::output::FileSink;
use bp_auditor::testing::{Call, CollectingSink, MockGateway};
use bp_auditor::{AuditConfig, AuditMode, Auditor, parse_roots};
use bp_integration_tests::probe_object;
use bp_types::{FolderPath, ListDenial, RootStatus};
use std::time::Duration;
use tempfile::TempDir;

fn folder(raw: &str) -> FolderPath {
    FolderPath::parse(raw).unwrap()
}

/// b1 has a/ and c/ (with c/d/); b2 refuses listing; b3 has one open folder.
fn scenario_gateway() -> MockGateway {
    MockGateway::new()
        .with_listing("gs://b1/", ["gs://b1/a/", "gs://b1/c/", "gs://b1/index.html"])
        .with_listing("gs://b1/c/", ["gs://b1/c/d/", "gs://b1/c/data.csv"])
        .allow_write("gs://b1/c/d/")
        .allow_write("gs://b1/")
        .deny_delete("gs://b1/")
        .deny_listing("gs://b2/")
        .with_listing("gs://b3/", ["gs://b3/uploads/"])
        .allow_write("gs://b3/uploads/")
}

#[tokio::test]
async fn test_scenario_audit_writes_result_files() {
    let dir = TempDir::new().unwrap();
    let sink = FileSink::new(dir.path().join("out"));
    let write_path = sink.write_path().to_path_buf();
    let delete_path = sink.delete_path().to_path_buf();

    let roots = parse_roots("gs://b1/\ngs://b2/\n# skipped\ngs://b3/\n").unwrap();
    let auditor = Auditor::new(
        scenario_gateway(),
        sink,
        probe_object(),
        AuditConfig::new(),
    );

    let stats = auditor.run(&roots).await.unwrap();

    assert_eq!(stats.roots_audited, 2);
    assert_eq!(stats.roots_not_listable, 1);
    assert_eq!(stats.folders_probed, 6);
    assert!(!stats.has_errors());

    let written = std::fs::read_to_string(&write_path).unwrap();
    assert_eq!(written, "gs://b1/c/d/\ngs://b1/\ngs://b3/uploads/\n");

    let deleted = std::fs::read_to_string(&delete_path).unwrap();
    assert_eq!(deleted, "gs://b1/c/d/\ngs://b3/uploads/\n");
}

#[tokio::test]
async fn test_scenario_call_sequence() {
    let auditor = Auditor::new(
        scenario_gateway(),
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new().sequential(),
    );

    auditor.run(&[folder("gs://b1/")]).await.unwrap();

    let probe = "bp-probe-testfile";
    assert_eq!(
        auditor.gateway().calls(),
        vec![
            Call::List(folder("gs://b1/")),
            Call::List(folder("gs://b1/a/")),
            Call::List(folder("gs://b1/c/")),
            Call::List(folder("gs://b1/c/d/")),
            Call::Upload(format!("gs://b1/a/{probe}")),
            Call::Upload(format!("gs://b1/c/{probe}")),
            Call::Upload(format!("gs://b1/c/d/{probe}")),
            Call::Delete(format!("gs://b1/c/d/{probe}")),
            Call::Upload(format!("gs://b1/{probe}")),
            Call::Delete(format!("gs://b1/{probe}")),
        ]
    );
}

#[tokio::test]
async fn test_not_listable_root_emits_nothing() {
    let auditor = Auditor::new(
        scenario_gateway(),
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new(),
    );

    auditor.run(&[folder("gs://b2/")]).await.unwrap();

    let reports = auditor.sink().reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].status,
        RootStatus::NotListable {
            reason: ListDenial::AccessDenied
        }
    );
    assert!(reports[0].write_vulnerable.is_empty());
    assert!(auditor.gateway().upload_calls().is_empty());
    assert!(auditor.gateway().delete_calls().is_empty());
}

#[tokio::test]
async fn test_reports_serialize_as_json() {
    let auditor = Auditor::new(
        scenario_gateway(),
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new(),
    );

    auditor
        .run(&[folder("gs://b1/"), folder("gs://b2/")])
        .await
        .unwrap();

    let reports = auditor.sink().reports();
    let audited = serde_json::to_value(&reports[0]).unwrap();
    assert_eq!(audited["status"], "audited");
    assert_eq!(audited["delete_vulnerable"][0], "gs://b1/c/d/");

    let skipped = serde_json::to_value(&reports[1]).unwrap();
    assert_eq!(skipped["status"], "not_listable");
    assert_eq!(skipped["reason"]["kind"], "access_denied");
}

#[tokio::test]
async fn test_direct_mode_probes_input_folders_only() {
    let auditor = Auditor::new(
        scenario_gateway(),
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new().with_mode(AuditMode::Direct),
    );

    let roots = parse_roots("gs://b3/uploads/\ngs://b1/a/\ngs://b3/uploads/\n").unwrap();
    let stats = auditor.run(&roots).await.unwrap();

    assert!(auditor.gateway().list_calls().is_empty());
    assert_eq!(stats.folders_probed, 2);
    assert_eq!(stats.write_vulnerable, 1);
    assert_eq!(stats.delete_vulnerable, 1);
}

#[tokio::test(start_paused = true)]
async fn test_resilient_gateway_recovers_from_transient_failures() {
    let mock = MockGateway::new()
        .with_listing("gs://b3/", ["gs://b3/uploads/"])
        .allow_write("gs://b3/uploads/")
        .fail_list("gs://b3/uploads/", 2)
        .fail_upload("gs://b3/uploads/", 1)
        .allow_repeated_lists();
    let gateway = ResilientGateway::new(mock)
        .with_retry(RetryConfig::new().with_jitter(false))
        .with_pacing(&PacingConfig::disabled())
        .with_timeout(Duration::from_secs(5));

    let auditor = Auditor::new(
        gateway,
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new(),
    );

    let stats = auditor.run(&[folder("gs://b3/")]).await.unwrap();

    assert_eq!(stats.gateway_errors, 0);
    assert_eq!(stats.write_vulnerable, 1);
    assert_eq!(stats.delete_vulnerable, 1);
}

#[tokio::test(start_paused = true)]
async fn test_persistent_timeouts_are_escalated() {
    let mock = MockGateway::new()
        .with_listing("gs://b/", ["gs://b/slow/"])
        .hang_list("gs://b/slow/")
        .allow_repeated_lists();
    let gateway = ResilientGateway::new(mock)
        .with_retry(RetryConfig::new().with_max_retries(2).with_jitter(false))
        .with_pacing(&PacingConfig::disabled())
        .with_timeout(Duration::from_secs(1));

    let auditor = Auditor::new(
        gateway,
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new(),
    );

    let stats = auditor.run(&[folder("gs://b/")]).await.unwrap();

    assert_eq!(stats.gateway_errors, 1);
    assert_eq!(stats.folders_probed, 2);
    assert_eq!(
        auditor.gateway().inner().list_count(&folder("gs://b/slow/")),
        3
    );

    let report = &auditor.sink().reports()[0];
    let slow = report
        .verdicts
        .iter()
        .find(|v| v.path == folder("gs://b/slow/"))
        .unwrap();
    assert_eq!(slow.listable, Some(false));
}
