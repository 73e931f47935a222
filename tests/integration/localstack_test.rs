//! S3 gateway and audit tests using LocalStack.
//!
//! LocalStack accepts every request from the test credentials, so every
//! folder comes out write- and delete-vulnerable. The tests check the S3
//! listing conventions and that the probe object is cleaned up.

use bp_auditor::gateway::{PacingConfig, ResilientGateway};
use bp_auditor::output::FileSink;
use bp_auditor::testing::CollectingSink;
use bp_auditor::{AuditConfig, Auditor};
use bp_integration_tests::{LocalStackTestContext, probe_object};
use bp_traits::{FaultKind, StorageGateway};
use bp_types::FolderPath;
use tempfile::TempDir;

fn folder(raw: &str) -> FolderPath {
    FolderPath::parse(raw).unwrap()
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_list_returns_folders_and_files() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "bp-list-bucket";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_object(bucket, "data/", "").await.unwrap();
    ctx.put_object(bucket, "data/file.csv", "a,b\n").await.unwrap();
    ctx.put_object(bucket, "data/2024/part-0.csv", "a,b\n")
        .await
        .unwrap();

    let gateway = ctx.gateway().await;
    let response = gateway
        .list(&folder("s3://bp-list-bucket/data/"))
        .await
        .unwrap();

    assert!(response.succeeded());
    assert_eq!(
        response.entries,
        vec![
            "s3://bp-list-bucket/data/2024/".to_string(),
            "s3://bp-list-bucket/data/file.csv".to_string(),
        ]
    );
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_missing_bucket_is_a_fault() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let gateway = ctx.gateway().await;
    let response = gateway
        .list(&folder("s3://bp-no-such-bucket-4b1d/"))
        .await
        .unwrap();

    let fault = response.fault.unwrap();
    assert_eq!(fault.kind(), FaultKind::NotFound);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_audit_open_bucket() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "bp-audit-bucket";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_object(bucket, "logs/app.log", "line\n").await.unwrap();
    ctx.put_object(bucket, "logs/2024/jan.log", "line\n")
        .await
        .unwrap();
    ctx.put_object(bucket, "public/index.html", "<html/>")
        .await
        .unwrap();
    let before = ctx.list_keys(bucket, None).await.unwrap();

    let gateway =
        ResilientGateway::new(ctx.gateway().await).with_pacing(&PacingConfig::disabled());
    let auditor = Auditor::new(
        gateway,
        CollectingSink::new(),
        probe_object(),
        AuditConfig::new(),
    );

    let stats = auditor
        .run(&[folder("s3://bp-audit-bucket/")])
        .await
        .unwrap();

    assert_eq!(stats.folders_probed, 4);
    assert_eq!(stats.write_vulnerable, 4);
    assert_eq!(stats.delete_vulnerable, 4);
    assert!(!stats.has_errors());

    let report = &auditor.sink().reports()[0];
    assert_eq!(
        report.write_vulnerable,
        vec![
            folder("s3://bp-audit-bucket/logs/"),
            folder("s3://bp-audit-bucket/public/"),
            folder("s3://bp-audit-bucket/logs/2024/"),
            folder("s3://bp-audit-bucket/"),
        ]
    );

    // Every probe object was deleted again
    let after = ctx.list_keys(bucket, None).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires LocalStack"]
async fn test_audit_writes_result_files() {
    let ctx = LocalStackTestContext::new().await;

    if !ctx.is_available().await {
        eprintln!("LocalStack not available, skipping test");
        return;
    }

    let bucket = "bp-files-bucket";
    ctx.create_bucket(bucket).await.unwrap();
    ctx.put_object(bucket, "x/readme.txt", "hi\n").await.unwrap();

    let dir = TempDir::new().unwrap();
    let sink = FileSink::new(dir.path());
    let write_path = sink.write_path().to_path_buf();

    let gateway =
        ResilientGateway::new(ctx.gateway().await).with_pacing(&PacingConfig::disabled());
    let auditor = Auditor::new(gateway, sink, probe_object(), AuditConfig::new());

    auditor.run(&[folder("s3://bp-files-bucket/")]).await.unwrap();

    let written = std::fs::read_to_string(write_path).unwrap();
    assert_eq!(written, "s3://bp-files-bucket/x/\ns3://bp-files-bucket/\n");
}
