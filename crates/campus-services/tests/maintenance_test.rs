use campus_core::BucketKind;
use campus_services::{AuditReporter, IntegrityVerifier, RetentionManager};
use campus_storage::test_helpers::{initialized_gateway, MockBackend};
use campus_storage::{PathContext, StorageGateway};
use chrono::{Duration, Utc};
use std::sync::Arc;

struct TestStorage {
    backend: Arc<MockBackend>,
    gateway: Arc<StorageGateway>,
}

async fn setup_provisioned_storage() -> TestStorage {
    let backend = Arc::new(MockBackend::new());
    let gateway = initialized_gateway(backend.clone());
    assert!(gateway.ensure_buckets_exist().await);

    TestStorage {
        backend,
        gateway: Arc::new(gateway),
    }
}

#[tokio::test]
async fn test_cleanup_deletes_only_objects_past_retention() {
    let storage = setup_provisioned_storage().await;
    let now = Utc::now();
    storage
        .backend
        .insert_object("uploads", "old/120.csv", 1, Some(now - Duration::days(120)));
    storage
        .backend
        .insert_object("uploads", "old/60.csv", 1, Some(now - Duration::days(60)));
    storage
        .backend
        .insert_object("uploads", "old/10.csv", 1, Some(now - Duration::days(10)));

    let report = RetentionManager::new(storage.gateway.clone())
        .cleanup_old_files("uploads", 90)
        .await
        .unwrap();

    assert_eq!(report.deleted, 1);
    assert!(!report.has_errors());
    assert!(!storage.backend.has_object("uploads", "old/120.csv"));
    assert!(storage.backend.has_object("uploads", "old/60.csv"));
    assert!(storage.backend.has_object("uploads", "old/10.csv"));
}

#[tokio::test]
async fn test_batch_verify_reports_missing_reference() {
    let storage = setup_provisioned_storage().await;
    storage.backend.insert_object("gallery", "2024/03/one.png", 1, None);
    storage.backend.insert_object("gallery", "2024/03/three.png", 1, None);

    let urls = vec![
        "http://minio.internal:9000/gallery/2024/03/one.png".to_string(),
        "http://minio.internal:9000/gallery/2024/03/two.png".to_string(),
        "http://minio.internal:9000/gallery/2024/03/three.png".to_string(),
    ];

    let report = IntegrityVerifier::new(storage.gateway.clone())
        .batch_verify_files(&urls)
        .await;

    assert_eq!(report.total, 3);
    assert_eq!(report.existing, 2);
    assert_eq!(report.missing, 1);
    assert_eq!(report.missing_urls, vec![urls[1].clone()]);
}

#[tokio::test]
async fn test_upload_then_audit_and_verify() {
    let storage = setup_provisioned_storage().await;

    let context = PathContext::new("Term 1 Results.csv").with_file_type("reports");
    let upload = storage
        .gateway
        .upload_categorized(BucketKind::Upload, &context, b"name,score\n".to_vec(), 5)
        .await
        .unwrap();

    assert!(upload.key.contains("/reports/"));
    assert!(upload.key.ends_with("_term_1_results.csv"));
    assert!(upload.url.ends_with(&format!("/uploads/{}", upload.key)));

    let verifier = IntegrityVerifier::new(storage.gateway.clone());
    assert!(verifier.verify_file_exists(&upload.url).await);

    let stats = AuditReporter::new(storage.gateway.clone())
        .get_storage_stats()
        .await;
    assert_eq!(stats["uploads"].file_count, 1);
    assert_eq!(stats["uploads"].total_size, 11);
    assert!(stats["uploads"].newest_file.is_some());
    assert_eq!(stats["gallery"].file_count, 0);

    assert!(storage.gateway.delete_file("uploads", &upload.key).await);
    assert!(!verifier.verify_file_exists(&upload.url).await);
}

#[tokio::test]
async fn test_stats_survive_partial_provisioning() {
    let backend = Arc::new(MockBackend::new());
    backend.fail_make_bucket("resources");
    let gateway = initialized_gateway(backend.clone());
    assert!(gateway.ensure_buckets_exist().await);

    let stats = AuditReporter::new(Arc::new(gateway))
        .get_storage_stats()
        .await;

    assert_eq!(stats.len(), BucketKind::ALL.len());
    assert!(stats["resources"].error.is_some());
    assert!(stats
        .iter()
        .filter(|(name, _)| name.as_str() != "resources")
        .all(|(_, s)| s.error.is_none()));
}

#[tokio::test]
async fn test_upload_url_with_escaped_characters_verifies() {
    let storage = setup_provisioned_storage().await;

    let context = PathContext::new("photo.png").with_user_id("dept%41");
    let upload = storage
        .gateway
        .upload_categorized(BucketKind::Profile, &context, vec![1u8; 8], 5)
        .await
        .unwrap();
    let spaced = storage
        .gateway
        .upload_file("profiles", "staff/head teacher.png", vec![1u8], "image/png")
        .await
        .unwrap();

    let verifier = IntegrityVerifier::new(storage.gateway.clone());
    assert!(verifier.verify_file_exists(&upload.url).await);
    assert!(verifier.verify_file_exists(&spaced.url).await);

    let report = verifier
        .batch_verify_files(&[upload.url.clone(), spaced.url.clone()])
        .await;
    assert_eq!(report.missing, 0);
}
