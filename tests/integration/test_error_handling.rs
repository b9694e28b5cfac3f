// エラーハンドリング統合テスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::*;
use phash_dedup::{
    group_duplicates,
    image_loader::standard::StandardImageLoader,
    processing::{BatchHasher, DetectionConfig, DetectionEngine, NoOpProgressReporter},
    storage::{
        has_image_extension, local::LocalStorageBackend, MockStorageBackend, StorageBackend,
        StorageItem,
    },
    AverageHasher, DedupError, ErrorSeverity, Fingerprint, ImageRecord,
};
use std::sync::Arc;
use tempfile::TempDir;

fn mock_engine(
    storage: MockStorageBackend,
    config: DetectionConfig,
) -> DetectionEngine<StandardImageLoader, AverageHasher, MockStorageBackend, NoOpProgressReporter>
{
    DetectionEngine::new(
        StandardImageLoader::new(),
        AverageHasher::new(16),
        storage,
        NoOpProgressReporter,
        config,
    )
}

#[tokio::test]
async fn test_batch_with_one_corrupt_image() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_png(temp_dir.path(), "1.png", &left_right_split(32)),
        write_png(temp_dir.path(), "2.png", &top_bottom_split(32)),
        write_corrupt(temp_dir.path(), "3.png"),
        write_png(temp_dir.path(), "4.png", &diagonal_gradient(32)),
        write_png(temp_dir.path(), "5.png", &left_right_split(48)),
    ];

    let storage = LocalStorageBackend::new();
    let items = storage
        .list_items(temp_dir.path().to_str().unwrap(), false)
        .await
        .unwrap();
    let mut items: Vec<StorageItem> = items
        .into_iter()
        .filter(|item| storage.is_image_file(item))
        .collect();
    items.sort_by(|a, b| a.id.cmp(&b.id));

    let batch = BatchHasher::new(
        Arc::new(StandardImageLoader::new()),
        Arc::new(AverageHasher::new(16)),
        Arc::new(storage),
        3,
    );
    let outcome = batch.hash_items(&items, &NoOpProgressReporter).await;

    assert_eq!(outcome.len(), 5);
    assert_eq!(outcome.success_count(), 4);

    let ordered: Vec<String> = outcome
        .results()
        .iter()
        .map(|(id, _)| id.as_str().to_string())
        .collect();
    let expected: Vec<String> = paths.iter().map(|p| id_of(p)).collect();
    assert_eq!(ordered, expected);

    let (failed_id, error) = outcome.failures().next().unwrap();
    assert_eq!(failed_id.as_str(), id_of(&paths[2]));
    assert!(matches!(error, DedupError::DecodeError { .. }));
    assert_eq!(error.image_id(), Some(id_of(&paths[2]).as_str()));
    assert!(error.is_recoverable());
    assert_eq!(error.severity(), ErrorSeverity::Medium);

    // 成功分だけでグループ化できる
    let groups = group_duplicates(&outcome.records(), 90.0).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[tokio::test]
async fn test_invalid_threshold_rejected_before_any_io() {
    for threshold in [-0.5, 100.5, f64::NAN] {
        // 期待値のないモックは呼ばれるとパニックする
        let engine = mock_engine(
            MockStorageBackend::new(),
            DetectionConfig::default().with_threshold(threshold),
        );

        let result = engine.detect_in_directory("photos").await;
        assert!(
            matches!(result, Err(DedupError::InvalidThresholdError { .. })),
            "threshold {threshold} should be rejected"
        );
    }
}

#[test]
fn test_mismatched_hash_lengths_fail_grouping() {
    let images = vec![
        ImageRecord::new("short", Fingerprint::from_bit_str("1010").unwrap(), 0),
        ImageRecord::new("long", Fingerprint::from_bit_str("10101010").unwrap(), 0),
    ];

    let error = group_duplicates(&images, 90.0).unwrap_err();
    assert!(matches!(
        error,
        DedupError::IncompatibleHashError {
            left_bits: 4,
            right_bits: 8
        }
    ));
    assert!(!error.is_recoverable());
}

#[tokio::test]
async fn test_missing_directory_is_discovery_error() {
    let engine = DetectionEngine::local(DetectionConfig::default(), NoOpProgressReporter).unwrap();

    let error = engine
        .detect_in_directory("/nonexistent/photo/library")
        .await
        .unwrap_err();

    assert!(matches!(error, DedupError::FileDiscoveryError { .. }));
    assert!(error.to_string().contains("/nonexistent/photo/library"));
}

#[tokio::test]
async fn test_empty_directory_produces_empty_report() {
    let temp_dir = TempDir::new().unwrap();
    let engine = DetectionEngine::local(DetectionConfig::default(), NoOpProgressReporter).unwrap();

    let report = engine
        .detect_in_directory(temp_dir.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(report.total_images, 0);
    assert!(report.groups.is_empty());
    assert!(report.unique.is_empty());
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn test_storage_read_errors_are_per_image() {
    let mut storage = MockStorageBackend::new();
    storage.expect_list_items().returning(|_, _| {
        Ok(["x.png", "y.png"]
            .iter()
            .map(|name| StorageItem {
                id: name.to_string(),
                name: name.to_string(),
                size: 10,
                is_directory: false,
                extension: Some("png".to_string()),
            })
            .collect())
    });
    storage.expect_read_item().returning(|id: &str| {
        if id == "x.png" {
            Err(anyhow::anyhow!("connection reset"))
        } else {
            Ok(png_bytes(&left_right_split(16)))
        }
    });
    storage
        .expect_is_image_file()
        .returning(|item| has_image_extension(item));

    let report = mock_engine(storage, DetectionConfig::default())
        .detect_in_directory("remote")
        .await
        .unwrap();

    assert_eq!(report.images.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id.as_str(), "x.png");
    assert!(report.failures[0].error.contains("connection reset"));
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "threshold": "high" }"#).unwrap();

    let error = DetectionConfig::load(&path).unwrap_err();
    assert!(matches!(error, DedupError::ConfigurationError { .. }));
}
