// エンドツーエンド統合テスト
#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::*;
use image::DynamicImage;
use phash_dedup::{
    cli::{
        execute_find_dups, execute_process, FindDupsOptions, ProcessAction, ProcessOptions,
        SelectMode,
    },
    group_duplicates,
    processing::{DetectionConfig, DetectionEngine, DetectionReport, NoOpProgressReporter},
    similarity, AverageHasher, ImageId, ImageRecord, PerceptualHashBackend, SelectionModel,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Library {
    left_right_small: PathBuf,
    left_right_large: PathBuf,
    top_bottom: PathBuf,
    gradient: PathBuf,
    broken: PathBuf,
    nested_copy: PathBuf,
}

/// 重複・非重複・破損ファイルを含むディレクトリを作成
fn setup_library(base_dir: &Path) -> Library {
    let nested = base_dir.join("subdir");
    fs::create_dir_all(&nested).unwrap();
    fs::write(base_dir.join("notes.txt"), "not an image").unwrap();

    Library {
        left_right_small: write_png(base_dir, "a.png", &left_right_split(64)),
        left_right_large: write_png(base_dir, "b.png", &left_right_split(128)),
        top_bottom: write_png(base_dir, "c.png", &top_bottom_split(64)),
        gradient: write_png(base_dir, "d.png", &diagonal_gradient(64)),
        broken: write_corrupt(base_dir, "broken.png"),
        nested_copy: write_png(&nested, "e.png", &left_right_split(80)),
    }
}

fn engine(config: DetectionConfig) -> DetectionEngine<
    phash_dedup::image_loader::standard::StandardImageLoader,
    AverageHasher,
    phash_dedup::storage::local::LocalStorageBackend,
    NoOpProgressReporter,
> {
    DetectionEngine::local(config, NoOpProgressReporter).unwrap()
}

#[tokio::test]
async fn test_directory_detection_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let library = setup_library(temp_dir.path());

    let report = engine(DetectionConfig::default().with_max_concurrent(2))
        .detect_in_directory(temp_dir.path().to_str().unwrap())
        .await
        .unwrap();

    // notes.txt は対象外
    assert_eq!(report.total_images, 6);
    assert_eq!(report.images.len(), 5);
    assert_eq!(report.hash_size_bits, 256);

    assert_eq!(report.groups.len(), 1);
    let group = &report.groups[0];
    let ids: Vec<_> = group.ids().map(ImageId::as_str).collect();
    assert_eq!(
        ids,
        vec![
            id_of(&library.left_right_small),
            id_of(&library.left_right_large),
            id_of(&library.nested_copy),
        ]
    );
    assert_eq!(group.members[0].similarity, 100.0);
    assert!(group.group_similarity >= 90.0);

    assert_eq!(
        report.unique,
        vec![
            ImageId::new(id_of(&library.top_bottom)),
            ImageId::new(id_of(&library.gradient)),
        ]
    );

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id.as_str(), id_of(&library.broken));
}

#[tokio::test]
async fn test_non_recursive_scan_skips_subdirectories() {
    let temp_dir = TempDir::new().unwrap();
    let library = setup_library(temp_dir.path());

    let report = engine(DetectionConfig::default().with_recursive(false))
        .detect_in_directory(temp_dir.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(report.total_images, 5);
    assert!(report
        .images
        .iter()
        .all(|record| record.id.as_str() != id_of(&library.nested_copy)));
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
}

#[tokio::test]
async fn test_zero_threshold_groups_every_hashed_image() {
    let temp_dir = TempDir::new().unwrap();
    setup_library(temp_dir.path());

    let report = engine(DetectionConfig::default().with_threshold(0.0))
        .detect_in_directory(temp_dir.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), report.images.len());
    assert!(report.unique.is_empty());
}

#[tokio::test]
async fn test_hash_group_select_in_memory() {
    let hasher = AverageHasher::new(16);
    let images = [
        ("a", left_right_split(64)),
        ("b", left_right_split(128)),
        ("c", top_bottom_split(64)),
    ];

    let mut records = Vec::new();
    for (id, image) in images {
        let hash = hasher
            .generate_hash(&DynamicImage::ImageRgb8(image))
            .await
            .unwrap();
        records.push(ImageRecord::new(id, hash.fingerprint, 0));
    }

    let split_similarity = similarity(&records[0].fingerprint, &records[2].fingerprint).unwrap();
    assert!(split_similarity < 90.0, "got {split_similarity}");

    let groups = group_duplicates(&records, 90.0).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].representative().unwrap().id.as_str(), "a");

    let mut selection = SelectionModel::new();
    selection.select_group_except_first(&groups[0]);
    let remaining: Vec<_> = selection
        .remaining(&records)
        .into_iter()
        .map(|record| record.id.as_str())
        .collect();
    assert_eq!(remaining, vec!["a", "c"]);
}

#[tokio::test]
async fn test_find_dups_then_process() {
    let temp_dir = TempDir::new().unwrap();
    let photos = temp_dir.path().join("photos");
    fs::create_dir(&photos).unwrap();
    let library = setup_library(&photos);
    let output = temp_dir.path().join("duplicates.json");

    let report = execute_find_dups(FindDupsOptions {
        target_directory: photos.clone(),
        output: output.clone(),
        threads: Some(2),
        quiet: true,
        ..Default::default()
    })
    .await
    .unwrap();
    assert_eq!(report.groups.len(), 1);

    let saved = DetectionReport::load(&output).await.unwrap();
    assert_eq!(saved.groups, report.groups);

    let dest = temp_dir.path().join("moved");
    let process = |dry_run: bool| ProcessOptions {
        duplicate_list: output.clone(),
        action: ProcessAction::Move,
        dest: dest.clone(),
        select: SelectMode::ExceptFirst,
        dry_run,
        no_confirm: true,
    };

    let preview = execute_process(process(true)).await.unwrap();
    assert_eq!(preview.selected, 2);
    assert!(library.left_right_large.exists());

    let summary = execute_process(process(false)).await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    assert!(library.left_right_small.exists());
    assert!(!library.left_right_large.exists());
    assert!(!library.nested_copy.exists());
    assert!(dest.join("group_1").join("b.png").exists());
    assert!(dest.join("group_1").join("e.png").exists());
    assert!(library.top_bottom.exists());
}
