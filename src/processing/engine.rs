// DetectionEngine - 探索・ハッシュ・グループ化をまとめる重複検出エンジン

use super::batch::{BatchHasher, BatchOutcome};
use super::config::DetectionConfig;
use super::reporting::ProgressReporter;
use crate::core::{DedupError, DedupResult, ImageId, ImageRecord};
use crate::grouping::{group_with_threshold, unique_ids, DuplicateGroup, Threshold};
use crate::image_loader::standard::StandardImageLoader;
use crate::image_loader::ImageLoaderBackend;
use crate::perceptual_hash::average_hash::AverageHasher;
use crate::perceptual_hash::PerceptualHashBackend;
use crate::storage::local::LocalStorageBackend;
use crate::storage::{StorageBackend, StorageItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// ハッシュに失敗した画像
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedImage {
    pub id: ImageId,
    pub error: String,
}

/// 1回の検出実行の結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub generated_at: DateTime<Utc>,
    /// 探索したディレクトリ（レコードを直接渡した場合は空）
    pub source: String,
    pub algorithm: String,
    pub hash_size_bits: usize,
    pub threshold: Threshold,
    /// ハッシュ対象として発見された画像数（失敗を含む）
    pub total_images: usize,
    /// ハッシュ済みレコード（入力順）
    pub images: Vec<ImageRecord>,
    pub groups: Vec<DuplicateGroup>,
    pub unique: Vec<ImageId>,
    pub failures: Vec<FailedImage>,
}

impl DetectionReport {
    /// 代表以外のメンバー数の合計
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|group| group.len().saturating_sub(1)).sum()
    }

    pub fn to_json(&self) -> DedupResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DedupError::configuration(format!("JSONシリアライズエラー: {e}")))
    }

    pub fn from_json(json: &str) -> DedupResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DedupError::configuration(format!("レポートの解析エラー: {e}")))
    }

    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_json(&json)?)
    }
}

/// 重複検出エンジン
///
/// 依存関係はコンストラクタで注入し、並列処理で共有するものはArcで保持する。
pub struct DetectionEngine<L, H, S, R> {
    loader: Arc<L>,
    hasher: Arc<H>,
    storage: Arc<S>,
    reporter: Arc<R>,
    config: DetectionConfig,
}

impl<R> DetectionEngine<StandardImageLoader, AverageHasher, LocalStorageBackend, R>
where
    R: ProgressReporter + 'static,
{
    /// 設定からローカルファイルシステム用のエンジンを組み立てる
    pub fn local(config: DetectionConfig, reporter: R) -> DedupResult<Self> {
        config.validate()?;

        let loader = match config.max_dimension {
            Some(max_dimension) => StandardImageLoader::with_max_dimension(max_dimension),
            None => StandardImageLoader::new(),
        };
        let hasher = config.hasher.create_hasher()?;

        Ok(Self::new(
            loader,
            hasher,
            LocalStorageBackend::new(),
            reporter,
            config,
        ))
    }
}

impl<L, H, S, R> DetectionEngine<L, H, S, R>
where
    L: ImageLoaderBackend + 'static,
    H: PerceptualHashBackend + 'static,
    S: StorageBackend + 'static,
    R: ProgressReporter + 'static,
{
    pub fn new(loader: L, hasher: H, storage: S, reporter: R, config: DetectionConfig) -> Self {
        Self {
            loader: Arc::new(loader),
            hasher: Arc::new(hasher),
            storage: Arc::new(storage),
            reporter: Arc::new(reporter),
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// ディレクトリ内の画像を探索・ハッシュ・グループ化する
    ///
    /// 閾値と設定は探索を始める前に検証する。
    pub async fn detect_in_directory(&self, directory: &str) -> DedupResult<DetectionReport> {
        let threshold = self.config.threshold()?;
        self.config.validate()?;

        let items = self.discover_images(directory).await?;
        info!(directory, images = items.len(), "discovered images");

        let mut report = self.detect_items(&items, threshold).await?;
        report.source = directory.to_string();
        Ok(report)
    }

    /// 与えられたアイテムをハッシュ・グループ化する
    pub async fn detect_items(
        &self,
        items: &[StorageItem],
        threshold: Threshold,
    ) -> DedupResult<DetectionReport> {
        self.reporter.report_started(items.len()).await;

        let outcome = self.hash_items(items).await;
        let failures: Vec<FailedImage> = outcome
            .failures()
            .map(|(id, error)| FailedImage {
                id: id.clone(),
                error: error.to_string(),
            })
            .collect();
        let images = outcome.records();

        debug!(
            hashed = images.len(),
            failed = failures.len(),
            threshold = threshold.value(),
            "grouping hashed images"
        );
        let groups = group_with_threshold(&images, threshold)?;
        let unique = unique_ids(&images, &groups).into_iter().cloned().collect();

        self.reporter
            .report_completed(images.len(), failures.len(), groups.len())
            .await;
        info!(groups = groups.len(), failed = failures.len(), "detection finished");

        Ok(DetectionReport {
            generated_at: Utc::now(),
            source: String::new(),
            algorithm: self.hasher.algorithm_name().to_string(),
            hash_size_bits: self.hasher.hash_size_bits(),
            threshold,
            total_images: items.len(),
            images,
            groups,
            unique,
            failures,
        })
    }

    /// 並列にハッシュだけを計算する
    pub async fn hash_items(&self, items: &[StorageItem]) -> BatchOutcome {
        let batch = BatchHasher::new(
            Arc::clone(&self.loader),
            Arc::clone(&self.hasher),
            Arc::clone(&self.storage),
            self.config.max_concurrent,
        );
        batch.hash_items(items, self.reporter.as_ref()).await
    }

    /// ディレクトリから画像ファイルを探索する（パス順）
    pub async fn discover_images(&self, directory: &str) -> DedupResult<Vec<StorageItem>> {
        let items = self
            .storage
            .list_items(directory, self.config.recursive)
            .await
            .map_err(|e| DedupError::file_discovery(directory, e))?;

        let mut images: Vec<StorageItem> = items
            .into_iter()
            .filter(|item| self.storage.is_image_file(item))
            .collect();

        images.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(images)
    }
}
