// 重複検出の実行設定

use crate::core::{DedupError, DedupResult};
use crate::grouping::{Threshold, DEFAULT_THRESHOLD};
use crate::perceptual_hash::config::HasherConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 重複検出の設定
///
/// 設定ファイル（JSON）では全項目が省略可能。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// 類似度閾値（%）
    pub threshold: f64,
    pub hasher: HasherConfig,
    /// 同時にデコード・ハッシュする画像数
    pub max_concurrent: usize,
    /// サブディレクトリも探索するか
    pub recursive: bool,
    /// デコード後に長辺をこの値まで縮小する
    pub max_dimension: Option<u32>,
}

impl DetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_grid(mut self, width: u32, height: u32) -> Self {
        self.hasher.grid_width = width;
        self.hasher.grid_height = height;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: Option<u32>) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// 検証済みの閾値
    pub fn threshold(&self) -> DedupResult<Threshold> {
        Threshold::new(self.threshold)
    }

    pub fn from_json(json: &str) -> DedupResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DedupError::configuration(format!("JSON解析エラー: {e}")))
    }

    /// 設定ファイルを読み込む
    pub fn load(path: &Path) -> DedupResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DedupError::configuration(format!(
                "設定ファイルを読み込めません: {} ({e})",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// 設定の妥当性をチェック
    pub fn validate(&self) -> DedupResult<()> {
        self.threshold()?;
        self.hasher.validate()?;

        if self.max_concurrent == 0 {
            return Err(DedupError::configuration(
                "並列タスク数は1以上である必要があります",
            ));
        }

        if self.max_dimension == Some(0) {
            return Err(DedupError::configuration(
                "max_dimension は1以上である必要があります",
            ));
        }

        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            hasher: HasherConfig::default(),
            max_concurrent: num_cpus::get().max(1) * 2,
            recursive: true,
            max_dimension: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perceptual_hash::config::ResizeFilter;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();

        assert_eq!(config.threshold, 90.0);
        assert_eq!(config.hasher.hash_size_bits(), 256);
        assert_eq!(config.max_concurrent, num_cpus::get().max(1) * 2);
        assert!(config.recursive);
        assert_eq!(config.max_dimension, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DetectionConfig::new()
            .with_threshold(75.0)
            .with_grid(8, 8)
            .with_max_concurrent(3)
            .with_recursive(false)
            .with_max_dimension(Some(512));

        assert_eq!(config.threshold().unwrap().value(), 75.0);
        assert_eq!(config.hasher.hash_size_bits(), 64);
        assert_eq!(config.max_concurrent, 3);
        assert!(!config.recursive);
        assert_eq!(config.max_dimension, Some(512));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            DetectionConfig::new().with_threshold(150.0).validate(),
            Err(DedupError::InvalidThresholdError { .. })
        ));
        assert!(DetectionConfig::new().with_grid(0, 16).validate().is_err());
        assert!(DetectionConfig::new().with_max_concurrent(0).validate().is_err());
        assert!(DetectionConfig::new()
            .with_max_dimension(Some(0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json() {
        let config = DetectionConfig::from_json(
            r#"{ "threshold": 85.5, "hasher": { "filter": "nearest" } }"#,
        )
        .unwrap();

        assert_eq!(config.threshold, 85.5);
        assert_eq!(config.hasher.filter, ResizeFilter::Nearest);
        assert_eq!(config.hasher.grid_width, 16);
        assert!(config.recursive);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("dedup.json");
        std::fs::write(&path, r#"{ "max_concurrent": 2, "recursive": false }"#).unwrap();

        let config = DetectionConfig::load(&path).unwrap();
        assert_eq!(config.max_concurrent, 2);
        assert!(!config.recursive);

        let missing = DetectionConfig::load(&temp_dir.path().join("missing.json"));
        assert!(matches!(missing, Err(DedupError::ConfigurationError { .. })));
    }
}
