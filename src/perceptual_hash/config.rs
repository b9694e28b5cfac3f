// 平均ハッシュの設定

use super::average_hash::AverageHasher;
use crate::core::{DedupError, DedupResult};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// グリッドの一辺の上限
const MAX_GRID_SIDE: u32 = 64;

/// リサンプルに使うフィルター
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Averageハッシュの設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// グリッドの幅
    pub grid_width: u32,
    /// グリッドの高さ
    pub grid_height: u32,
    pub filter: ResizeFilter,
}

impl HasherConfig {
    /// 設定からハッシャーを作成
    pub fn create_hasher(&self) -> DedupResult<AverageHasher> {
        self.validate()?;
        Ok(AverageHasher::with_grid(self.grid_width, self.grid_height)
            .with_filter(self.filter.into()))
    }

    /// フィンガープリントのビット長
    pub fn hash_size_bits(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    pub fn to_json(&self) -> DedupResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DedupError::configuration(format!("JSON変換エラー: {e}")))
    }

    pub fn from_json(json: &str) -> DedupResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DedupError::configuration(format!("JSON解析エラー: {e}")))
    }

    /// 設定の妥当性をチェック
    pub fn validate(&self) -> DedupResult<()> {
        for (name, side) in [("grid_width", self.grid_width), ("grid_height", self.grid_height)] {
            if side == 0 {
                return Err(DedupError::configuration(format!(
                    "{name} must be greater than 0"
                )));
            }
            if side > MAX_GRID_SIDE {
                return Err(DedupError::configuration(format!(
                    "{name} must be {MAX_GRID_SIDE} or less"
                )));
            }
        }
        Ok(())
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            grid_width: 16,
            grid_height: 16,
            filter: ResizeFilter::Lanczos3,
        }
    }
}
