use super::{Fingerprint, HashResult, PerceptualHashBackend};
use anyhow::Result;
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::time::Instant;

/// 平均輝度ベースの知覚ハッシュ実装
///
/// 画像を `width` x `height` のグリッドにリサンプルし、各セルの輝度が
/// グリッド全体の平均より大きければ1を立てる。アルファチャンネルは
/// 無視するため、透明ピクセルもRGB値の輝度で寄与する。
#[derive(Clone, Debug)]
pub struct AverageHasher {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl AverageHasher {
    /// 正方グリッドのハッシャーを作成（16なら256ビット）
    pub fn new(size: u32) -> Self {
        Self::with_grid(size, size)
    }

    pub fn with_grid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn grid(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// ITU-R BT.601 の係数による輝度
    fn luminance(pixel: &image::Rgb<u8>) -> f64 {
        0.299 * f64::from(pixel[0]) + 0.587 * f64::from(pixel[1]) + 0.114 * f64::from(pixel[2])
    }

    /// リサンプル済みグリッドからフィンガープリントを計算
    pub(crate) fn compute_fingerprint_from_grid(grid: &RgbImage) -> Result<Fingerprint> {
        let luminance: Vec<f64> = grid.pixels().map(Self::luminance).collect();
        if luminance.is_empty() {
            anyhow::bail!("Cannot hash an empty pixel grid");
        }

        let mean = luminance.iter().sum::<f64>() / luminance.len() as f64;

        // 行優先で、平均より明るいピクセルに1を立てる
        let fingerprint = Fingerprint::from_bits(luminance.iter().map(|&gray| gray > mean))?;
        Ok(fingerprint)
    }
}

#[async_trait]
impl PerceptualHashBackend for AverageHasher {
    async fn generate_hash(&self, image: &DynamicImage) -> Result<HashResult> {
        let start_time = Instant::now();
        let source_dimensions = (image.width(), image.height());

        let fingerprint = tokio::task::spawn_blocking({
            let (width, height, filter) = (self.width, self.height, self.filter);
            let image = image.clone();
            move || {
                let grid = image.resize_exact(width, height, filter).to_rgb8();
                Self::compute_fingerprint_from_grid(&grid)
            }
        })
        .await??;

        let computation_time_ms = start_time.elapsed().as_millis() as u64;

        Ok(HashResult {
            fingerprint,
            computation_time_ms,
            source_dimensions,
        })
    }

    fn hash_size_bits(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn algorithm_name(&self) -> &'static str {
        "Average Hash"
    }
}
