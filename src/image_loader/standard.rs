use super::{ImageLoaderBackend, LoadResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use std::time::Instant;

/// 標準的な画像ローダー実装
///
/// `max_dimension` を指定すると、ハッシュ計算前に長辺をその値まで縮小する。
#[derive(Clone, Debug, Default)]
pub struct StandardImageLoader {
    max_dimension: Option<u32>,
}

impl StandardImageLoader {
    pub fn new() -> Self {
        Self {
            max_dimension: None,
        }
    }

    /// 最大サイズ制限付きの画像ローダーを作成
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: Some(max_dimension),
        }
    }

    /// 必要に応じて画像をリサイズ
    fn resize_if_needed(&self, image: DynamicImage) -> (DynamicImage, bool) {
        match self.max_dimension {
            Some(max_dim) if image.width() > max_dim || image.height() > max_dim => {
                // アスペクト比を保ってリサイズ
                let resized = image.resize(max_dim, max_dim, image::imageops::FilterType::Triangle);
                (resized, true)
            }
            _ => (image, false),
        }
    }

    fn finish(&self, image: DynamicImage, start_time: Instant) -> LoadResult {
        let original_dimensions = (image.width(), image.height());
        let (image, was_resized) = self.resize_if_needed(image);

        LoadResult {
            image,
            original_dimensions,
            was_resized,
            load_time_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

#[async_trait]
impl ImageLoaderBackend for StandardImageLoader {
    async fn load_from_bytes(&self, data: &[u8]) -> Result<LoadResult> {
        let start_time = Instant::now();

        let image = tokio::task::spawn_blocking({
            let data = data.to_vec();
            move || image::load_from_memory(&data)
        })
        .await
        .context("Failed to spawn blocking task for image loading")?
        .context("Failed to decode image from memory")?;

        Ok(self.finish(image, start_time))
    }
}
