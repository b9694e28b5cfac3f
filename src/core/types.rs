// 重複検出で扱うデータ型定義

use crate::perceptual_hash::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// セッション内で画像を一意に識別するID（CLIではファイルパス）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// ハッシュ済みの画像レコード
///
/// フィンガープリントは生成後に変更されない。`byte_size` と
/// `source_dimensions` はレポート用で、グループ化の判定には使わない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub fingerprint: Fingerprint,
    pub byte_size: u64,
    #[serde(default)]
    pub source_dimensions: (u32, u32),
}

impl ImageRecord {
    pub fn new(id: impl Into<ImageId>, fingerprint: Fingerprint, byte_size: u64) -> Self {
        Self {
            id: id.into(),
            fingerprint,
            byte_size,
            source_dimensions: (0, 0),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.source_dimensions = (width, height);
        self
    }
}
