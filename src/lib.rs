//! 知覚ハッシュによる類似画像の重複検出
//!
//! 画像ごとに平均輝度ハッシュを計算し、ハミング距離から求めた類似度で
//! 貪欲にグループ化する。グループのメンバーは `SelectionModel` で
//! 削除対象として選択できる。

pub mod cli;
pub mod core;
pub mod grouping;
pub mod image_loader;
pub mod perceptual_hash;
pub mod processing;
pub mod selection;
pub mod similarity;
pub mod storage;

pub use crate::core::{DedupError, DedupResult, ErrorSeverity, ImageId, ImageRecord};
pub use grouping::{
    group_duplicates, group_with_threshold, unique_ids, DuplicateGroup, GroupMember, Threshold,
    DEFAULT_THRESHOLD,
};
pub use perceptual_hash::{average_hash::AverageHasher, Fingerprint, PerceptualHashBackend};
pub use processing::{DetectionConfig, DetectionEngine, DetectionReport};
pub use selection::SelectionModel;
pub use similarity::{hamming_distance, similarity};
