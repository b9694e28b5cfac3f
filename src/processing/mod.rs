// 重複検出の実行層
//
// 画像の探索、並列ハッシュ計算、グループ化、進捗報告をまとめる。

pub mod batch;
pub mod config;
pub mod engine;
pub mod reporting;

pub use batch::{BatchHasher, BatchOutcome};
pub use config::DetectionConfig;
pub use engine::{DetectionEngine, DetectionReport, FailedImage};
pub use reporting::{ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter};
