// コアレイヤー - 基本となる型とエラー定義

pub mod error;
pub mod types;

pub use error::{DedupError, DedupResult, ErrorSeverity};
pub use types::{ImageId, ImageRecord};
