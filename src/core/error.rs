// 重複検出パイプラインのエラー型定義

use thiserror::Error;

/// 重複検出のエラー型
#[derive(Error, Debug)]
pub enum DedupError {
    /// 画像の読み込み・デコードに失敗（画像単位で回復可能）
    #[error("画像デコードエラー: {image_id} - {source}")]
    DecodeError {
        image_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// ハッシュ長の不一致（ハッシャー設定の不整合）
    #[error("ハッシュ長の不一致: {left_bits}ビット と {right_bits}ビット は比較できません")]
    IncompatibleHashError { left_bits: usize, right_bits: usize },

    /// 類似度閾値が0〜100の範囲外
    #[error("閾値エラー: {threshold} は0〜100の範囲外です")]
    InvalidThresholdError { threshold: f64 },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("ファイル発見エラー: {path} - {source}")]
    FileDiscoveryError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// ハッシュ計算タスクのパニック・キャンセル（画像単位で回復可能）
    #[error("タスクエラー: {image_id} - {source}")]
    TaskError {
        image_id: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl DedupError {
    /// デコードエラーの作成
    pub fn decode(image_id: impl Into<String>, source: anyhow::Error) -> Self {
        Self::DecodeError {
            image_id: image_id.into(),
            source,
        }
    }

    /// ハッシュ長不一致エラーの作成
    pub fn incompatible_hash(left_bits: usize, right_bits: usize) -> Self {
        Self::IncompatibleHashError {
            left_bits,
            right_bits,
        }
    }

    /// 閾値エラーの作成
    pub fn invalid_threshold(threshold: f64) -> Self {
        Self::InvalidThresholdError { threshold }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// ファイル発見エラーの作成
    pub fn file_discovery(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::FileDiscoveryError {
            path: path.into(),
            source,
        }
    }

    /// タスクエラーの作成
    pub fn task(image_id: impl Into<String>, source: tokio::task::JoinError) -> Self {
        Self::TaskError {
            image_id: image_id.into(),
            source,
        }
    }

    /// 失敗した画像のIDを取得
    pub fn image_id(&self) -> Option<&str> {
        match self {
            Self::DecodeError { image_id, .. } | Self::TaskError { image_id, .. } => Some(image_id),
            _ => None,
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::DecodeError { .. } => ErrorSeverity::Medium,
            Self::FileDiscoveryError { .. } | Self::TaskError { .. } => ErrorSeverity::Medium,
            Self::InvalidThresholdError { .. } | Self::ConfigurationError { .. } => {
                ErrorSeverity::High
            }
            Self::IncompatibleHashError { .. } => ErrorSeverity::Critical,
        }
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// デコードエラーはその画像だけをスキップしてバッチを続行できる。
    /// 入力・設定のエラーは処理自体を中断する。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::DecodeError { .. } | Self::TaskError { .. } => true,
            Self::FileDiscoveryError { .. } => true,
            Self::InvalidThresholdError { .. }
            | Self::ConfigurationError { .. }
            | Self::IncompatibleHashError { .. } => false,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// 重複検出の結果型
pub type DedupResult<T> = std::result::Result<T, DedupError>;
