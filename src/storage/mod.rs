use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::Path;

pub mod local;

/// ストレージ内のアイテムを表す構造体
#[derive(Debug, Clone, PartialEq)]
pub struct StorageItem {
    /// アイテムの識別子（ローカルならパス）
    pub id: String,
    /// アイテム名（ファイル名）
    pub name: String,
    /// アイテムのサイズ（バイト）
    pub size: u64,
    pub is_directory: bool,
    pub extension: Option<String>,
}

/// ストレージバックエンドのトレイト
#[automock]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// ストレージ内のアイテムをリストする（`recursive` ならサブディレクトリも）
    async fn list_items(&self, prefix: &str, recursive: bool) -> Result<Vec<StorageItem>>;

    /// アイテムのデータを読み込む
    async fn read_item(&self, id: &str) -> Result<Vec<u8>>;

    /// アイテムを削除する
    async fn delete_item(&self, id: &str) -> Result<()>;

    /// アイテムを指定ディレクトリへ移動し、移動先のIDを返す
    ///
    /// 移動先に同名のファイルがあっても上書きしない。
    async fn move_item(&self, id: &str, dest_dir: &Path) -> Result<String>;

    /// 画像ファイルかどうかを判定
    fn is_image_file(&self, item: &StorageItem) -> bool {
        has_image_extension(item)
    }
}

/// 対応する画像拡張子を持つファイルか
pub fn has_image_extension(item: &StorageItem) -> bool {
    if item.is_directory {
        return false;
    }

    match &item.extension {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tiff" | "webp"
        ),
        None => false,
    }
}
