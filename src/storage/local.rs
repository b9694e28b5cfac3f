use super::{StorageBackend, StorageItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// 同名ファイルがあるときに試す連番の上限
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// ローカルファイルシステム用のストレージバックエンド
#[derive(Clone, Debug, Default)]
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }

    fn path_to_storage_item(path: &Path) -> Result<StorageItem> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let extension = if metadata.is_file() {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_string())
        } else {
            None
        };

        Ok(StorageItem {
            id: path.to_string_lossy().to_string(),
            name,
            size: metadata.len(),
            is_directory: metadata.is_dir(),
            extension,
        })
    }

    /// 移動先で使われていないパスを探す（`name.png` → `name (2).png` → ...）
    async fn available_path(dest_dir: &Path, file_name: &Path) -> Result<PathBuf> {
        let candidate = dest_dir.join(file_name);
        if !Self::path_taken(&candidate).await? {
            return Ok(candidate);
        }

        let stem = file_name
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = file_name.extension().map(|e| e.to_string_lossy().to_string());

        for n in 2..=MAX_NAME_ATTEMPTS {
            let name = match &extension {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            };
            let candidate = dest_dir.join(name);
            if !Self::path_taken(&candidate).await? {
                return Ok(candidate);
            }
        }

        anyhow::bail!(
            "No free file name for {} in {}",
            file_name.display(),
            dest_dir.display()
        )
    }

    async fn path_taken(path: &Path) -> Result<bool> {
        tokio::fs::try_exists(path)
            .await
            .with_context(|| format!("Failed to check destination: {}", path.display()))
    }

    async fn collect_items(
        &self,
        path: &Path,
        recursive: bool,
        items: &mut Vec<StorageItem>,
    ) -> Result<()> {
        let mut entries = tokio::fs::read_dir(path)
            .await
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            if let Ok(item) = Self::path_to_storage_item(&entry_path) {
                let descend = recursive && item.is_directory;
                items.push(item);

                if descend {
                    Box::pin(self.collect_items(&entry_path, recursive, items)).await?;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    async fn list_items(&self, prefix: &str, recursive: bool) -> Result<Vec<StorageItem>> {
        let mut items = Vec::new();
        self.collect_items(Path::new(prefix), recursive, &mut items)
            .await?;
        Ok(items)
    }

    async fn read_item(&self, id: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(Path::new(id))
            .await
            .with_context(|| format!("Failed to read file: {id}"))?;
        Ok(data)
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        let path = Path::new(id);
        if !path.is_file() {
            anyhow::bail!("Cannot delete non-file item: {id}");
        }
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("Failed to delete file: {id}"))?;
        Ok(())
    }

    async fn move_item(&self, id: &str, dest_dir: &Path) -> Result<String> {
        let source = Path::new(id);
        let file_name = source
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid filename: {id}"))?;

        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

        let dest_path = Self::available_path(dest_dir, Path::new(file_name)).await?;
        tokio::fs::rename(source, &dest_path)
            .await
            .with_context(|| format!("Failed to move {id} to {}", dest_path.display()))?;

        Ok(dest_path.to_string_lossy().to_string())
    }
}
