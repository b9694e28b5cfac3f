// バッチハッシュ計算 - セマフォで同時実行数を制限した並列処理

use super::reporting::ProgressReporter;
use crate::core::{DedupError, DedupResult, ImageId, ImageRecord};
use crate::image_loader::ImageLoaderBackend;
use crate::perceptual_hash::PerceptualHashBackend;
use crate::storage::{StorageBackend, StorageItem};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// バッチ処理の結果（入力順）
#[derive(Debug, Default)]
pub struct BatchOutcome {
    results: Vec<(ImageId, DedupResult<ImageRecord>)>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// 入力順の全結果
    pub fn results(&self) -> &[(ImageId, DedupResult<ImageRecord>)] {
        &self.results
    }

    pub fn get(&self, id: &ImageId) -> Option<&DedupResult<ImageRecord>> {
        self.results
            .iter()
            .find(|(result_id, _)| result_id == id)
            .map(|(_, result)| result)
    }

    /// 成功したレコード（入力順）
    pub fn records(&self) -> Vec<ImageRecord> {
        self.results
            .iter()
            .filter_map(|(_, result)| result.as_ref().ok().cloned())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&ImageId, &DedupError)> {
        self.results
            .iter()
            .filter_map(|(id, result)| result.as_ref().err().map(|e| (id, e)))
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn into_results(self) -> Vec<(ImageId, DedupResult<ImageRecord>)> {
        self.results
    }
}

/// 画像群を並列にデコード・ハッシュする
pub struct BatchHasher<L, H, S> {
    loader: Arc<L>,
    hasher: Arc<H>,
    storage: Arc<S>,
    max_concurrent: usize,
}

impl<L, H, S> BatchHasher<L, H, S>
where
    L: ImageLoaderBackend + 'static,
    H: PerceptualHashBackend + 'static,
    S: StorageBackend + 'static,
{
    pub fn new(loader: Arc<L>, hasher: Arc<H>, storage: Arc<S>, max_concurrent: usize) -> Self {
        Self {
            loader,
            hasher,
            storage,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// 全アイテムをハッシュする
    ///
    /// 失敗は画像単位の `DecodeError`（タスクのパニックは `TaskError`）として
    /// 結果に残り、他の画像の処理は続く。
    pub async fn hash_items<R>(&self, items: &[StorageItem], reporter: &R) -> BatchOutcome
    where
        R: ProgressReporter + ?Sized,
    {
        let total = items.len();
        if total == 0 {
            return BatchOutcome::default();
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (result_tx, mut result_rx) = mpsc::channel::<(usize, DedupResult<ImageRecord>)>(total);
        let mut handles = Vec::with_capacity(total);

        for (index, item) in items.iter().cloned().enumerate() {
            let loader = Arc::clone(&self.loader);
            let hasher = Arc::clone(&self.hasher);
            let storage = Arc::clone(&self.storage);
            let semaphore = Arc::clone(&semaphore);
            let result_tx = result_tx.clone();

            handles.push(tokio::spawn(async move {
                let result = async {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| {
                        DedupError::decode(
                            item.id.as_str(),
                            anyhow::anyhow!("Semaphore error: {e}"),
                        )
                    })?;
                    hash_single(loader.as_ref(), hasher.as_ref(), storage.as_ref(), &item).await
                }
                .await;

                // 受信側が閉じていれば結果は捨てる
                let _ = result_tx.send((index, result)).await;
            }));
        }
        drop(result_tx);

        let mut slots: Vec<Option<DedupResult<ImageRecord>>> = (0..total).map(|_| None).collect();
        let mut completed = 0;

        while let Some((index, result)) = result_rx.recv().await {
            completed += 1;
            match &result {
                Ok(record) => debug!(image_id = %record.id, "hashed"),
                Err(e) => {
                    warn!(
                        image_id = %items[index].id,
                        severity = e.severity().as_str(),
                        error = %e,
                        "failed to hash image"
                    );
                    reporter.report_error(&items[index].id, &e.to_string()).await;
                }
            }
            slots[index] = Some(result);
            reporter.report_progress(completed, total).await;
        }

        // パニック・キャンセルされたタスクは結果を送っていない
        for (index, handle) in handles.into_iter().enumerate() {
            if let Err(join_error) = handle.await {
                if slots[index].is_none() {
                    let id = items[index].id.as_str();
                    let error = DedupError::task(id, join_error);
                    warn!(
                        image_id = id,
                        severity = error.severity().as_str(),
                        error = %error,
                        "hash task aborted"
                    );
                    reporter.report_error(id, &error.to_string()).await;
                    slots[index] = Some(Err(error));
                }
            }
        }

        let results = items
            .iter()
            .zip(slots)
            .map(|(item, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(DedupError::decode(
                        item.id.as_str(),
                        anyhow::anyhow!("No result produced"),
                    ))
                });
                (ImageId::new(item.id.as_str()), result)
            })
            .collect();

        BatchOutcome { results }
    }
}

/// 1枚の画像を読み込んでハッシュする
async fn hash_single<L, H, S>(
    loader: &L,
    hasher: &H,
    storage: &S,
    item: &StorageItem,
) -> DedupResult<ImageRecord>
where
    L: ImageLoaderBackend + ?Sized,
    H: PerceptualHashBackend + ?Sized,
    S: StorageBackend + ?Sized,
{
    let id = item.id.as_str();

    let data = storage
        .read_item(id)
        .await
        .map_err(|e| DedupError::decode(id, e))?;

    let loaded = loader
        .load_from_bytes(&data)
        .await
        .map_err(|e| DedupError::decode(id, e))?;
    debug!(
        image_id = id,
        resized = loaded.was_resized,
        load_time_ms = loaded.load_time_ms,
        "decoded"
    );

    let hash = hasher
        .generate_hash(&loaded.image)
        .await
        .map_err(|e| DedupError::decode(id, e))?;

    let (width, height) = loaded.original_dimensions;
    Ok(ImageRecord::new(id, hash.fingerprint, data.len() as u64).with_dimensions(width, height))
}
