// 進捗報告

use async_trait::async_trait;

/// 進捗報告のトレイト
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// ハッシュ計算の開始
    async fn report_started(&self, total_images: usize);

    /// 進捗更新
    async fn report_progress(&self, completed: usize, total: usize);

    /// 画像単位のエラー
    async fn report_error(&self, image_id: &str, error: &str);

    /// グループ化まで完了
    async fn report_completed(&self, total_hashed: usize, total_errors: usize, groups: usize);
}

#[async_trait]
impl ProgressReporter for Box<dyn ProgressReporter> {
    async fn report_started(&self, total_images: usize) {
        self.as_ref().report_started(total_images).await
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        self.as_ref().report_progress(completed, total).await
    }

    async fn report_error(&self, image_id: &str, error: &str) {
        self.as_ref().report_error(image_id, error).await
    }

    async fn report_completed(&self, total_hashed: usize, total_errors: usize, groups: usize) {
        self.as_ref()
            .report_completed(total_hashed, total_errors, groups)
            .await
    }
}

/// コンソール出力による進捗報告
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_started(&self, total_images: usize) {
        if !self.quiet {
            println!("🚀 {total_images} 枚の画像のハッシュ計算を開始します...");
        }
    }

    async fn report_progress(&self, completed: usize, total: usize) {
        if !self.quiet && total > 0 && (completed % 100 == 0 || completed == total) {
            let percentage = (completed as f64 / total as f64) * 100.0;
            println!("📊 進捗: {completed}/{total} ({percentage:.1}%)");
        }
    }

    async fn report_error(&self, image_id: &str, error: &str) {
        if !self.quiet {
            eprintln!("❌ {image_id}: {error}");
        }
    }

    async fn report_completed(&self, total_hashed: usize, total_errors: usize, groups: usize) {
        if !self.quiet {
            println!(
                "✅ 完了: ハッシュ {total_hashed} 件, エラー {total_errors} 件, 重複グループ {groups} 件"
            );
        }
    }
}

/// 何もしない進捗報告（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_started(&self, _total_images: usize) {}

    async fn report_progress(&self, _completed: usize, _total: usize) {}

    async fn report_error(&self, _image_id: &str, _error: &str) {}

    async fn report_completed(&self, _total_hashed: usize, _total_errors: usize, _groups: usize) {}
}
