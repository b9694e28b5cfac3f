use crate::perceptual_hash::config::ResizeFilter;
use crate::processing::{
    ConsoleProgressReporter, DetectionConfig, DetectionEngine, DetectionReport,
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// 表示するグループ数の上限
const PREVIEW_GROUPS: usize = 5;

/// find-dupsコマンドのオプション
#[derive(Debug, Clone, Default)]
pub struct FindDupsOptions {
    pub target_directory: PathBuf,
    pub output: PathBuf,
    pub threshold: Option<f64>,
    pub grid: Option<u32>,
    pub filter: Option<ResizeFilter>,
    pub config: Option<PathBuf>,
    pub threads: Option<usize>,
    pub max_dimension: Option<u32>,
    pub no_recursive: bool,
    pub force: bool,
    pub quiet: bool,
}

impl FindDupsOptions {
    /// 設定ファイル（あれば）にコマンドライン引数を上書きした設定
    pub fn detection_config(&self) -> Result<DetectionConfig> {
        let mut config = match &self.config {
            Some(path) => DetectionConfig::load(path)?,
            None => DetectionConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        if let Some(grid) = self.grid {
            config = config.with_grid(grid, grid);
        }
        if let Some(filter) = self.filter {
            config.hasher.filter = filter;
        }
        if let Some(threads) = self.threads {
            config = config.with_max_concurrent(threads);
        }
        if self.max_dimension.is_some() {
            config = config.with_max_dimension(self.max_dimension);
        }
        if self.no_recursive {
            config = config.with_recursive(false);
        }

        // 閾値は探索前に検証する
        config.threshold()?;
        config.validate()?;
        Ok(config)
    }
}

/// ディレクトリを探索して重複グループのレポートを書き出す
pub async fn execute_find_dups(options: FindDupsOptions) -> Result<DetectionReport> {
    let config = options.detection_config()?;

    if !options.target_directory.is_dir() {
        anyhow::bail!(
            "Target directory does not exist: {}",
            options.target_directory.display()
        );
    }

    if options.output.exists() && !options.force {
        anyhow::bail!(
            "Output file already exists: {} (use --force to overwrite)",
            options.output.display()
        );
    }

    let target = options
        .target_directory
        .to_str()
        .with_context(|| {
            format!(
                "Target directory is not valid UTF-8: {}",
                options.target_directory.display()
            )
        })?
        .to_string();

    if !options.quiet {
        println!("🔍 画像重複検出ツール - find-dupsコマンド");
        println!("📂 対象ディレクトリ: {target}");
        println!("📄 出力ファイル: {}", options.output.display());
        println!("🎯 類似度閾値: {}%", config.threshold);
        println!(
            "⚙️  ハッシュ: {}x{} ({}ビット), 並列数: {}",
            config.hasher.grid_width,
            config.hasher.grid_height,
            config.hasher.hash_size_bits(),
            config.max_concurrent
        );
    }

    let reporter = if options.quiet {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };
    let engine = DetectionEngine::local(config, reporter)?;

    let start_time = std::time::Instant::now();
    let report = engine.detect_in_directory(&target).await?;
    info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "find-dups finished");

    report
        .save(&options.output)
        .await
        .with_context(|| format!("Failed to write report: {}", options.output.display()))?;

    if !options.quiet {
        print_summary(&report);
        println!("📄 結果は {} に保存されました", options.output.display());
    }

    Ok(report)
}

fn print_summary(report: &DetectionReport) {
    println!("\n📊 検出結果:");
    println!("   - 対象画像数: {}", report.total_images);
    println!("   - 重複グループ数: {}", report.groups.len());
    println!("   - 重複画像数: {}", report.duplicate_count());
    println!("   - ユニーク画像数: {}", report.unique.len());

    if !report.failures.is_empty() {
        println!("⚠️  {}個の画像を読み込めませんでした", report.failures.len());
    }

    for (index, group) in report.groups.iter().take(PREVIEW_GROUPS).enumerate() {
        println!(
            "\n🔗 グループ {} (最小類似度 {:.1}%):",
            index + 1,
            group.group_similarity
        );
        for (position, member) in group.members.iter().enumerate() {
            let marker = if position == 0 { "★" } else { " " };
            println!(
                "   {marker} {} ({:.1}%)",
                member.record.id, member.similarity
            );
        }
    }

    if report.groups.len() > PREVIEW_GROUPS {
        println!(
            "\n   ... 他 {} グループ",
            report.groups.len() - PREVIEW_GROUPS
        );
    }
}
