use crate::cli::{ProcessAction, SelectMode};
use crate::core::ImageId;
use crate::grouping::DuplicateGroup;
use crate::processing::DetectionReport;
use crate::selection::SelectionModel;
use crate::storage::local::LocalStorageBackend;
use crate::storage::StorageBackend;
use anyhow::Result;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::warn;

/// processコマンドのオプション
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub duplicate_list: PathBuf,
    pub action: ProcessAction,
    pub dest: PathBuf,
    pub select: SelectMode,
    pub dry_run: bool,
    pub no_confirm: bool,
}

/// 処理結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// レポートの全グループに選択モードを適用する
pub fn build_selection(groups: &[DuplicateGroup], mode: SelectMode) -> SelectionModel {
    let mut selection = SelectionModel::new();
    for group in groups {
        match mode {
            SelectMode::ExceptFirst => selection.select_group_except_first(group),
            SelectMode::All => selection.select_group_all(group),
        }
    }
    selection
}

/// 確認プロンプト
fn confirm_action<R: BufRead>(
    action: ProcessAction,
    total_files: usize,
    input: &mut R,
) -> Result<bool> {
    use std::io::{self, Write};

    print!(
        "⚠️  {} files will be {}. Continue? [y/N]: ",
        total_files,
        match action {
            ProcessAction::Move => "moved",
            ProcessAction::Delete => "PERMANENTLY DELETED",
        }
    );
    io::stdout().flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// 重複レポートから選択した画像を移動または削除する
pub async fn execute_process(options: ProcessOptions) -> Result<ProcessSummary> {
    let mut input = std::io::BufReader::new(std::io::stdin());
    execute_process_with_input(options, &mut input).await
}

pub async fn execute_process_with_input<R: BufRead>(
    options: ProcessOptions,
    input: &mut R,
) -> Result<ProcessSummary> {
    if !options.duplicate_list.exists() {
        anyhow::bail!(
            "Duplicate list file does not exist: {}",
            options.duplicate_list.display()
        );
    }

    println!("🔧 画像重複検出ツール - processコマンド");
    println!("📄 重複リストファイル: {}", options.duplicate_list.display());

    let report = DetectionReport::load(&options.duplicate_list).await?;

    if report.groups.is_empty() {
        println!("✅ 処理する重複ファイルがありません。");
        return Ok(ProcessSummary::default());
    }

    let selection = build_selection(&report.groups, options.select);

    println!("\n📊 重複情報:");
    println!("   - グループ数: {}", report.groups.len());
    println!("   - 選択されたファイル数: {}", selection.len());

    if options.dry_run {
        println!("\n🗑️  選択されたファイル:");
        for id in selection.selected_ids() {
            println!("   - {id}");
        }
        let remaining = selection.remaining(&report.images);
        println!("\n📁 残るファイル ({}):", remaining.len());
        for record in remaining {
            println!("   - {}", record.id);
        }
        return Ok(ProcessSummary {
            selected: selection.len(),
            ..Default::default()
        });
    }

    println!("🎯 アクション: {:?}", options.action);
    if options.action == ProcessAction::Move {
        println!("📁 移動先ディレクトリ: {}", options.dest.display());
    }

    if !options.no_confirm && !confirm_action(options.action, selection.len(), input)? {
        println!("❌ 処理をキャンセルしました。");
        return Ok(ProcessSummary {
            selected: selection.len(),
            ..Default::default()
        });
    }

    let storage = LocalStorageBackend::new();
    let mut summary = ProcessSummary {
        selected: selection.len(),
        ..Default::default()
    };

    for (index, group) in report.groups.iter().enumerate() {
        let group_dir = options.dest.join(format!("group_{}", index + 1));
        let targets: Vec<&ImageId> = group.ids().filter(|id| selection.is_selected(id)).collect();

        for id in targets {
            let result = match options.action {
                ProcessAction::Move => storage
                    .move_item(id.as_str(), &group_dir)
                    .await
                    .map(|dest| println!("✓ 移動: {id} → {dest}")),
                ProcessAction::Delete => storage
                    .delete_item(id.as_str())
                    .await
                    .map(|_| println!("✓ 削除: {id}")),
            };

            match result {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    warn!(image_id = %id, error = %e, "failed to process file");
                    eprintln!("✗ エラー: {id} - {e:#}");
                    summary.failed += 1;
                }
            }
        }
    }

    println!("\n✅ 処理完了!");
    println!("📊 結果:");
    println!("   - 成功: {} ファイル", summary.succeeded);
    if summary.failed > 0 {
        println!("   - エラー: {} ファイル", summary.failed);
    }

    Ok(summary)
}
