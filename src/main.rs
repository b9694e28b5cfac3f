use anyhow::Result;
use clap::Parser;
use phash_dedup::cli::{
    execute_find_dups, execute_process, Cli, Commands, FindDupsOptions, ProcessOptions,
};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 通常は警告のみ、-v でデバッグログ
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::FindDups {
            target_directory,
            output,
            threshold,
            grid,
            filter,
            config,
            threads,
            max_dimension,
            no_recursive,
            force,
            quiet,
        } => {
            execute_find_dups(FindDupsOptions {
                target_directory,
                output,
                threshold,
                grid,
                filter,
                config,
                threads,
                max_dimension,
                no_recursive,
                force,
                quiet,
            })
            .await?;
        }
        Commands::Process {
            duplicate_list,
            action,
            dest,
            select,
            dry_run,
            no_confirm,
        } => {
            execute_process(ProcessOptions {
                duplicate_list,
                action,
                dest,
                select,
                dry_run,
                no_confirm,
            })
            .await?;
        }
    }

    Ok(())
}
