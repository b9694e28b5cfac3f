use crate::perceptual_hash::config::ResizeFilter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "phash_dedup")]
#[command(about = "Find and manage near-duplicate images with a perceptual hash")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hash every image in a directory and group near-duplicates
    FindDups {
        /// Target directory to scan
        target_directory: PathBuf,

        /// Output file path for the duplicate report
        #[arg(short, long, default_value = "duplicates.json")]
        output: PathBuf,

        /// Minimum similarity in percent (0-100)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Hash grid side length (16 gives a 256-bit hash)
        #[arg(short, long)]
        grid: Option<u32>,

        /// Resampling filter used before hashing
        #[arg(long, value_enum)]
        filter: Option<ResizeFilter>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of images decoded concurrently
        #[arg(long)]
        threads: Option<usize>,

        /// Shrink images to this size before hashing
        #[arg(long)]
        max_dimension: Option<u32>,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Force overwrite existing output file without warning
        #[arg(short, long)]
        force: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Move or delete images selected from a duplicate report
    Process {
        /// Duplicate report from the find-dups command
        #[arg(default_value = "duplicates.json")]
        duplicate_list: PathBuf,

        /// Action to perform: move or delete
        #[arg(short, long, value_enum, default_value_t = ProcessAction::Move)]
        action: ProcessAction,

        /// Destination directory for moved files
        #[arg(short, long, default_value = "./duplicates")]
        dest: PathBuf,

        /// Which group members to select
        #[arg(short, long, value_enum, default_value_t = SelectMode::ExceptFirst)]
        select: SelectMode,

        /// Show the selection and the images that would remain, without touching files
        #[arg(long)]
        dry_run: bool,

        /// Skip confirmation prompt
        #[arg(long)]
        no_confirm: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessAction {
    Move,
    Delete,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectMode {
    /// Keep the first image of each group
    ExceptFirst,
    /// Select every member, including the first
    All,
}
