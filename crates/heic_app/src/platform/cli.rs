use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Convert HEIC images to JPG, one at a time.
#[derive(Debug, Parser)]
#[command(name = "heic_app", version)]
pub struct Args {
    /// Files to convert. Non-matching files are skipped.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving the converted files.
    #[arg(short, long, default_value = "converted")]
    pub out: PathBuf,

    /// Bundle results into one ZIP when two or more succeed.
    #[arg(long)]
    pub zip: bool,

    /// Accepted source extension (repeatable). Replaces the default `heic`.
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Pause between conversions, in milliseconds.
    #[arg(long, default_value_t = 300)]
    pub settle_ms: u64,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}
