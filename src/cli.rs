use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sizewatch")]
#[command(about = "Reports new, deleted and changed directories since the last run")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Measure the root, replace the baseline and report changes
    Run(RunArgs),

    /// Print the size of files or directories
    Size(SizeArgs),

    /// Summarize the saved baseline
    Baseline(BaselineArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Directory to monitor (defaults to home directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Ignore changed directories whose size moved by less than this percentage
    #[arg(long)]
    pub percent: Option<f64>,

    /// Ignore changed directories whose size moved by this many bytes or fewer
    #[arg(long)]
    pub bytes: Option<u64>,

    /// Baseline file (defaults to .sizewatch.json in the working directory)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Measure top-level subdirectories in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Output as JSON instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also write the report to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Show debug logging
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct SizeArgs {
    /// Files or directories to measure
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct BaselineArgs {
    /// Baseline file (defaults to .sizewatch.json in the working directory)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
