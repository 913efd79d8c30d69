use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sizewatch::cli::{BaselineArgs, Cli, Command, RunArgs, SizeArgs};
use sizewatch::config::{self, Config};
use sizewatch::monitor;
use sizewatch::notify::LogNotifier;
use sizewatch::report;
use sizewatch::scan::{self, cancel::CancelToken};
use sizewatch::store::snapshot::SnapshotStore;
use sizewatch::units::normalize;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &RunArgs) -> Result<()> {
    let config = Config::from_run_args(args).context("invalid configuration")?;

    let outcome = monitor::run(&config, &LogNotifier, &CancelToken::new())
        .with_context(|| format!("run for {} failed", config.root.display()))?;

    let Some(report) = outcome.report else {
        println!(
            "First run for {}: baseline saved to {} ({} directories), nothing to compare yet.",
            config.root.display(),
            config.state_file.display(),
            outcome.measurement.snapshot.len()
        );
        return Ok(());
    };

    let rendered = if config.json_output {
        report::json::render(&report).context("failed to serialize report")?
    } else {
        report::text::render(&report)
    };

    print!("{rendered}");
    if config.json_output {
        println!();
    }

    if let Some(path) = &config.output {
        std::fs::write(path, &rendered).with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

fn size(args: &SizeArgs) -> Result<()> {
    for path in &args.paths {
        let bytes = scan::size_of(path).with_context(|| format!("cannot measure {}", path.display()))?;
        println!("{:>12} {:>14}  {}", normalize(bytes).to_string(), bytes, path.display());
    }
    Ok(())
}

fn baseline(args: &BaselineArgs) -> Result<()> {
    let state_file = config::state_file_for(args).context("invalid configuration")?;

    // root only matters for load(); peek reads the file as stored
    let store = SnapshotStore::new(&state_file, Path::new(""));
    let state = store
        .peek()
        .with_context(|| format!("cannot read baseline {}", state_file.display()))?;

    let Some(state) = state else {
        println!("No baseline at {}. Run 'sizewatch run' to create one.", state_file.display());
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let taken_at = state.taken_at.with_timezone(&chrono::Local);
    println!("baseline:    {}", state_file.display());
    println!("root:        {}", state.root);
    println!("taken:       {}", taken_at.format("%Y-%m-%d %H:%M:%S"));
    println!("directories: {}", state.sizes.len());
    println!("total:       {}", normalize(state.total_bytes));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Run(args) if args.verbose);
    init_logging(verbose);

    match &cli.command {
        Command::Run(args) => run(args),
        Command::Size(args) => size(args),
        Command::Baseline(args) => baseline(args),
    }
}
