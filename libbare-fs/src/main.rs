use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use libbare_fs::{
    BareLocalFileSystem, DEFAULT_BLOCK_SIZE, FileStatus, FsConfig, FsPermission, PortablePath,
};
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "barefs", version, about = "Inspect local files through the bare local filesystem")]
struct Cli {
    /// Directory relative paths are resolved against
    #[arg(long, env = "BAREFS_WORKING_DIR", value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Block size reported for every entry
    #[arg(long, env = "BAREFS_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: u64,

    /// Turn verbose logging on
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the status of a path
    Stat {
        #[arg(value_name = "PATH")]
        path: PortablePath,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the children of a directory, or the path itself if it is not one
    Ls {
        #[arg(value_name = "PATH")]
        path: PortablePath,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Set permissions, given as octal (750) or symbolic (rwxr-x---)
    Chmod {
        #[arg(value_name = "MODE")]
        mode: FsPermission,
        #[arg(value_name = "PATH")]
        path: PortablePath,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = FsConfig::default().with_default_block_size(cli.block_size);
    if let Some(dir) = &cli.working_dir {
        let dir = std::path::absolute(dir)
            .with_context(|| format!("Failed to resolve working directory {}", dir.display()))?;
        config = config.with_working_dir(dir);
    }
    let fs = BareLocalFileSystem::new(config).context("Failed to initialize filesystem")?;

    match cli.command {
        Commands::Stat { path, json } => {
            let status = fs
                .get_file_status(&path)
                .with_context(|| format!("Failed to stat {path}"))?;
            print_statuses(&[status], json)
        }
        Commands::Ls { path, json } => {
            let mut statuses = fs
                .list_status(&path)
                .with_context(|| format!("Failed to list {path}"))?;
            statuses.sort_by(|a, b| a.name().cmp(b.name()));
            print_statuses(&statuses, json)
        }
        Commands::Chmod { mode, path } => fs
            .set_permission(&path, &mode)
            .with_context(|| format!("Failed to set permission {mode} on {path}")),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_statuses(statuses: &[FileStatus], json: bool) -> Result<()> {
    let stdout = io::stdout();
    if json {
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, statuses)?;
        writeln!(out)?;
        return Ok(());
    }

    let mut tw = TabWriter::new(stdout.lock());
    writeln!(tw, "KIND\tPERMISSION\tOWNER\tGROUP\tSIZE\tMODIFIED\tPATH")?;
    for status in statuses {
        let modified: DateTime<Local> = status.modification_time().into();
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            if status.is_directory() { "dir" } else { "file" },
            status
                .permission()
                .map(|permission| permission.to_string())
                .unwrap_or_else(|| "-".to_string()),
            status.owner().unwrap_or("-"),
            status.group().unwrap_or("-"),
            status.len(),
            modified.format("%Y-%m-%d %H:%M:%S"),
            status.path(),
        )?;
    }
    tw.flush()?;
    Ok(())
}
