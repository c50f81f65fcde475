mod commands;
mod formatting;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "monorail")]
#[command(about = "Dependency-graph build and release orchestrator for monorepos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "./packages")]
    packages_dir: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, action)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dependency graph and build levels
    Status {
        #[arg(long, action)]
        json: bool,
    },
    /// Detect and resolve external dependency version drift
    SyncDeps {
        #[arg(long, action)]
        dry_run: bool,
    },
    /// Run every package's build script in dependency order
    Build {
        #[arg(long, action)]
        sequential: bool,
        #[arg(short = 'j', long)]
        parallel: Option<usize>,
    },
    /// Run every package's test script in dependency order
    Test {
        #[arg(long, action)]
        sequential: bool,
        #[arg(short = 'j', long)]
        parallel: Option<usize>,
        #[arg(long, action)]
        coverage: bool,
    },
    /// Bump every package and internal dependency range to a version
    Version {
        new_version: String,
        #[arg(long, action)]
        dry_run: bool,
    },
    /// Publish packages to the registry in dependency order
    Publish {
        #[arg(long, action)]
        dry_run: bool,
        #[arg(long, action)]
        force: bool,
        #[arg(long, action)]
        skip_version_check: bool,
    },
    /// Poll the registry until a published version propagates
    Verify {
        version: String,
        /// Overall polling budget in milliseconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Remove a release tag and optionally unpublish its packages
    Rollback {
        version: String,
        #[arg(long, action)]
        force: bool,
        #[arg(long, action)]
        unpublish: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    match cli.command {
        Commands::Status { json } => commands::cmd_status(cli.packages_dir, json)?,
        Commands::SyncDeps { dry_run } => commands::cmd_sync_deps(cli.packages_dir, dry_run)?,
        Commands::Build {
            sequential,
            parallel,
        } => commands::cmd_build(cli.packages_dir, sequential, parallel)?,
        Commands::Test {
            sequential,
            parallel,
            coverage,
        } => commands::cmd_test(cli.packages_dir, sequential, parallel, coverage)?,
        Commands::Version {
            new_version,
            dry_run,
        } => commands::cmd_version(cli.packages_dir, new_version, dry_run)?,
        Commands::Publish {
            dry_run,
            force,
            skip_version_check,
        } => commands::cmd_publish(cli.packages_dir, dry_run, force, skip_version_check)?,
        Commands::Verify { version, timeout } => {
            commands::cmd_verify(cli.packages_dir, version, timeout)?
        }
        Commands::Rollback {
            version,
            force,
            unpublish,
        } => commands::cmd_rollback(cli.packages_dir, version, force, unpublish)?,
    }

    Ok(())
}
