use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dbkeeper")]
#[command(about = "Start, stop, back up and restore the development database")]
pub struct Cli {
    /// Working directory (defaults to the current directory)
    #[arg(short, long, global = true)]
    pub workdir: Option<PathBuf>,

    /// Dotenv file with credentials (defaults to .env if present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Compose file describing the database service
    #[arg(short = 'f', long, global = true)]
    pub compose_file: Option<PathBuf>,

    /// Compose service name of the database
    #[arg(short, long, global = true)]
    pub service: Option<String>,

    /// Directory holding backup artifacts
    #[arg(long, global = true)]
    pub backup_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the database and wait until it accepts connections
    Start {
        #[command(flatten)]
        readiness: ReadinessArgs,
    },
    /// Stop the database, keeping its data
    Stop,
    /// Stop, then start the database
    Restart {
        #[command(flatten)]
        readiness: ReadinessArgs,
    },
    /// Stop the database and delete all of its data
    Clean {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Dump the database into a new backup file
    Backup {
        /// Backup name (defaults to backup_<UTC timestamp>)
        name: Option<String>,
    },
    /// Replace the database contents with a backup file
    Restore {
        /// Path to the backup file
        path: PathBuf,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List backup files
    Backups {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show whether the database is running and healthy
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show database logs
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long)]
        tail: Option<usize>,
        /// Follow log output
        #[arg(short = 'F', long)]
        follow: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReadinessArgs {
    /// How long to wait for readiness (e.g. 30s, 2m)
    #[arg(long, value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Delay between health probes (e.g. 500ms, 2s)
    #[arg(long, value_parser = parse_duration_arg)]
    pub interval: Option<Duration>,
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    dbkeeper::config::parse_duration_string(s)
        .ok_or_else(|| format!("'{}' is not a duration (try 500ms, 30s or 1m)", s))
}
