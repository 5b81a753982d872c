mod cli;
mod commands;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use dbkeeper::config::{env_loader, Config, ConfigOverrides};
use dbkeeper::restore::{AssumeYes, StdinConfirm};
use dbkeeper::{ComposeController, Confirm, Error as KeeperError, ReadinessGate, Supervisor};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(err) = e.downcast_ref::<KeeperError>() {
            eprintln!("Error: {}", err.with_suggestion());
            std::process::exit(err.exit_code());
        }

        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ── Tier 1: Commands that need NO config ──────────────────────────
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    // ── Load config ─────────────────────────────────────────────────
    let work_dir = resolve_work_dir(cli.workdir.clone())?;
    let vars = env_loader::layered_environment(
        cli.env_file.as_deref(),
        &work_dir,
        process_environment(),
    )?;

    let readiness = match &cli.command {
        Commands::Start { readiness } | Commands::Restart { readiness } => readiness.clone(),
        _ => cli::ReadinessArgs::default(),
    };
    let config = Config::from_vars(
        &vars,
        &work_dir,
        ConfigOverrides {
            compose_file: cli.compose_file.clone(),
            service: cli.service.clone(),
            backup_dir: cli.backup_dir.clone(),
            timeout: readiness.timeout,
            interval: readiness.interval,
        },
    )?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let out = output::CliOutput;

    // ── Tier 2: Commands that need config but NOT the runtime ─────────
    if let Commands::Backups { json } = cli.command {
        return commands::run_backups(&config, json, &out);
    }

    // ── Tier 3: Commands that drive the database ────────────────────
    let supervisor = Supervisor::new(Arc::new(ComposeController::from_config(&config)));
    let gate = ReadinessGate::new(config.readiness);

    match cli.command {
        Commands::Start { .. } => commands::run_start(&supervisor, &gate, &out).await?,
        Commands::Stop => commands::run_stop(&supervisor, &out).await?,
        Commands::Restart { .. } => commands::run_restart(&supervisor, &gate, &out).await?,
        Commands::Clean { yes } => {
            commands::run_clean(&supervisor, confirmation(yes), &out).await?
        }
        Commands::Backup { name } => {
            commands::run_backup(&supervisor, &config, name.as_deref(), &out).await?
        }
        Commands::Restore { path, yes } => {
            let path = work_dir.join(path);
            commands::run_restore(&supervisor, &config, &path, confirmation(yes), &out).await?
        }
        Commands::Status { json } => commands::run_status(&supervisor, json, &out).await?,
        Commands::Logs { tail, follow } => {
            commands::run_logs(&supervisor, tail, follow, &out).await?
        }
        // Handled in earlier tiers
        Commands::Completions { .. } | Commands::Backups { .. } => {
            unreachable!("handled in earlier dispatch tiers");
        }
    }

    Ok(())
}

fn confirmation(assume_yes: bool) -> &'static dyn Confirm {
    if assume_yes {
        &AssumeYes
    } else {
        &StdinConfirm
    }
}

/// Process environment as UTF-8 pairs; non-UTF-8 entries cannot be credentials and are skipped.
fn process_environment() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

fn resolve_work_dir(workdir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match workdir {
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
