pub mod cli;
mod commands;
pub mod core;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::CommandContext;

pub fn run() -> ExitCode {
    // before clap reads env-backed flags and before the runtime spawns threads
    let dotenv_vars = crate::core::config::dotenv::load(Path::new(".env"));

    let cli = Cli::parse();

    // Initialize structured logging
    let default_filter = if cli.quiet {
        "warn"
    } else {
        "info,mcserver_updater_lib=debug"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    match dotenv_vars {
        Ok(0) => {}
        Ok(n) => tracing::debug!("Loaded {} variable(s) from .env", n),
        Err(e) => tracing::warn!("Ignoring .env: {}", e),
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx = CommandContext {
        config_path: cli.config.clone(),
        mappings_path: cli.mappings.clone(),
        curseforge_api_key: cli.curseforge_api_key.clone(),
    };

    let result = runtime.block_on(async {
        match &cli.command {
            Commands::Check(args) => commands::check(&ctx, args).await,
            Commands::Download(args) => commands::download(&ctx, args).await,
            Commands::Validate(args) => commands::validate(&ctx, args).await,
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
