//! Travela API entry point.
//!
//! Binary name: `travela`
//!
//! Parses CLI arguments, loads settings, initializes the database and
//! services, then starts the REST API server.

mod cli;
mod http;
mod state;

use std::path::PathBuf;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, ServeArgs};
use state::AppState;
use travela_infra::config::{DEFAULT_CONFIG_FILE, load_settings};
use travela_infra::sqlite::otp::SqliteOtpStore;
use travela_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "travela", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(&TracingOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let file_settings = load_settings(&config_path).await?;
    let settings = args.settings.apply(file_settings);

    if settings.uses_default_jwt_secret() && !settings.is_development() {
        tracing::warn!(
            app_env = %settings.app_env,
            "JWT secret is the built-in default; set JWT_SECRET_KEY"
        );
    }
    if settings.gemini_api_key.is_empty() {
        tracing::warn!("GEMINI_API_KEY is not set; /ask requests will fail");
    }
    tracing::debug!(?settings, "Settings loaded");

    let state = AppState::init(settings).await?;

    match SqliteOtpStore::new(state.db_pool.clone()).purge_expired().await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "Purged expired OTP rows"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge expired OTP rows"),
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} {} API listening on {}",
        console::style("⚡").bold(),
        state.settings.app_name,
        console::style(format!("http://{addr}")).cyan()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
