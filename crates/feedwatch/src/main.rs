//! Feedwatch CLI - mails new Weibo posts of followed accounts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedwatch::pipeline::poll_ticker;
use feedwatch::{Config, CookieSource, Pipeline, PollCycleResult, WeiboClient};
use notify::Notifier;

/// Feedwatch CLI - Poll followed accounts and mail new posts.
#[derive(Parser)]
#[command(name = "feedwatch")]
#[command(about = "Weibo feed watcher")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "FEEDWATCH_CONFIG",
        default_value = "config.yml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll every interval until interrupted (default)
    Run,

    /// Run a single poll cycle and exit
    Once,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Read before tracing starts: the file layer needs `log_dir`.
    let config = Config::from_file(&cli.config);
    let log_dir = config.as_ref().ok().and_then(|c| c.log_dir.clone());

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("feedwatch=debug,notify=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (file_layer, _log_guard) = match log_dir.as_deref() {
        Some(dir) => {
            let (writer, guard) = feedwatch::logging::daily_file_writer(dir)?;
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(file_layer)
        .with(filter)
        .init();

    // A broken config is the one fatal error: nothing has run yet.
    let config =
        config.inspect_err(|e| tracing::error!("Failed to load configuration: {e:#}"))?;
    tracing::info!(
        config = %cli.config.display(),
        accounts = config.following.len(),
        interval = config.interval,
        start_offset = config.start_offset,
        "Loaded configuration"
    );

    let window = config.initial_window(chrono::Utc::now())?;
    let source = Arc::new(WeiboClient::new(config.api_base.clone())?);
    let credentials = Arc::new(CookieSource::new(config.sub_url.clone())?);
    let notifier = Arc::new(Notifier::email(config.email.clone()));

    let pipeline = Pipeline::new(config.accounts(), window, source, credentials, notifier)
        .with_max_pages(config.max_pages);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_forever(pipeline, config.poll_interval()).await,
        Commands::Once => {
            let mut pipeline = pipeline;
            let result = pipeline.poll_cycle().await;
            report(&result);
            Ok(())
        }
    }
}

/// Poll on every tick until a shutdown signal arrives.
///
/// Cycles never overlap: the next tick is only awaited once the previous
/// cycle has finished. A signal during a cycle drops it before the window
/// advances.
async fn run_forever(mut pipeline: Pipeline, interval: Duration) -> Result<()> {
    let mut ticker = poll_ticker(interval);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            () = &mut shutdown => {
                tracing::warn!("Poll cycle aborted; window not advanced");
                break;
            }
            result = pipeline.poll_cycle() => {
                report(&result);
                tracing::info!(interval_secs = interval.as_secs(), "Waiting for next poll cycle");
            }
        }
    }

    tracing::info!(
        start = %pipeline.window().start(),
        end = %pipeline.window().end(),
        "Stopped"
    );
    Ok(())
}

fn report(result: &PollCycleResult) {
    for err in &result.errors {
        tracing::warn!(error = %err, "Cycle error");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
