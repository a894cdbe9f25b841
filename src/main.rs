use clap::Parser;
use std::time::Duration;
use yt_comment_poller::{App, AppError, Cli, Command, Fetcher, Scheduler};
use yt_data_client::YouTubeClient;
use yt_oauth::{ConsolePrompt, CredentialStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let http = reqwest::Client::new();

    tracing::info!(video_id = %cli.video_id, api = %cli.rest_api_address, "starting");

    let app = App::new(
        http.clone(),
        cli.oauth_config(),
        CredentialStore::new(&cli.token_path),
        Fetcher::new(YouTubeClient::new(http, &cli.rest_api_address), &cli.video_id),
        ConsolePrompt::new(cli.code_timeout()),
    );

    match cli.command {
        Command::Once { output_file } => {
            app.run_once(&output_file).await?;
        }
        Command::Poll {
            output_file,
            interval_ms,
            overlap,
        } => {
            tracing::info!(interval_ms, ?overlap, "polling configuration");
            let scheduler = Scheduler::new(Duration::from_millis(interval_ms), overlap);
            app.run_poll(output_file, scheduler, shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) and, on Unix, SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("received SIGINT, shutting down");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for SIGTERM, only Ctrl+C stops polling");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received SIGINT, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl+C, polling until killed");
            std::future::pending::<()>().await;
        }
    }
}
