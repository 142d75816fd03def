//! mirrorhost server
//!
//! Run with: cargo run --bin mirrorhost
//!
//! Serves the env endpoint, runs one bootstrap of the configured modules
//! against it and publishes the rendered page and run report. Ctrl-C
//! cancels a run still in flight and shuts the server down.

use anyhow::Context;
use clap::Parser;
use mirrorhost::config::Config;
use mirrorhost::host::{EnvClient, EnvClientConfig, EnvSource, LocalShell, ShellEvent};
use mirrorhost::loader::{Orchestrator, OrchestratorOptions, PageDocument};
use mirrorhost::modules::builtin_registry;
use mirrorhost::server::{self, AppState};
use mirrorhost::{logging, CancellationToken};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mirrorhost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Smart mirror host")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    logging::init(&config.logging)?;

    tracing::info!("Starting mirrorhost v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Root directory: {}", config.loader.root_dir);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            server::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    let state = AppState::new(
        config.loader.env_vars(),
        config.server.base_path.clone(),
        config.loader.root_dir.clone(),
    );
    let server_handle = tokio::spawn(server::serve(listener, state.clone(), {
        let shutdown = shutdown.clone();
        async move { shutdown.cancelled().await }
    }));

    // The loader reads its environment through the host's own endpoint
    let env_client = EnvClient::new(EnvClientConfig {
        base_url: format!("http://{}", local_addr),
        base_path: config.server.base_path.clone(),
        ..Default::default()
    })?;
    let shell = Arc::new(
        LocalShell::new(EnvSource::Remote(env_client), builtin_registry())
            .with_positions(config.loader.positions.clone()),
    );

    let mut events = shell.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ShellEvent::ModulesStarted { identifiers, at } => {
                    tracing::info!("All modules started at {}: {:?}", at, identifiers);
                }
            }
        }
    });

    let document = Arc::new(PageDocument::new(&config.loader.root_dir));
    let mut orchestrator = Orchestrator::new(
        shell,
        document.clone(),
        OrchestratorOptions::from(&config.loader),
    );

    tokio::spawn({
        let shutdown = shutdown.clone();
        let run_cancel = orchestrator.cancel_token();
        async move {
            shutdown.cancelled().await;
            run_cancel.cancel();
        }
    });

    let report = orchestrator.run(&config.modules).await;
    if report.cancelled {
        tracing::warn!("Bootstrap run cancelled");
    }
    let page = document.render_html("MagicMirror²").await;
    state.publish(report, page).await;

    server_handle.await??;
    Ok(())
}
