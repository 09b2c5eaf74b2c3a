//! git-activity - clones git repositories and serves a recent-activity feed
//!
//! # Usage
//! ```bash
//! git-activity                                   # Serve ./repositories on port 3000
//! git-activity --repository-dir /srv/repos       # Use another repository root
//! FILE_FILTER='\.rs$' git-activity --port 8080   # Only report Rust files
//! ```

mod activity;
mod config;
mod error;
mod git;
mod models;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, DEFAULT_FILE_FILTER};
use state::AppContext;

/// Clone and update git repositories, and report who added what recently
#[derive(Parser)]
#[command(name = "git-activity")]
#[command(about = "Clones git repositories and serves their recent activity", long_about = None)]
struct Cli {
    /// Directory holding one working copy per repository
    #[arg(long, env = "REPOSITORY_DIRECTORY", default_value = "repositories")]
    repository_dir: PathBuf,

    /// Address to bind to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to run the server on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Path prefix for all routes
    #[arg(long, env = "CONTEXT_PATH", default_value = "/")]
    context_path: String,

    /// Regular expression a changed file's path must match to count as activity
    #[arg(long, env = "FILE_FILTER", default_value = DEFAULT_FILE_FILTER)]
    file_filter: String,

    /// Maximum number of items returned by the activity feed
    #[arg(long, env = "ACTIVITY_LIMIT", default_value = "20")]
    activity_limit: usize,

    /// Number of recent commits read from each repository per activity query
    #[arg(long, env = "COMMITS_PER_REPOSITORY", default_value = "20")]
    commits_per_repository: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new(
        &cli.repository_dir,
        &cli.file_filter,
        cli.activity_limit,
        cli.commits_per_repository,
    )?;

    std::fs::create_dir_all(&config.repository_dir)?;

    tracing::info!(
        "Serving repositories from {} (file filter: {})",
        config.repository_dir.display(),
        config.file_filter.as_str()
    );

    let ctx = Arc::new(AppContext::new(config));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(ctx, &cli.context_path)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        "Running server on http://{} (context path: {})",
        addr,
        cli.context_path
    );

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
