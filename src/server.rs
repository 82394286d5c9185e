use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const PORT_ENV: &str = "PORT";

/// Precedence: command line, then `PORT`, then the config file.
pub fn resolve_port(configured: u16, env_port: Option<&str>, cli_port: Option<u16>) -> Result<u16> {
    if let Some(port) = cli_port {
        return Ok(port);
    }
    match env_port {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("{} is not a valid port: {:?}", PORT_ENV, raw)),
        None => Ok(configured),
    }
}

pub fn router(public_dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(public_dir: PathBuf, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    serve_on(listener, public_dir).await
}

pub async fn serve_on(listener: TcpListener, public_dir: PathBuf) -> Result<()> {
    if !public_dir.is_dir() {
        warn!("asset directory {} does not exist", public_dir.display());
    }

    let addr = listener.local_addr()?;
    info!("serving {} on http://{}", public_dir.display(), addr);

    axum::serve(listener, router(&public_dir)).await?;
    Ok(())
}
