//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, regardless of `ENABLE_WEB`.
//!
//! ## Intended use
//! Useful for development when you only want the HTTP interface (with OpenAPI/Swagger UI). The
//! workspace's main `triage-run` binary starts the same server when `ENABLE_WEB=true`.

use api_rest::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::{config::log_filter_from_env, WebSettings};

/// Main entry point for the triage REST API server
///
/// Listens on `0.0.0.0:$WEB_PORT` (default 5000).
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - `WEB_PORT` is not a valid port,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(log_filter_from_env())?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let web = WebSettings::from_env()?;
    let state = AppState::from_env();
    let addr = format!("0.0.0.0:{}", web.port);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(api_rest::serve(&addr, state))
}
