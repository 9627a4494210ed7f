use api_rest::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_core::config::log_filter_from_env;
use triage_core::constants::{ENV_ENABLE_WEB, ENV_WEB_PORT};
use triage_core::{TriageConfig, WebSettings};

/// Main entry point for the triage application
///
/// Loads `.env`, initialises logging from `LOG_LEVEL` and resolves configuration. When
/// `ENABLE_WEB=true` it serves the REST API on `WEB_PORT`; otherwise it reports the resolved
/// configuration and points at the CLI.
///
/// # Environment Variables
/// - `GEMINI_API_KEY`: model credential (required for analysis)
/// - `GEMINI_TIMEOUT`, `GEMINI_MAX_RETRIES`, `RAG_TOP_K`: pipeline tuning
/// - `LOG_LEVEL`: log verbosity (default: INFO)
/// - `ENABLE_WEB`, `WEB_PORT`: web server switch and port (default: 5000)
///
/// # Returns
/// * `Ok(())` - If the run completes or the server shuts down cleanly
/// * `Err(anyhow::Error)` - If logging, configuration or the server fails
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(log_filter_from_env())?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let web = WebSettings::from_env()?;

    if !web.enabled {
        let config = TriageConfig::from_env()?;
        tracing::info!("Configuration loaded: {:?}", config);
        tracing::info!(
            "Web server disabled; set {}=true to serve the REST API, or use the `triage` CLI",
            ENV_ENABLE_WEB
        );
        return Ok(());
    }

    // Built outside the runtime: the model client is blocking.
    let state = AppState::from_env();
    let addr = format!("0.0.0.0:{}", web.port);
    tracing::info!("++ Web server enabled ({}={})", ENV_WEB_PORT, web.port);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(api_rest::serve(&addr, state))
}
