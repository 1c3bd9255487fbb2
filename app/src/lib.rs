//! Lendscope service entry point

use anyhow::Context;
use lendscope_api::AppState;
use lendscope_core::AppConfig;

/// Config file read when `LENDSCOPE_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "lendscope.json";

/// Run the HTTP service until it fails or the process is stopped
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lendscope_lib=debug".parse()?)
                .add_directive("lendscope_api=debug".parse()?)
                .add_directive("lending=debug".parse()?)
                .add_directive("market_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();

    let config_path =
        std::env::var("LENDSCOPE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!(
        network = config.network.as_str(),
        market_api = %config.api.url,
        "Starting Lendscope"
    );

    let port = config.api_port;
    let state = AppState::with_config(config);

    lendscope_api::start_server(state, port)
        .await
        .with_context(|| format!("API server on port {} stopped", port))
}
