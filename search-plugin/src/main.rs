use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use search_plugin::{EnvironmentConfig, PluginError, SearchClient, SearchPlugin, Server};
use search_plugin_repository::{IndexProvider, OpenSearchClient};

#[tokio::main]
async fn main() {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if let Err(e) = run().await {
        error!(error = %e, "Search plugin server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), PluginError> {
    let config = EnvironmentConfig::from_env();
    let plugin = SearchPlugin::register(config.plugin_options())?;

    let mut server = Server::new(Router::new());
    server.route("/health", get(health));
    server.register(plugin)?;

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    server.serve_with_shutdown(listener, shutdown_signal()).await
}

async fn health(SearchClient(client): SearchClient<OpenSearchClient>) -> StatusCode {
    match client.health_check().await {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::SERVICE_UNAVAILABLE,
        Err(e) => {
            warn!(error = %e, "Health check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
