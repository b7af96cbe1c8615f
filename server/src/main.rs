mod routes;
mod services;
mod state;

use std::sync::Arc;

use gate::IdentityConfig;
use tracing_subscriber::EnvFilter;

use crate::services::identity::IdentityClient;

const DEFAULT_LOG_FILTER: &str = "info";

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let config = IdentityConfig::from_env().expect("identity configuration incomplete");
    let client = IdentityClient::from_env(&config).expect("identity client init failed");

    let state = state::AppState::new(config, Arc::new(client));
    let app = routes::app(state).expect("leptos app init failed");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "gatehouse listening");
    axum::serve(listener, app).await.expect("server failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("  ".to_owned())).to_string(), "info");
    }

    #[test]
    fn log_filter_uses_directives() {
        assert_eq!(log_filter(Some("server=debug".to_owned())).to_string(), "server=debug");
    }
}
