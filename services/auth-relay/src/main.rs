//! Spotify Auth Relay
//!
//! Single-binary service that completes the Spotify Authorization Code flow
//! on behalf of a browser:
//! 1. `/login` issues a state nonce and redirects to the consent page
//! 2. `/callback` verifies the nonce and exchanges the code for tokens
//! 3. Tokens reach the browser as cookies or in a URL fragment
//! 4. `/refresh_token` mints new access tokens
//! 5. `/profile` (cookie delivery only) shows recent listening activity

mod config;
mod cookies;
mod error;
mod metrics;
mod profile;
mod render;
mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::Method;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Router, middleware};
use metrics_exporter_prometheus::PrometheusHandle;
use spotify_api::ApiClient;
use spotify_auth::{AuthClient, ClientCredentials};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Delivery, ServerConfig};

/// Time allowed for in-flight requests after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    auth: Arc<AuthClient>,
    api: Arc<ApiClient>,
    delivery: Delivery,
    /// Space-delimited scope string requested at login
    scope: Arc<str>,
    started_at: Instant,
    prometheus: PrometheusHandle,
}

impl AppState {
    fn from_config(
        config: &Config,
        http: reqwest::Client,
        prometheus: PrometheusHandle,
    ) -> Result<Self> {
        let client_secret = config
            .spotify
            .client_secret
            .clone()
            .context("client secret missing from loaded configuration")?;
        let credentials = ClientCredentials::new(config.spotify.client_id.clone(), client_secret);

        Ok(Self {
            auth: Arc::new(AuthClient::new(
                http.clone(),
                config.spotify.accounts_url.clone(),
                credentials,
                config.spotify.redirect_uri.clone(),
            )),
            api: Arc::new(ApiClient::new(http, config.spotify.api_url.clone())),
            delivery: config.spotify.delivery,
            scope: config.scope().into(),
            started_at: Instant::now(),
            prometheus,
        })
    }
}

/// Build the axum router with all routes and shared state.
///
/// `/profile` exists only under cookie delivery. Request metrics are
/// recorded for the relay's own routes, not for `/health` or `/metrics`.
fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let mut relay = Router::new()
        .route("/", get(routes::index))
        .route("/login", get(routes::login))
        .route("/callback", get(routes::callback))
        .route("/refresh_token", get(routes::refresh_token));
    if state.delivery == Delivery::Cookie {
        relay = relay.route("/profile", get(profile::profile));
    }

    let mut router = relay
        .route_layer(middleware::from_fn(metrics::track_requests))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));
    if server.cors {
        router = router.layer(cors_layer());
    }

    router
        .layer(tower::limit::ConcurrencyLimitLayer::new(server.max_connections))
        .with_state(state)
}

/// Any origin may call the relay's GET routes, e.g. page script
/// refreshing a fragment-delivered token.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD])
        .allow_headers(Any)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside local development
    let _ = dotenvy::dotenv();

    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting spotify-auth-relay");

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder();

    // CLI: simple --config flag parsing
    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let config_path = Config::resolve_path(cli_config_path);
    match &config_path {
        Some(path) => info!(path = %path.display(), "loading configuration"),
        None => info!("no config file, using environment and defaults"),
    }

    let config = Config::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to load config from environment".to_string(),
    })?;

    info!(
        listen_addr = %config.server.listen_addr,
        accounts_url = %config.spotify.accounts_url,
        api_url = %config.spotify.api_url,
        redirect_uri = %config.spotify.redirect_uri,
        delivery = config.spotify.delivery.as_str(),
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let app_state = AppState::from_config(&config, http, prometheus_handle)?;
    let app = build_router(app_state, &config.server);

    let listen_addr = config.server.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;

    info!(addr = %listen_addr, "accepting requests");

    // The drain timeout starts when the shutdown signal fires, not when the
    // server starts: notify the server to drain, then race the drain
    // against the timeout.
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Liveness probe: status, delivery mode and uptime.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "delivery": state.delivery.as_str(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

/// Prometheus metrics in text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        axum::http::StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
