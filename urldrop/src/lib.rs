//! # urldrop: save links to a Notion database
//!
//! `urldrop` accepts a URL plus optional title, notes and categories, creates a page for it in a
//! Notion database, and then posts a short notice to a Telegram chat.
//!
//! ## Architecture
//!
//! The server is a single [Axum](https://github.com/tokio-rs/axum) route, `/api/submit`, fronted by
//! permissive CORS headers so a browser page on any origin can call it. A submission is validated
//! ([`api::models::submissions::Submission`]), turned into a create-page body
//! ([`notion::PageCreateRequest`]) and forwarded to Notion ([`notion::NotionClient`]). Notion's
//! answer decides the response: a rejection is relayed with its status and body intact. Only after a
//! page exists is the Telegram notice sent ([`telegram::TelegramNotifier`]), and its failures are
//! logged rather than reported.
//!
//! The [`client`] module is the submitting side: a form model, the status machine driving one
//! submission at a time, and an HTTP transport. The `urldrop-submit` binary wires them to a
//! terminal.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use urldrop::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = urldrop::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     urldrop::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod notion;
pub mod telegram;
pub mod telemetry;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{any, get},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, warn};

use crate::{notion::NotionClient, telegram::TelegramNotifier};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `config`: Application configuration loaded from environment/files
/// - `notion`: Client for Notion's page-creation API
/// - `notifier`: Telegram notifier, absent when the bot is not configured
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .notion(notion)
///     .maybe_notifier(notifier)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub notion: NotionClient,
    pub notifier: Option<TelegramNotifier>,
}

impl AppState {
    /// Build the shared HTTP client and both downstream clients from `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let notion = NotionClient::new(http.clone(), &config.notion);
        let notifier = TelegramNotifier::from_config(http, &config.telegram);

        Ok(Self::builder().config(config).notion(notion).maybe_notifier(notifier).build())
    }
}

/// Build the application router.
///
/// Routes:
/// - `/api/submit`: every method is routed to the handler, which answers preflight itself
/// - `/healthz`: liveness
/// - `/internal/metrics`: Prometheus exposition, when `enable_metrics` is set
///
/// Every response, including errors and caught panics, carries the CORS headers.
pub fn build_router(state: AppState) -> Router {
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api/submit", any(api::handlers::submit::submit))
        .with_state(state);

    // Add Prometheus metrics if enabled
    let mut prometheus_layer = None;
    if enable_metrics {
        let (layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router.route("/internal/metrics", get(|| async move { metric_handle.render() }));
        prometheus_layer = Some(layer);
    }

    // CORS headers go on after every route is registered
    let mut router = router.layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET,POST,OPTIONS"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ))
            .layer(CatchPanicLayer::custom(errors::panic_response)),
    );

    if let Some(layer) = prometheus_layer {
        router = router.layer(layer);
    }

    // Add tracing layer
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance.
    ///
    /// Missing credentials are reported here but do not stop startup.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting urldrop with configuration: {:#?}", config);

        if let Err(e) = config.notion.credentials() {
            warn!("{e}: every submission will be answered with missing_env");
        }
        if config.telegram.is_partial() {
            warn!("Only one of TELEGRAM_TOKEN / TELEGRAM_CHAT_ID is set: notifications are disabled");
        } else if config.telegram.credentials().is_none() {
            info!("Telegram is not configured: notifications are disabled");
        }

        let state = AppState::from_config(config.clone())?;
        let router = build_router(state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind {bind_addr}"))?;
        info!(
            "urldrop listening on http://{}, submit to http://localhost:{}/api/submit",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        // Shutdown telemetry
        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
