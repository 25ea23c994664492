use crate::config::Config;
use crate::error::Error;
use crate::relay::Relay;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod routes_webhook;

/// Largest accepted webhook body; Plex attaches thumbnails to some events.
const MAX_BODY_BYTES: usize = 10 << 20;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub relay: Relay,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self {
            relay: Relay::new(Arc::new(config)),
        }
    }
}

/// Error returned by webhook handlers, rendered as a short text body.
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            Error::BadRequest(msg) => msg.clone(),
            Error::Config(_) | Error::Transport(_) | Error::UpstreamStatus { .. } | Error::Decode(_) => {
                "Error fetching metadata".to_string()
            }
            _ => "Internal server error".to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Webhook processing failed");
        } else {
            tracing::warn!(status = %status, error = %self.0, "Rejected webhook request");
        }

        text_response(status, message)
    }
}

pub(crate) fn text_response(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", post(routes_webhook::handle_auto))
        .route("/plex", post(routes_webhook::handle_plex))
        .route("/jellyfin", post(routes_webhook::handle_jellyfin))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    text_response(StatusCode::OK, "OK")
}

async fn not_found() -> impl IntoResponse {
    text_response(StatusCode::NOT_FOUND, "404 page not found")
}

/// Start the HTTP server, stopping on Ctrl+C or SIGTERM
pub async fn start_server(config: Config) -> Result<()> {
    serve_until(config, shutdown_signal()).await
}

/// Serve webhooks until `shutdown` resolves, then drain in-flight requests.
pub async fn serve_until<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    if let Err(e) = config.history_api() {
        tracing::warn!("{}, Plex webhooks will fail until configured", e);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let local = listener.local_addr()?;

    tracing::info!(
        output_dir = %config.output_dir.display(),
        "Relay listening on {} (Plex and Jellyfin webhooks enabled)",
        local
    );

    axum::serve(listener, create_router(AppContext::new(config)))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Relay stopped");
    Ok(())
}

/// Resolves on the first termination signal. A signal source that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        "interrupt"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
        "terminate"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(signal = received, "Draining webhook requests before exit");
}
