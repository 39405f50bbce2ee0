//! Application startup and lifecycle management.
//!
//! Startup is a bounded, fail-fast phase: the model handle is initialized
//! before the listener is bound, and any failure ends `build` with an error.

use crate::config::AskConfig;
use crate::handlers::{ask, health_check, not_found, readiness_check};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::{ProviderError, TextProvider};
use crate::services::ModelHandle;
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::cors::{cors_layer, origin_gate_middleware, OriginAllowList};
use service_core::middleware::tracing::{http_trace_layer, request_id_middleware};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub model: ModelHandle,
}

/// Build the HTTP surface: routes, then body limit, CORS headers, the origin
/// gate, tracing and request ids from the inside out.
///
/// The origin gate sits outside CORS and routing, so a disallowed origin is
/// turned away before any body is read.
pub fn build_router(state: AppState, allow_list: OriginAllowList, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/ask", post(ask))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer(&allow_list))
        .layer(from_fn_with_state(allow_list, origin_gate_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
}

/// Create the Gemini provider and, if configured, probe it once.
pub async fn initialize_model(config: &AskConfig) -> Result<Arc<dyn TextProvider>, ProviderError> {
    let provider = GeminiTextProvider::new(GeminiConfig {
        api_key: config.google.api_key.clone(),
        model: config.model.name.clone(),
        api_base: config.model.api_base.clone(),
        timeout: config.model.timeout_secs.map(Duration::from_secs),
    })?;

    if config.model.verify_on_startup {
        provider.health_check().await?;
        tracing::info!(model = %config.model.name, "Verified Gemini model endpoint");
    }

    Ok(Arc::new(provider))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    model: ModelHandle,
}

impl Application {
    /// Initialize the model, then bind. Errors here are fatal for the process.
    pub async fn build(config: AskConfig) -> Result<Self, AppError> {
        let model = ModelHandle::new();

        match initialize_model(&config).await {
            Ok(provider) => {
                tracing::info!(model = %provider.model(), "Gemini model initialized");
                model.set_ready(provider);
            }
            Err(e) => {
                tracing::error!(error = %e, model = %config.model.name, "Failed to load Gemini model");
                model.set_failed(e.to_string());
                return Err(AppError::StartupError(anyhow::anyhow!(
                    "Failed to load Gemini model '{}': {}",
                    config.model.name,
                    e
                )));
            }
        }

        Self::build_with_model(&config, model).await
    }

    /// Bind the listener around an existing model handle.
    pub async fn build_with_model(config: &AskConfig, model: ModelHandle) -> Result<Self, AppError> {
        let allow_list = OriginAllowList::new(config.cors.allowed_origins.iter().cloned());
        if allow_list.is_empty() {
            tracing::warn!("CORS allow-list is empty; only requests without an Origin are accepted");
        } else {
            tracing::info!(origins = ?config.cors.allowed_origins, "CORS allow-list loaded");
        }

        let router = build_router(
            AppState {
                model: model.clone(),
            },
            allow_list,
            config.max_body_bytes,
        );

        // Port 0 binds a random port, used by tests.
        let address = config.common.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(address = %address, port, "Ask service listening");

        Ok(Self {
            port,
            listener,
            router,
            model,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the model handle shared with the request handlers.
    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
