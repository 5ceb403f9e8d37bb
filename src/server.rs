//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::time::Duration;

use crate::api::routes::create_router;
use crate::config::{Environment, StorageBackend, settings::Settings};
use crate::content::ContentBackend;
use crate::db::run_pending_migrations;
use crate::state::AppState;
use tokio::net::TcpListener;
use tokio::signal;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until shutdown signal
    ///
    /// Logs the effective configuration, applies pending migrations when
    /// `database.auto_migrate` is set, builds the content backend and the
    /// application state, then serves until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    /// - Migration or connection pool failures
    /// - Invalid i18n settings
    /// - Address binding errors
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        tracing::info!(
            host = %settings.server.host,
            port = %settings.server.port,
            request_timeout = %settings.server.request_timeout,
            keep_alive_timeout = %settings.server.keep_alive_timeout,
            "Server configuration loaded"
        );

        tracing::info!(
            backend = ?settings.storage.backend,
            assetstore_dir = %settings.storage.assetstore_dir,
            max_request_size = settings.upload.max_request_size,
            required_files = settings.upload.required_files.len(),
            "Storage configuration loaded"
        );

        tracing::info!(
            default_locale = %settings.i18n.default_locale,
            supported_locales = settings.i18n.supported_locales.as_deref().unwrap_or("*"),
            store_in_session = settings.i18n.store_in_session,
            store_in_cookie = settings.i18n.store_in_cookie,
            "Locale configuration loaded"
        );

        if settings.storage.backend == StorageBackend::Database && settings.database.auto_migrate {
            tracing::info!("Applying pending database migrations...");
            run_pending_migrations(&settings.database.url).await?;
        }

        let content = ContentBackend::from_settings(&settings).await?;
        tracing::info!(backend = content.name(), "Content store ready");

        let purge_interval = Duration::from_secs(settings.session.purge_interval);
        let address = settings.server.address();

        let state = AppState::new(settings, content)?;
        let purge_task = state.sessions.spawn_purge_task(purge_interval);
        tracing::info!("Application state created");

        let router = create_router(state);
        tracing::info!("Router configured");

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        purge_task.abort();
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// A signal handler that cannot be installed is logged and never fires.
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
