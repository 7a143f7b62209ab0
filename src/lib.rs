#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

use crate::adapters::database::DbPool;
use crate::adapters::database::message_repo::MessageRepository;
use crate::api::ServiceContainer;
use crate::api::templates::Templates;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::message_service::MessageService;
use std::sync::Arc;
use tokio::sync::watch;

/// Creates the `messages` table if it does not exist yet. Safe to run on every boot.
///
/// # Errors
/// Returns `AppError::Migration` if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> error::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Wires the services around an existing pool.
///
/// # Errors
/// Returns `AppError::Template` if a bundled template does not compile.
pub fn build_services(config: &Config, pool: DbPool) -> error::Result<ServiceContainer> {
    let templates = Arc::new(Templates::new()?);
    Ok(ServiceContainer {
        message_service: MessageService::new(pool.clone(), MessageRepository::new()),
        health_service: HealthService::new(pool.clone(), config.health.clone()),
        pool,
        templates,
    })
}

/// Flips the shutdown channel on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
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
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}
