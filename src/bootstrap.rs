//! Composition root: opens the store, wires the modules and runs the server.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use passin_db::DynStore;
use passin_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::admission::AdmissionController;
use crate::modules;

/// Build the module registry over an already opened store.
pub fn build_registry(store: DynStore, settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let admission = Arc::new(AdmissionController::new(store));
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, admission, settings)?;
    Ok(registry)
}

/// The full HTTP application over `store`, without binding a socket.
pub fn build_app(store: DynStore, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(store, settings)?;
    Ok(passin_http::build_router(&registry, settings))
}

/// Apply every module migration to `store`.
pub async fn apply_migrations(store: &DynStore, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = store
        .migrate(&migrations)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, total = migrations.len(), "migrations up to date");
    Ok(applied)
}

/// `passin migrate`: connect, migrate, disconnect.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let store = passin_db::connect(&settings.database).await?;
    let registry = build_registry(store.clone(), settings)?;
    let result = apply_migrations(&store, &registry).await;
    store.close().await;
    result
}

/// Run the server until Ctrl-C or SIGTERM.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "pass.in bootstrap starting"
    );

    let store = passin_db::connect(&settings.database).await?;
    let registry = build_registry(store.clone(), &settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_modules(&ctx)
        .await
        .context("failed to initialize modules")?;
    apply_migrations(&store, &registry).await?;
    registry
        .start_modules(&ctx)
        .await
        .context("failed to start modules")?;

    tracing::info!("pass.in bootstrap complete");

    let served = passin_http::start_server(&registry, &settings, shutdown_signal()).await;

    if let Err(err) = registry.stop_modules().await {
        tracing::error!(error = %err, "failed to stop modules");
    }
    store.close().await;
    tracing::info!("pass.in stopped");

    served
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passin_db::MemoryStore;

    #[test]
    fn registry_holds_both_modules() {
        let registry = build_registry(Arc::new(MemoryStore::new()), &Settings::default()).unwrap();
        assert!(registry.get_module("events").is_some());
        assert!(registry.get_module("attendees").is_some());
        assert_eq!(registry.collect_migrations().len(), 3);
    }

    #[test]
    fn openapi_document_covers_every_route() {
        let registry = build_registry(Arc::new(MemoryStore::new()), &Settings::default()).unwrap();
        let doc = passin_http::router::openapi_document(&registry);
        let paths = doc["paths"].as_object().unwrap();

        for path in [
            "/healthz",
            "/events",
            "/events/{eventId}",
            "/events/{eventId}/attendees",
            "/attendees/{attendeeId}/badge",
            "/attendees/{attendeeId}/check-in",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["schemas"]["Badge"].is_object());
    }

    #[tokio::test]
    async fn memory_store_skips_migrations() {
        let store: DynStore = Arc::new(MemoryStore::new());
        let registry = build_registry(store.clone(), &Settings::default()).unwrap();
        assert_eq!(apply_migrations(&store, &registry).await.unwrap(), 0);
    }
}
