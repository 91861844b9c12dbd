//! Storage layer for pass.in: the [`Store`] contract, its PostgreSQL and
//! in-memory implementations, and the module migration runner.

use std::sync::Arc;

use anyhow::Context;
use passin_kernel::settings::{DatabaseBackend, DatabaseSettings};

pub mod error;
pub mod memory;
pub mod migrate;
pub mod models;
pub mod postgres;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DynStore, Store};

/// Open the configured backend. The returned handle is the only store the
/// process uses; close it with [`Store::close`] on shutdown.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<DynStore> {
    let store: DynStore = match settings.backend {
        DatabaseBackend::Postgres => {
            let store = PgStore::connect(settings)
                .await
                .context("failed to connect to database")?;
            Arc::new(store)
        }
        DatabaseBackend::Memory => {
            tracing::warn!(target: "passin-db", "using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    store.ping().await.context("database health check failed")?;
    tracing::info!(target: "passin-db", backend = store.backend(), "store connected");

    Ok(store)
}
