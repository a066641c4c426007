use std::sync::Arc;

use bookshelf_kernel::settings::{DatabaseBackend, DatabaseSettings};
use mongodb::bson::doc;

use crate::memory::InMemoryStore;
use crate::mongo::MongoCollection;
use crate::{DocumentCollection, Record, StoreError};

/// The process-wide store handle. Cloning is cheap and shares the underlying
/// client or memory.
#[derive(Clone)]
pub enum Store {
    Mongo {
        client: mongodb::Client,
        database: mongodb::Database,
    },
    Memory(InMemoryStore),
}

impl Store {
    /// Build the handle described by `settings`. The MongoDB driver connects
    /// lazily, so an unreachable server only surfaces on first use or `ping`.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        match settings.backend {
            DatabaseBackend::Mongodb => {
                let client = mongodb::Client::with_uri_str(&settings.uri).await?;
                let database = client.database(&settings.name);
                tracing::info!(
                    target: "bookshelf-db",
                    database = %settings.name,
                    "mongodb client created"
                );
                Ok(Store::Mongo { client, database })
            }
            DatabaseBackend::Memory => {
                tracing::warn!(
                    target: "bookshelf-db",
                    "using the in-memory store; data is lost on exit"
                );
                Ok(Store::memory())
            }
        }
    }

    pub fn memory() -> Self {
        Store::Memory(InMemoryStore::new())
    }

    pub fn backend(&self) -> DatabaseBackend {
        match self {
            Store::Mongo { .. } => DatabaseBackend::Mongodb,
            Store::Memory(_) => DatabaseBackend::Memory,
        }
    }

    pub fn collection<T: Record>(&self, name: &str) -> Arc<dyn DocumentCollection<T>> {
        match self {
            Store::Mongo { database, .. } => {
                Arc::new(MongoCollection::new(database.collection::<T>(name)))
            }
            Store::Memory(memory) => Arc::new(memory.collection::<T>(name)),
        }
    }

    /// Round-trip to the server to confirm it is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Store::Mongo { database, .. } => {
                database.run_command(doc! { "ping": 1 }).await?;
                Ok(())
            }
            Store::Memory(_) => Ok(()),
        }
    }

    /// Close pooled connections and end server sessions.
    pub async fn shutdown(&self) {
        if let Store::Mongo { client, .. } = self {
            client.clone().shutdown().await;
        }
    }
}
