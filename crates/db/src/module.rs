use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};

use crate::Store;

/// Core module owning the store handle's lifecycle.
pub struct DatabaseModule {
    store: Store,
}

impl DatabaseModule {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let target = redact(&ctx.settings.database.uri);
        self.store
            .ping()
            .await
            .with_context(|| format!("document store at {} is unreachable", target))?;

        tracing::info!(
            module = self.name(),
            backend = ?self.store.backend(),
            database = %ctx.settings.database.name,
            "document store reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.store.shutdown().await;
        tracing::info!(module = self.name(), "document store client shut down");
        Ok(())
    }
}

/// Hide credentials embedded in a connection string.
fn redact(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

pub fn create_module(store: Store) -> Arc<dyn Module> {
    Arc::new(DatabaseModule::new(store))
}
