//! Bookshelf application library
//!
//! Wires the document store, the resource modules and the HTTP server.

pub mod modules;

use anyhow::Context;
use bookshelf_db::Store;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::*;

/// Registry holding the `db` core module and every resource module, all
/// sharing `store`.
pub fn build_registry(store: &Store, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(bookshelf_db::create_module(store.clone()));
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Connect to the store, boot the modules and serve HTTP until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = Store::connect(&settings.database)
        .await
        .context("failed to create document store client")?;

    let registry = build_registry(&store, &settings);
    let ctx = InitCtx::new(&settings);

    registry.boot(&ctx).await?;
    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings).await;

    // Release the store even when the server failed.
    registry.shutdown().await?;
    served
}
