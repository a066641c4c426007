use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Handed to every module on `init` and `start`.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

impl<'a> InitCtx<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }
}

/// A unit of the service with its own routes and lifecycle.
///
/// The registry drives every module through `init`, then `start`, before the
/// server accepts traffic, and through `stop` once it has drained. Core
/// modules (the store) go first on the way up and last on the way down.
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the mount point: routes are served under `/api/{name}`.
    fn name(&self) -> &'static str;

    /// Validate configuration and reach external dependencies. An error here
    /// aborts startup.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI `paths` and `components` for this module, with paths relative
    /// to the mount point.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release held resources. Runs after the server stops accepting requests.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
