use std::sync::Arc;

use tokio::sync::RwLock;

use tower_lsp::Client;

use tracing::info;

use crate::lsp::models::Session;
use crate::lsp::source_fs::{LocalFs, SourceFs};

mod state;
mod handlers;

pub use state::HanamiBackend;

impl HanamiBackend {
    /// Creates a backend that resolves destinations against the local filesystem.
    pub fn new(client: Client) -> Self {
        Self::with_fs(client, Arc::new(LocalFs))
    }

    /// Creates a backend that resolves destinations through `fs`.
    pub fn with_fs(client: Client, fs: Arc<dyn SourceFs>) -> Self {
        info!("Creating Hanami backend with {} filesystem", fs.name());
        Self {
            client,
            session: Arc::new(RwLock::new(Session::new())),
            fs,
        }
    }

    /// A copy of the current session, for inspection.
    pub async fn session_snapshot(&self) -> Session {
        self.session.read().await.clone()
    }
}
