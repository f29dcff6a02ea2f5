//! Backend state management
//!
//! This module defines the HanamiBackend struct, which owns the session (open
//! documents plus project root) shared by all LSP handlers.

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::Client;

use crate::lsp::models::Session;
use crate::lsp::source_fs::SourceFs;

/// The Hanami language server backend, managing state and handling LSP requests.
///
/// Notifications take the session write lock; definition requests take the
/// read lock, so a request never observes a half-applied document change.
#[derive(Clone)]
pub struct HanamiBackend {
    pub(super) client: Client,
    pub(super) session: Arc<RwLock<Session>>,
    /// Where resolved destinations are checked and read
    pub(super) fs: Arc<dyn SourceFs>,
}

// Manual Debug implementation since SourceFs doesn't implement Debug
impl std::fmt::Debug for HanamiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HanamiBackend")
            .field("fs", &self.fs.name())
            .field("session", &"<RwLock<Session>>")
            .finish()
    }
}
