//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` trait implementation
//! for the Hanami backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Navigation (goto_definition)

use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    GotoDefinitionParams, GotoDefinitionResponse, InitializeParams, InitializeResult,
    InitializedParams, Location, MessageType, OneOf, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, info, warn};

use super::state::HanamiBackend;
use crate::lsp::features::resolve_definition;

/// Picks the project root from `initialize`: the root URI, else the first
/// workspace folder.
fn root_from_params(params: &InitializeParams) -> Option<Url> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.clone();
    root_uri.or_else(|| {
        params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
    })
}

#[tower_lsp::async_trait]
impl LanguageServer for HanamiBackend {
    /// Handles the LSP initialize request, recording the project root and advertising capabilities.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize: {:?}", params);

        match root_from_params(&params) {
            Some(root_uri) => {
                info!("Project root: {}", root_uri);
                self.session.write().await.set_root_uri(root_uri);
            }
            None => warn!("Client sent no root URI; definitions cannot be resolved"),
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Handles the LSP initialized notification.
    async fn initialized(&self, params: InitializedParams) {
        info!("Initialized: {:?}", params);
        self.client
            .log_message(MessageType::INFO, "Hanami language server initialized")
            .await;
    }

    /// Handles the LSP shutdown request.
    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    /// Handles opening a text document, storing its full text.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        info!("Opening document: URI={}, version={}", params.text_document.uri, params.text_document.version);
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.session.write().await.documents.open_or_replace(uri, text);
    }

    /// Handles changes to a text document. Sync is full, so the last change holds the whole text.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        debug!("textDocument/didChange: URI={}, version={}", params.text_document.uri, params.text_document.version);
        let uri = params.text_document.uri;
        match params.content_changes.into_iter().last() {
            Some(change) => {
                self.session.write().await.documents.open_or_replace(uri, change.text);
            }
            None => warn!("didChange for {} carried no content changes", uri),
        }
    }

    /// Handles closing a text document, removing it from the session.
    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        info!("textDocument/didClose: {}", params.text_document.uri);
        let uri = params.text_document.uri;
        if self.session.write().await.documents.close(&uri).is_none() {
            warn!("Failed to find document with URI={}", uri);
        }
    }

    /// Handles going to the definition of an injected dependency or one of its methods.
    async fn goto_definition(&self, params: GotoDefinitionParams) -> LspResult<Option<GotoDefinitionResponse>> {
        let start = std::time::Instant::now();
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        debug!("goto_definition request for {} at {:?}", uri, position);

        let session = self.session.read().await;
        let result = resolve_definition(&session, self.fs.as_ref(), &uri, position);
        drop(session);

        match result {
            Ok(resolved) => {
                info!("goto_definition completed in {:.3}ms ({})", start.elapsed().as_secs_f64() * 1000.0, resolved.uri);
                Ok(Some(GotoDefinitionResponse::Scalar(Location::from(resolved))))
            }
            Err(err) => {
                warn!("goto_definition failed ({}): {}", err.kind(), err);
                info!("goto_definition completed in {:.3}ms (no definition)", start.elapsed().as_secs_f64() * 1000.0);
                Ok(None)
            }
        }
    }
}
