use std::collections::HashMap;

use tower_lsp::lsp_types::Url;

use tracing::warn;

/// Full text of every open document, keyed by URI.
///
/// Documents are replaced wholesale on change; there is no incremental
/// patching.
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    documents: HashMap<Url, String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_or_replace(&mut self, uri: Url, text: String) {
        self.documents.insert(uri, text);
    }

    pub fn get(&self, uri: &Url) -> Option<&str> {
        self.documents.get(uri).map(String::as_str)
    }

    pub fn close(&mut self, uri: &Url) -> Option<String> {
        self.documents.remove(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Per-session context handed to every resolution: the open documents plus
/// the project root announced by the client at `initialize`.
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub documents: DocumentStore,
    root_uri: Option<Url>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root_uri: Url) -> Self {
        Self {
            documents: DocumentStore::new(),
            root_uri: Some(root_uri),
        }
    }

    pub fn root_uri(&self) -> Option<&Url> {
        self.root_uri.as_ref()
    }

    /// Records the project root. The root is fixed for the session's
    /// lifetime; later calls are ignored and return `false`.
    pub fn set_root_uri(&mut self, root_uri: Url) -> bool {
        match &self.root_uri {
            Some(existing) => {
                warn!("Ignoring root {}; session root is already {}", root_uri, existing);
                false
            }
            None => {
                self.root_uri = Some(root_uri);
                true
            }
        }
    }
}
