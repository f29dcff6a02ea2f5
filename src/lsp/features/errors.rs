//! Typed failures of a definition request
//!
//! Each stage of the resolution pipeline fails with its own variant, carrying
//! enough context to reproduce the failure from the log line alone.

use std::io;

use tower_lsp::lsp_types::Url;

#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("document does not exist in state, uri: {uri}")]
    DocumentNotFound { uri: Url },

    #[error("line '{line}' does not exist in document with uri: {uri}")]
    LineOutOfRange { uri: Url, line: u32 },

    #[error("could not parse out line '{line}' in document with uri: {uri}\nrawLine: {raw_line}")]
    SymbolNotParsed { uri: Url, line: u32, raw_line: String },

    #[error("no match found for '{symbol}' in 'Deps' include list")]
    DependencyNotDeclared { symbol: String },

    #[error("unable to infer current slice name from {current_uri}")]
    SliceUnresolvable { current_uri: String },

    #[error("no project root has been set for this session")]
    RootNotSet,

    #[error("resolved destination {uri} is not a valid uri: {source}")]
    InvalidDestinationUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("destination {uri} does not exist: {source}")]
    DestinationMissing {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("destination {uri} could not be read: {source}")]
    DestinationUnreadable {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to resolve method with name '{method}' in file '{uri}' ({matches} matching declarations)")]
    MethodNotFound { method: String, uri: String, matches: usize },
}

impl ResolutionError {
    /// Short stable name of the failing stage, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DocumentNotFound { .. } => "document_not_found",
            Self::LineOutOfRange { .. } => "line_out_of_range",
            Self::SymbolNotParsed { .. } => "symbol_not_parsed",
            Self::DependencyNotDeclared { .. } => "dependency_not_declared",
            Self::SliceUnresolvable { .. } => "slice_unresolvable",
            Self::RootNotSet => "root_not_set",
            Self::InvalidDestinationUri { .. } => "invalid_destination_uri",
            Self::DestinationMissing { .. } => "destination_missing",
            Self::DestinationUnreadable { .. } => "destination_unreadable",
            Self::MethodNotFound { .. } => "method_not_found",
        }
    }
}
