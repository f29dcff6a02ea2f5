//! Locating a method declaration inside a resolved component

use tower_lsp::lsp_types::Position;

use tracing::{debug, trace};

use super::errors::ResolutionError;
use crate::tree_sitter::{match_predicate_pattern, query_source};

/// Returns the start of the name of the single method declared in
/// `file_content` whose name ends with `method_name`.
///
/// An empty `method_name` means the component itself was requested and
/// resolves to the top of the file. Zero matches and more than one match are
/// both `MethodNotFound`; `uri` only appears in that error.
pub fn locate_method(file_content: &str, method_name: &str, uri: &str) -> Result<Position, ResolutionError> {
    if method_name.is_empty() {
        return Ok(Position::default());
    }

    let name = match_predicate_pattern("", method_name, "$");
    let pattern = format!(
        r#"
(method name: (_) @name (#match? @name "{name}"))
(singleton_method name: (_) @name (#match? @name "{name}"))
"#
    );

    let matches = query_source(file_content, &pattern);
    for m in &matches {
        trace!("Method candidate for '{}': {:?}", method_name, m.capture("name").map(|c| &c.text));
    }

    if matches.len() != 1 {
        debug!("Expected exactly one declaration of '{}' in {}, found {}", method_name, uri, matches.len());
        return Err(ResolutionError::MethodNotFound {
            method: method_name.to_string(),
            uri: uri.to_string(),
            matches: matches.len(),
        });
    }

    matches[0]
        .capture("name")
        .map(|capture| capture.range.start)
        .ok_or_else(|| ResolutionError::MethodNotFound {
            method: method_name.to_string(),
            uri: uri.to_string(),
            matches: 0,
        })
}
