//! Locating the symbol under the cursor
//!
//! Both lookups parse a single line of the document on its own. Lines taken
//! out of context are often not valid Ruby (an unterminated `do`, a hash entry
//! from a multi-line `Deps[...]`), so the parse tree may contain `ERROR` nodes;
//! the queries below only rely on the nodes that survive error recovery.

use tower_lsp::lsp_types::Position;

use tracing::trace;

use crate::tree_sitter::{query_source, Capture};

const RECEIVER_METHOD_QUERY: &str = r#"
(call
  receiver: (identifier) @receiver
  method: (identifier) @method)
"#;

const ANY_NODE_QUERY: &str = "(_) @node";

/// Finds the `receiver.method` call under the cursor.
///
/// A call contains the cursor when `position.character` lies anywhere from the
/// first column of the receiver through the last column of the method name,
/// both ends inclusive. When several calls contain the cursor the last one
/// reported by the query wins.
///
/// Returns `("", "")` when no call contains the cursor.
pub fn locate_symbol_and_method(line: &str, position: Position) -> (String, String) {
    let mut symbol = String::new();
    let mut method = String::new();

    for m in query_source(line, RECEIVER_METHOD_QUERY) {
        let (Some(receiver), Some(method_node)) = (m.capture("receiver"), m.capture("method")) else {
            continue;
        };

        let start = receiver.range.start.character;
        let end = method_node.range.end.character;
        trace!(
            "Candidate call {}.{} spanning columns {}..={}",
            receiver.text, method_node.text, start, end
        );

        if start <= position.character && position.character <= end {
            symbol = receiver.text.clone();
            method = method_node.text.clone();
        }
    }

    (symbol, method)
}

/// Finds the most specific named node under the cursor and returns its text.
///
/// Among all nodes whose columns contain the cursor (inclusive), the one with
/// the smallest byte span wins. Equal spans go to the deeper node, and nodes
/// equal on both go to the one reported last. Zero-width nodes (inserted by
/// error recovery) are never selected.
///
/// Returns `""` when no node contains the cursor.
pub fn locate_symbol(line: &str, position: Position) -> String {
    let matches = query_source(line, ANY_NODE_QUERY);

    let mut best: Option<&Capture> = None;
    for capture in matches.iter().flat_map(|m| m.captures.iter()) {
        if capture.span() == 0 || !capture.contains_column(position.character) {
            continue;
        }

        let replace = match best {
            None => true,
            Some(current) => {
                capture.span() < current.span()
                    || (capture.span() == current.span() && capture.depth >= current.depth)
            }
        };
        if replace {
            best = Some(capture);
        }
    }

    match best {
        Some(capture) => {
            trace!("Most specific node at column {}: {} '{}'", position.character, capture.kind, capture.text);
            capture.text.clone()
        }
        None => String::new(),
    }
}
