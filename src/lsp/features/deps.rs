//! Finding a dependency in the `include Deps[...]` manifest
//!
//! A component declares its collaborators with
//!
//! ```ruby
//! include Deps[
//!   "operations.transaction",
//!   apply_visibility: "operations.commands.services.visibility.apply_and_transform"
//! ]
//! ```
//!
//! A bare entry is injected under the last segment of its key
//! (`transaction`), an aliased entry under its hash key (`apply_visibility`).
//! Either may be looked up; a bare entry also answers to its full key, which is
//! what the cursor yields when it sits on the declaration itself.

use tracing::{debug, trace};

use crate::tree_sitter::{match_predicate_pattern, query_source};

/// Returns the dotted key declared for `symbol_name`, or `""` when the
/// document has no `include Deps[...]` entry for it.
///
/// Names are matched literally. When several entries match, the last one in
/// document order wins.
pub fn locate_declaration(document: &str, symbol_name: &str) -> String {
    if symbol_name.is_empty() {
        return String::new();
    }

    let pattern = deps_query(symbol_name);
    let mut declaration = String::new();
    for m in query_source(document, &pattern) {
        for capture in &m.captures {
            if capture.name == "path" || capture.name == "aliased_path" {
                trace!(
                    "Deps entry for '{}' at {}:{}: {}",
                    symbol_name, capture.range.start.line, capture.range.start.character, capture.text
                );
                declaration = capture.text.clone();
            }
        }
    }

    debug!("Declaration for '{}': {:?}", symbol_name, declaration);
    declaration
}

fn deps_query(symbol_name: &str) -> String {
    let bare = match_predicate_pattern(r"(^|\.)", symbol_name, "$");
    let alias = match_predicate_pattern("^", symbol_name, "$");
    format!(
        r#"
(call
  method: (identifier) @include (#eq? @include "include")
  arguments: (argument_list
    (element_reference
      object: (constant) @deps (#eq? @deps "Deps")
      [(string (string_content) @path (#match? @path "{bare}"))
       (pair
         key: (hash_key_symbol) @alias (#match? @alias "{alias}")
         value: (string (string_content) @aliased_path))])))
"#
    )
}
