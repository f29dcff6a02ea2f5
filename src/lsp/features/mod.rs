//! Definition resolution for Hanami components
//!
//! # Architecture Overview
//!
//! Each stage of a definition request lives in its own module:
//!
//! - `node_finder.rs` - What is under the cursor (`receiver.method` or a bare node)
//! - `deps.rs` - Which `include Deps[...]` key the receiver was injected as
//! - `slices.rs` - Which file under `slices/` that key refers to
//! - `method_locator.rs` - Where the called method is declared in that file
//! - `goto_definition.rs` - Runs the stages in order against a session snapshot
//! - `errors.rs` - One error variant per way a stage can fail
//!
//! The stages are pure functions over text; only `goto_definition.rs` touches
//! the filesystem, and it does so through [`crate::lsp::source_fs::SourceFs`].

pub mod deps;
pub mod errors;
pub mod goto_definition;
pub mod method_locator;
pub mod node_finder;
pub mod slices;

pub use errors::ResolutionError;
pub use goto_definition::{resolve_definition, DefinitionResolver, ResolvedLocation};
