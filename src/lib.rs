pub mod logging;
pub mod lsp;
pub mod tree_sitter;
