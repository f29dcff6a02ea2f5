//! Ruby parsing and structural queries
//!
//! Thin layer over Tree-Sitter and the Ruby grammar. Every resolution parses
//! its inputs from scratch; nothing here is cached.
//!
//! Queries carry their own text predicates (`#eq?`, `#match?`). Tree-Sitter
//! evaluates them against the source while iterating matches, so the matches
//! returned by [`SyntaxQuery::run`] are already filtered.

use tree_sitter::{Language, Node as TSNode, Parser, Query, QueryCursor, StreamingIterator, Tree};

use tower_lsp::lsp_types::{Position, Range};

use tracing::{trace, warn};

/// Errors raised while compiling a structural query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("failed to load the Ruby grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid query: {0}")]
    Query(#[from] tree_sitter::QueryError),
}

pub fn ruby_language() -> Language {
    tree_sitter_ruby::LANGUAGE.into()
}

/// Parses Ruby source into a syntax tree.
///
/// Invalid source still produces a tree (with `ERROR` nodes). `None` is only
/// returned when the parser cannot be set up at all.
pub fn parse_code(code: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    if let Err(e) = parser.set_language(&ruby_language()) {
        warn!("Failed to set Tree-Sitter language: {}", e);
        return None;
    }
    let tree = parser.parse(code, None);
    if let Some(tree) = &tree {
        if tree.root_node().has_error() {
            trace!("Parse tree contains errors");
        }
    }
    tree
}

/// A single captured node of a query match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    /// Index of the capture name in the query
    pub index: u32,
    /// Capture name without the leading `@`
    pub name: String,
    /// Grammar kind of the node (`identifier`, `string_content`, ...)
    pub kind: String,
    pub range: Range,
    pub start_byte: usize,
    pub end_byte: usize,
    /// Number of ancestors between the node and the root
    pub depth: usize,
    pub text: String,
}

impl Capture {
    fn from_node(node: TSNode, index: u32, name: &str, source: &[u8]) -> Self {
        let text = node.utf8_text(source).unwrap_or("").to_string();
        Self {
            index,
            name: name.to_string(),
            kind: node.kind().to_string(),
            range: ts_node_range(&node),
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            depth: node_depth(node),
            text,
        }
    }

    /// Length of the node in bytes.
    pub fn span(&self) -> usize {
        self.end_byte - self.start_byte
    }

    /// True when `character` lies within the node's columns, both ends inclusive.
    pub fn contains_column(&self, character: u32) -> bool {
        self.range.start.character <= character && character <= self.range.end.character
    }
}

/// One match of a query, in the order Tree-Sitter reported it.
#[derive(Debug, Clone, Default)]
pub struct QueryMatch {
    pub pattern_index: usize,
    pub captures: Vec<Capture>,
}

impl QueryMatch {
    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.iter().find(|c| c.name == name)
    }
}

/// A compiled structural query against the Ruby grammar.
pub struct SyntaxQuery {
    query: Query,
}

impl SyntaxQuery {
    pub fn new(pattern: &str) -> Result<Self, QueryError> {
        let query = Query::new(&ruby_language(), pattern)?;
        trace!(
            "Compiled query with {} patterns and {} captures",
            query.pattern_count(),
            query.capture_names().len()
        );
        Ok(Self { query })
    }

    /// Runs the query over `tree`, evaluating text predicates against `source`.
    pub fn run(&self, tree: &Tree, source: &str) -> Vec<QueryMatch> {
        let names = self.query.capture_names();
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), source.as_bytes());

        let mut results = Vec::new();
        while let Some(m) = matches.next() {
            let captures = m
                .captures
                .iter()
                .map(|c| Capture::from_node(c.node, c.index, names[c.index as usize], source.as_bytes()))
                .collect();
            results.push(QueryMatch {
                pattern_index: m.pattern_index,
                captures,
            });
        }
        trace!("Query produced {} matches", results.len());
        results
    }
}

/// Parses `source` and runs `pattern` over it in one step.
///
/// Unparseable source and invalid patterns both yield no matches; the latter
/// is logged since it indicates a bad pattern rather than a bad buffer.
pub fn query_source(source: &str, pattern: &str) -> Vec<QueryMatch> {
    let query = match SyntaxQuery::new(pattern) {
        Ok(query) => query,
        Err(e) => {
            warn!("Discarding query: {}", e);
            return Vec::new();
        }
    };
    match parse_code(source) {
        Some(tree) => query.run(&tree, source),
        None => Vec::new(),
    }
}

/// Builds a regex that matches `literal` verbatim, encoded for use inside a
/// double-quoted query string such as `(#match? @x "...")`.
///
/// `prefix` and `suffix` are regex fragments placed around the escaped literal.
pub fn match_predicate_pattern(prefix: &str, literal: &str, suffix: &str) -> String {
    let regex = format!("{}{}{}", prefix, regex::escape(literal), suffix);
    let mut encoded = String::with_capacity(regex.len() + 8);
    for c in regex.chars() {
        match c {
            '\\' => encoded.push_str("\\\\"),
            '"' => encoded.push_str("\\\""),
            '\n' => encoded.push_str("\\n"),
            _ => encoded.push(c),
        }
    }
    encoded
}

pub fn ts_node_range(node: &TSNode) -> Range {
    let start = node.start_position();
    let end = node.end_position();
    Range {
        start: Position::new(start.row as u32, start.column as u32),
        end: Position::new(end.row as u32, end.column as u32),
    }
}

fn node_depth(node: TSNode) -> usize {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(parent) = current {
        depth += 1;
        current = parent.parent();
    }
    depth
}
