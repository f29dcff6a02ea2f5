//! Go-to-definition for injected dependencies
//!
//! # Pipeline
//!
//! ```text
//! cursor in document
//!       ↓
//! current line ──→ receiver.method under cursor (or the bare node under it)
//!       ↓
//! include Deps[...] ──→ dotted key for the receiver
//!       ↓
//! {root}/slices/<slice>/<key>.rb ──→ must exist
//!       ↓
//! method declaration in that file (top of file when no method was called)
//! ```
//!
//! Every stage fails with its own [`ResolutionError`] variant. Nothing is
//! retried and nothing is cached: a request is a pure function of the session
//! snapshot and the files on disk.

use tower_lsp::lsp_types::{Location, Position, Range, Url};

use tracing::debug;

use super::deps::locate_declaration;
use super::errors::ResolutionError;
use super::method_locator::locate_method;
use super::node_finder::{locate_symbol, locate_symbol_and_method};
use super::slices::resolve_destination_uri;
use crate::lsp::models::Session;
use crate::lsp::source_fs::{uri_to_path, SourceFs};

/// Where a definition request landed. The range is always a single point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub uri: Url,
    pub range: Range,
}

impl From<ResolvedLocation> for Location {
    fn from(resolved: ResolvedLocation) -> Self {
        Location::new(resolved.uri, resolved.range)
    }
}

/// Resolves definitions against one session snapshot.
pub struct DefinitionResolver<'a> {
    session: &'a Session,
    fs: &'a dyn SourceFs,
}

impl<'a> DefinitionResolver<'a> {
    pub fn new(session: &'a Session, fs: &'a dyn SourceFs) -> Self {
        Self { session, fs }
    }

    pub fn resolve(&self, uri: &Url, position: Position) -> Result<ResolvedLocation, ResolutionError> {
        let document = self
            .session
            .documents
            .get(uri)
            .ok_or_else(|| ResolutionError::DocumentNotFound { uri: uri.clone() })?;

        let lines: Vec<&str> = document.split('\n').collect();
        let line_number = position.line;
        // A request one past the last line passes this check and resolves
        // against an empty line.
        if line_number as usize > lines.len() {
            return Err(ResolutionError::LineOutOfRange {
                uri: uri.clone(),
                line: line_number,
            });
        }
        let current_line = lines.get(line_number as usize).copied().unwrap_or("");

        let (mut symbol, method) = locate_symbol_and_method(current_line, position);
        debug!("symbolName: {:?}, methodName: {:?}", symbol, method);
        if symbol.is_empty() {
            symbol = locate_symbol(current_line, position);
            debug!("Fell back to node under cursor: {:?}", symbol);
        }
        if symbol.is_empty() && method.is_empty() {
            return Err(ResolutionError::SymbolNotParsed {
                uri: uri.clone(),
                line: line_number,
                raw_line: current_line.to_string(),
            });
        }

        let declaration = locate_declaration(document, &symbol);
        if declaration.is_empty() {
            return Err(ResolutionError::DependencyNotDeclared { symbol });
        }

        let root = self.session.root_uri().ok_or(ResolutionError::RootNotSet)?;
        let destination = resolve_destination_uri(&declaration, uri.as_str(), root.as_str())?;
        debug!("destinationURI: {}", destination);

        let destination_uri = Url::parse(&destination).map_err(|source| ResolutionError::InvalidDestinationUri {
            uri: destination.clone(),
            source,
        })?;

        let path = uri_to_path(&destination);
        self.fs.stat(&path).map_err(|source| ResolutionError::DestinationMissing {
            uri: destination.clone(),
            source,
        })?;

        let position = if method.is_empty() {
            Position::default()
        } else {
            let content = self.destination_content(&destination_uri, &destination)?;
            locate_method(&content, &method, &destination)?
        };
        debug!("Resolved {}.{} to {}:{:?}", symbol, method, destination, position);

        Ok(ResolvedLocation {
            uri: destination_uri,
            range: Range::new(position, position),
        })
    }

    /// Open documents may hold unsaved edits, so they win over the disk copy.
    fn destination_content(&self, destination_uri: &Url, destination: &str) -> Result<String, ResolutionError> {
        if let Some(text) = self.session.documents.get(destination_uri) {
            return Ok(text.to_string());
        }
        self.fs
            .read_to_string(&uri_to_path(destination))
            .map_err(|source| ResolutionError::DestinationUnreadable {
                uri: destination.to_string(),
                source,
            })
    }
}

/// Convenience wrapper around [`DefinitionResolver::resolve`].
pub fn resolve_definition(
    session: &Session,
    fs: &dyn SourceFs,
    uri: &Url,
    position: Position,
) -> Result<ResolvedLocation, ResolutionError> {
    DefinitionResolver::new(session, fs).resolve(uri, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::source_fs::MemoryFs;
    use indoc::indoc;

    const ROOT: &str = "file:///app";

    const CURRENT: &str = indoc! {r#"
        module Domain
          module Operations
            class CreateGoal < Domain::Operation
              include Deps[
                "repositories.goal_repo",
                "operations.transaction",
                publish: "collaborations.operations.publish_goal"
              ]

              def call(params)
                transaction.call(params)
                goal_repo.create(params)
                publish.call(params)
              end
            end
          end
        end
    "#};

    const GOAL_REPO: &str = indoc! {r#"
        module Domain
          module Repositories
            class GoalRepo < Domain::Repo
              def create(attrs)
                goals.changeset(:create, attrs).commit
              end
            end
          end
        end
    "#};

    const PUBLISH_GOAL: &str = indoc! {r#"
        module Collaborations
          module Operations
            class PublishGoal
              def call(params)
              end
            end
          end
        end
    "#};

    fn current_uri() -> Url {
        Url::parse(&format!("{ROOT}/slices/domain/operations/create_goal.rb")).unwrap()
    }

    fn session() -> Session {
        let mut session = Session::with_root(Url::parse(ROOT).unwrap());
        session.documents.open_or_replace(current_uri(), CURRENT.to_string());
        session
    }

    fn fs() -> MemoryFs {
        MemoryFs::new()
            .with_file("/app/slices/domain/repositories/goal_repo.rb", GOAL_REPO)
            .with_file("/app/slices/domain/operations/transaction.rb", "class Transaction\nend\n")
            .with_file("/app/slices/collaborations/operations/publish_goal.rb", PUBLISH_GOAL)
    }

    fn point(line: u32, character: u32) -> Range {
        Range::new(Position::new(line, character), Position::new(line, character))
    }

    #[test]
    fn test_method_in_same_slice() {
        let (session, fs) = (session(), fs());
        // cursor on "create" in "goal_repo.create(params)"
        let resolved = resolve_definition(&session, &fs, &current_uri(), Position::new(11, 20)).unwrap();
        assert_eq!(resolved.uri.as_str(), "file:///app/slices/domain/repositories/goal_repo.rb");
        assert_eq!(resolved.range, point(3, 10));
    }

    #[test]
    fn test_declaration_line_resolves_to_file() {
        let (session, fs) = (session(), fs());
        let resolved = resolve_definition(&session, &fs, &current_uri(), Position::new(5, 13)).unwrap();
        assert_eq!(resolved.uri.as_str(), "file:///app/slices/domain/operations/transaction.rb");
        assert_eq!(resolved.range, point(0, 0));
    }

    #[test]
    fn test_aliased_dependency_in_other_slice() {
        let (session, fs) = (session(), fs());
        let resolved = resolve_definition(&session, &fs, &current_uri(), Position::new(12, 8)).unwrap();
        assert_eq!(resolved.uri.as_str(), "file:///app/slices/collaborations/operations/publish_goal.rb");
        assert_eq!(resolved.range, point(3, 10));
    }

    #[test]
    fn test_method_missing_in_destination() {
        let (session, fs) = (session(), fs());
        // Transaction declares no methods
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(10, 10)).unwrap_err();
        assert!(matches!(err, ResolutionError::MethodNotFound { ref method, .. } if method == "call"));
    }

    #[test]
    fn test_open_destination_wins_over_disk() {
        let (mut session, fs) = (session(), fs());
        let goal_repo = Url::parse("file:///app/slices/domain/repositories/goal_repo.rb").unwrap();
        session
            .documents
            .open_or_replace(goal_repo, "class GoalRepo\n\n  def create(attrs)\n  end\nend\n".to_string());

        let resolved = resolve_definition(&session, &fs, &current_uri(), Position::new(11, 20)).unwrap();
        assert_eq!(resolved.range, point(2, 6));
    }

    #[test]
    fn test_document_not_found() {
        let (session, fs) = (session(), fs());
        let other = Url::parse("file:///app/slices/domain/other.rb").unwrap();
        let err = resolve_definition(&session, &fs, &other, Position::new(0, 0)).unwrap_err();
        assert!(matches!(err, ResolutionError::DocumentNotFound { ref uri } if *uri == other));
    }

    #[test]
    fn test_line_bounds() {
        let (session, fs) = (session(), fs());
        let line_count = CURRENT.split('\n').count() as u32;

        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(line_count + 1, 0)).unwrap_err();
        assert!(matches!(err, ResolutionError::LineOutOfRange { line, .. } if line == line_count + 1));

        // Exactly at the line count passes the bound check and finds nothing.
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(line_count, 0)).unwrap_err();
        assert!(matches!(err, ResolutionError::SymbolNotParsed { .. }));
    }

    #[test]
    fn test_nothing_under_cursor() {
        let (session, fs) = (session(), fs());
        // Blank line between the Deps block and "def call"
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(8, 4)).unwrap_err();
        match err {
            ResolutionError::SymbolNotParsed { line, raw_line, .. } => {
                assert_eq!(line, 8);
                assert_eq!(raw_line, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_undeclared_dependency() {
        let (session, fs) = (session(), fs());
        // "params" in "def call(params)" is a parameter, not a dependency
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(9, 15)).unwrap_err();
        assert!(matches!(err, ResolutionError::DependencyNotDeclared { .. }));
    }

    #[test]
    fn test_destination_missing() {
        let session = session();
        let fs = MemoryFs::new();
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(5, 13)).unwrap_err();
        match err {
            ResolutionError::DestinationMissing { uri, source } => {
                assert_eq!(uri, "file:///app/slices/domain/operations/transaction.rb");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slice_unresolvable_outside_slices() {
        let fs = fs();
        let mut session = Session::with_root(Url::parse(ROOT).unwrap());
        let outside = Url::parse("file:///app/lib/tasks/seed.rb").unwrap();
        session.documents.open_or_replace(
            outside.clone(),
            "class Seed\n  include Deps[\"operations.transaction\"]\nend\n".to_string(),
        );
        let err = resolve_definition(&session, &fs, &outside, Position::new(1, 30)).unwrap_err();
        assert!(matches!(err, ResolutionError::SliceUnresolvable { .. }));
    }

    #[test]
    fn test_root_not_set() {
        let fs = fs();
        let mut session = Session::new();
        session.documents.open_or_replace(current_uri(), CURRENT.to_string());
        let err = resolve_definition(&session, &fs, &current_uri(), Position::new(5, 13)).unwrap_err();
        assert!(matches!(err, ResolutionError::RootNotSet));
    }

    #[test]
    fn test_location_conversion() {
        let resolved = ResolvedLocation {
            uri: Url::parse("file:///app/x.rb").unwrap(),
            range: point(1, 2),
        };
        let location: Location = resolved.clone().into();
        assert_eq!(location.uri, resolved.uri);
        assert_eq!(location.range, resolved.range);
    }
}
