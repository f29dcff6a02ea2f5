//! Mapping a `Deps` key to a file inside a slice
//!
//! Components live at `{root}/slices/<slice>/<key with dots as slashes>.rb`.
//! A key may name its slice explicitly (`"collaborations.queries.get"`);
//! otherwise it refers to the slice of the file that declares it.

use std::fmt;

use regex::Regex;

use tracing::debug;

use super::errors::ResolutionError;

pub const SLICES_DIR: &str = "slices";
pub const SOURCE_EXTENSION: &str = "rb";

/// Slices that a `Deps` key may name as its first segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliceName {
    Domain,
    Collaborations,
}

impl SliceName {
    pub const ALL: [SliceName; 2] = [SliceName::Domain, SliceName::Collaborations];

    pub fn as_str(&self) -> &'static str {
        match self {
            SliceName::Domain => "domain",
            SliceName::Collaborations => "collaborations",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slice| slice.as_str() == segment)
    }
}

impl fmt::Display for SliceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the URI of the file a `Deps` key refers to.
///
/// `declaration` may still carry the quotes, comma and indentation of the
/// source line it came from. The returned URI is not checked for existence.
pub fn resolve_destination_uri(
    declaration: &str,
    current_uri: &str,
    root_uri: &str,
) -> Result<String, ResolutionError> {
    let root_uri = root_uri.trim_end_matches('/');
    let key = declaration.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == ',');

    let (slice, module_path) = match key.split_once('.') {
        Some((first, rest)) if SliceName::from_segment(first).is_some() => (first.to_string(), rest),
        _ => (infer_slice(current_uri, root_uri)?, key),
    };

    let destination = format!(
        "{}/{}/{}/{}.{}",
        root_uri,
        SLICES_DIR,
        slice,
        module_path.replace('.', "/"),
        SOURCE_EXTENSION
    );
    debug!("Resolved '{}' in slice '{}' to {}", key, slice, destination);
    Ok(destination)
}

/// Takes the slice from the first directory under `{root}/slices/` in
/// `current_uri`.
fn infer_slice(current_uri: &str, root_uri: &str) -> Result<String, ResolutionError> {
    let unresolvable = || ResolutionError::SliceUnresolvable {
        current_uri: current_uri.to_string(),
    };

    let pattern = format!("^{}/{}/([^/]+)/", regex::escape(root_uri), SLICES_DIR);
    let re = Regex::new(&pattern).map_err(|_| unresolvable())?;
    re.captures(current_uri)
        .and_then(|captures| captures.get(1))
        .map(|slice| slice.as_str().to_string())
        .ok_or_else(unresolvable)
}
