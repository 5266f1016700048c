//! Query projection state.
//!
//! A loaded document may have been fetched with only a subset of its fields.
//! The engine needs a single answer per field — selected or not — regardless
//! of whether the query expressed the projection by inclusion or exclusion.

use crate::document::ID_FIELD;
use std::collections::BTreeSet;

/// Which fields the originating query selected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    /// No projection: every field was loaded.
    #[default]
    All,
    /// Only the listed paths (and their descendants) were loaded.
    Include(BTreeSet<String>),
    /// Everything except the listed paths (and their descendants) was loaded.
    Exclude(BTreeSet<String>),
}

impl Projection {
    /// Convenience constructor for an inclusion projection.
    pub fn include<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(paths.into_iter().map(Into::into).collect())
    }

    /// Convenience constructor for an exclusion projection.
    pub fn exclude<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Exclude(paths.into_iter().map(Into::into).collect())
    }

    /// Whether `path` was selected by the query.
    ///
    /// The identifier field is implicitly selected by every projection.
    /// Inclusion selects a path, its descendants, and its ancestors (an
    /// ancestor is at least partially loaded when a descendant is); exclusion
    /// deselects a path and its descendants only.
    pub fn is_selected(&self, path: &str) -> bool {
        if path == ID_FIELD {
            return true;
        }
        match self {
            Projection::All => true,
            Projection::Include(paths) => paths
                .iter()
                .any(|p| p == path || is_under(path, p) || is_under(p, path)),
            Projection::Exclude(paths) => {
                !paths.iter().any(|p| p == path || is_under(path, p))
            }
        }
    }
}

/// Whether `path` is a strict descendant of `ancestor`.
fn is_under(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}
