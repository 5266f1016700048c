//! Schema descriptors.
//!
//! A [`Schema`] is the static shape of a collection as the host framework
//! declares it: the collection/model name, the declared field paths with
//! their indexed flag, and a one-time guard so the encryption engine cannot
//! be installed twice over the same schema.

use crate::document::{AUTH_CODE_FIELD, CIPHERTEXT_FIELD};
use std::sync::atomic::{AtomicBool, Ordering};

/// A declared field path and whether the datastore indexes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub path: String,
    pub indexed: bool,
}

impl FieldSpec {
    /// A plain (non-indexed) field.
    pub fn plain(path: impl Into<String>) -> Self {
        Self { path: path.into(), indexed: false }
    }

    /// An indexed field. Indexed fields are excluded from default encryption
    /// since ciphertext is not queryable.
    pub fn indexed(path: impl Into<String>) -> Self {
        Self { path: path.into(), indexed: true }
    }
}

/// Declared shape of a collection.
///
/// Construction appends the two reserved envelope fields (`_ct`, `_ac`) when
/// the host schema does not already declare them, so every schema the engine
/// sees can hold a ciphertext and an authentication code.
#[derive(Debug)]
pub struct Schema {
    collection: Option<String>,
    fields: Vec<FieldSpec>,
    installed: AtomicBool,
}

impl Schema {
    /// A schema bound to a named collection.
    pub fn new(collection: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self::build(Some(collection.into()), fields)
    }

    /// A schema with no resolvable collection name. Documents of such a
    /// schema cannot be signed or authenticated unless the engine is given a
    /// collection id some other way.
    pub fn anonymous(fields: Vec<FieldSpec>) -> Self {
        Self::build(None, fields)
    }

    fn build(collection: Option<String>, mut fields: Vec<FieldSpec>) -> Self {
        for reserved in [CIPHERTEXT_FIELD, AUTH_CODE_FIELD] {
            if !fields.iter().any(|f| f.path == reserved) {
                fields.push(FieldSpec::plain(reserved));
            }
        }
        Self { collection, fields, installed: AtomicBool::new(false) }
    }

    /// The collection/model identifier, when one exists.
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Declared field specs, reserved fields included.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Declared field paths.
    pub fn declared_paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.path.as_str())
    }

    /// Flips the installed flag. Returns `false` when an engine was already
    /// installed over this schema.
    pub fn try_mark_installed(&self) -> bool {
        self.installed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
