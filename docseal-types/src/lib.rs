//! Document model and schema descriptors for docseal.
//!
//! This crate is the seam between the encryption engine and whatever
//! document framework hosts it. It provides:
//!
//! - [`Document`] — a loosely typed record (JSON field map) plus the two
//!   reserved envelope fields the engine manages, embedded children, and
//!   per-instance load state.
//! - [`Schema`] — the declared field paths of a collection, with an indexed
//!   flag per path and a one-time plugin-installation guard.
//! - [`Projection`] — which fields a query selected, reduced to a single
//!   selected/not-selected boolean per path.
//! - Dotted-path access helpers ([`get_path`], [`set_path`], [`pick`]) used
//!   for nested field addressing.
//! - [`Binary`] — the tagged wrapper shape binary values take when they pass
//!   through JSON serialization.

mod binary;
mod document;
mod path;
mod projection;
mod schema;

pub use binary::{Binary, unwrap_tagged};
pub use document::{AUTH_CODE_FIELD, CIPHERTEXT_FIELD, Document, ID_FIELD};
pub use path::{get_path, pick, remove_path, set_path};
pub use projection::Projection;
pub use schema::{FieldSpec, Schema};
