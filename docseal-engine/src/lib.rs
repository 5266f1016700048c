//! Field encryption and authentication for documents.
//!
//! docseal transparently encrypts a configured subset of a document's fields
//! before persistence, decrypts them after retrieval, and signs a chosen
//! field set with a keyed authentication code so tampering and partial or
//! corrupted reads are detected.
//!
//! # Architecture
//!
//! One [`EncryptionEngine`] is installed per schema. It owns the schema's
//! key material (derived once, zeroized on drop) and the resolved field
//! policy. The host document framework wires the lifecycle transitions —
//! [`EncryptionEngine::before_save`], [`EncryptionEngine::after_save`],
//! [`EncryptionEngine::on_load`] — into its own hooks; the engine itself
//! performs no I/O.
//!
//! On persist the engine encrypts, then signs; on load it authenticates,
//! then decrypts. Authentication always runs over the raw, still-encrypted
//! representation.
//!
//! Batch upgrades of collections written in the pre-versioned envelope
//! format go through [`Migrator`], which consumes the same engine with
//! lifecycle hooks disabled.

mod engine;
mod error;
mod lifecycle;
mod migrations;
mod options;
mod policy;

pub use engine::EncryptionEngine;
pub use error::{EncryptionError, EncryptionResult};
pub use migrations::{DocumentStore, FailedDocument, MigrationReport, Migrator};
pub use options::EncryptionOptions;
pub use policy::FieldPolicy;
