//! Batch migration routines.
//!
//! These normalize a whole collection to the current envelope format while
//! the application is live: unversioned ciphertext gains the leading version
//! byte, unsigned documents gain an authentication code, and never-encrypted
//! documents are encrypted for the first time.
//!
//! A `Migrator` must not coexist with a standard engine on the same schema —
//! the schema's install guard enforces that. Documents are processed
//! sequentially and per-document failures are collected, not retried; the
//! batch only aborts early under [`Migrator::fail_fast`].

use crate::engine::EncryptionEngine;
use crate::error::EncryptionResult;
use crate::options::EncryptionOptions;
use async_trait::async_trait;
use docseal_crypto::FORMAT_VERSION;
use docseal_types::{Document, Schema};
use std::sync::Arc;
use tracing::{debug, warn};

/// Persistence collaborator, supplied by the host.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of the collection under migration.
    async fn fetch_all(&self) -> EncryptionResult<Vec<Document>>;

    /// Persists one document's current state.
    async fn persist(&self, doc: &Document) -> EncryptionResult<()>;
}

/// Outcome of a batch run, keyed by document identifier.
#[derive(Clone, Debug, Default)]
pub struct MigrationReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedDocument>,
}

/// A single document the batch could not process.
#[derive(Clone, Debug)]
pub struct FailedDocument {
    pub id: String,
    pub reason: String,
}

impl MigrationReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Records one document outcome. Returns `true` when the batch should
    /// keep going.
    fn record(&mut self, id: String, result: EncryptionResult<()>, fail_fast: bool) -> bool {
        match result {
            Ok(()) => {
                self.succeeded.push(id);
                true
            }
            Err(err) => {
                warn!(id = %id, "migration failed for document: {err}");
                self.failed.push(FailedDocument { id, reason: err.to_string() });
                !fail_fast
            }
        }
    }
}

/// Drives migration batches with an engine whose lifecycle hooks are off.
pub struct Migrator {
    engine: EncryptionEngine,
    fail_fast: bool,
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("fail_fast", &self.fail_fast)
            .finish_non_exhaustive()
    }
}

impl Migrator {
    /// Installs a migration engine over the schema. Lifecycle hooks are
    /// forced off so nothing re-encrypts behind the migration's back.
    pub fn new(schema: Arc<Schema>, options: EncryptionOptions) -> EncryptionResult<Self> {
        let options = EncryptionOptions { run_lifecycle_hooks: false, ..options };
        Ok(Self { engine: EncryptionEngine::install(schema, options)?, fail_fast: false })
    }

    /// Aborts the batch on the first failing document. The failure is still
    /// recorded in the returned report.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// The underlying engine, for driving individual documents manually.
    pub fn engine(&self) -> &EncryptionEngine {
        &self.engine
    }

    /// Brings every document to the current versioned, signed format.
    ///
    /// Already-signed documents are skipped (they have been migrated);
    /// unversioned ciphertext gets the version byte prepended; documents
    /// that were never encrypted go through a full encrypt. Everything
    /// touched is signed and persisted.
    pub async fn migrate_to_current_version(
        &self,
        store: &dyn DocumentStore,
    ) -> EncryptionResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let docs = store.fetch_all().await?;
        debug!(count = docs.len(), "starting format migration");

        for mut doc in docs {
            let id = doc.id_string();
            if doc.auth_code.is_some() {
                debug!(id = %id, "already signed; skipping");
                report.succeeded.push(id);
                continue;
            }
            let result = self.upgrade_document(&mut doc, store).await;
            if !report.record(id, result, self.fail_fast) {
                break;
            }
        }
        Ok(report)
    }

    async fn upgrade_document(
        &self,
        doc: &mut Document,
        store: &dyn DocumentStore,
    ) -> EncryptionResult<()> {
        match doc.ciphertext.take() {
            Some(legacy) => doc.ciphertext = Some(prepend_version(legacy)),
            None => self.engine.encrypt(doc).await?,
        }
        self.engine.sign(doc).await?;
        store.persist(doc).await
    }

    /// Prepends the version byte to unversioned embedded ciphertext under
    /// `field`. Embedded documents are not signed. One-shot: running this
    /// again over already-versioned children would corrupt their envelopes.
    pub async fn migrate_embedded_to_current_version(
        &self,
        store: &dyn DocumentStore,
        field: &str,
    ) -> EncryptionResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let docs = store.fetch_all().await?;
        debug!(count = docs.len(), field, "starting embedded format migration");

        for mut doc in docs {
            let id = doc.id_string();
            let Some(children) = doc.children.get_mut(field) else {
                report.succeeded.push(id);
                continue;
            };
            for child in children.iter_mut() {
                if let Some(legacy) = child.ciphertext.take() {
                    child.ciphertext = Some(prepend_version(legacy));
                }
            }
            let result = store.persist(&doc).await;
            if !report.record(id, result, self.fail_fast) {
                break;
            }
        }
        Ok(report)
    }

    /// Signs and persists every document unconditionally. Bootstraps
    /// authentication on a collection that predates signing entirely.
    pub async fn sign_all_documents(
        &self,
        store: &dyn DocumentStore,
    ) -> EncryptionResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let docs = store.fetch_all().await?;
        debug!(count = docs.len(), "signing all documents");

        for mut doc in docs {
            let id = doc.id_string();
            let result = match self.engine.sign(&mut doc).await {
                Ok(()) => store.persist(&doc).await,
                Err(err) => Err(err),
            };
            if !report.record(id, result, self.fail_fast) {
                break;
            }
        }
        Ok(report)
    }
}

/// Reframes a legacy `[iv][ct]` envelope as `[version][iv][ct]`.
fn prepend_version(legacy: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + legacy.len());
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&legacy);
    out
}
