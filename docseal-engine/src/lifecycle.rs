//! Lifecycle transitions.
//!
//! The host document framework wires these into its load/save hooks; the
//! functions themselves are pure document transformations. Ordering within a
//! document is fixed — encrypt completes before sign on the way out,
//! authentication completes before decrypt on the way in — while different
//! documents are fully independent.
//!
//! All transitions are inert when the engine was installed with
//! `run_lifecycle_hooks` off (the migration configuration).

use crate::engine::{EncryptionEngine, SelectionState};
use crate::error::{EncryptionError, EncryptionResult};
use docseal_types::{CIPHERTEXT_FIELD, Document};
use tracing::{debug, error};

impl EncryptionEngine {
    /// Runs before a document is persisted.
    ///
    /// New documents, and documents re-saved while still packed, are
    /// encrypted. Top-level documents are then signed when every
    /// authenticated field is at hand (always true for new documents).
    /// Embedded documents are never self-signed: a signature failure on a
    /// child cannot be surfaced during the container's synchronous load, so
    /// authenticating children is the parent's responsibility if required.
    pub async fn before_save(&self, doc: &mut Document) -> EncryptionResult<()> {
        if !self.run_lifecycle_hooks {
            return Ok(());
        }

        if doc.is_new() || doc.is_selected(CIPHERTEXT_FIELD) {
            self.encrypt(doc).await?;
            if (doc.is_new() || self.selection_state(doc) == SelectionState::Full)
                && !doc.is_embedded()
            {
                self.sign(doc).await?;
            }
            return Ok(());
        }

        if self.selection_state(doc) == SelectionState::Full && !doc.is_embedded() {
            self.sign(doc).await?;
        }
        Ok(())
    }

    /// Runs after a document is persisted.
    ///
    /// With `decrypt_after_persist` on, the in-memory document is unpacked
    /// back to plaintext so application code sees its values immediately,
    /// and embedded children are unpacked along with it. With it off the
    /// caller keeps the encrypted representation and must decrypt
    /// explicitly before use.
    pub async fn after_save(&self, doc: &mut Document) -> EncryptionResult<()> {
        doc.mark_persisted();
        if !self.run_lifecycle_hooks || !self.decrypt_after_persist || doc.is_embedded() {
            return Ok(());
        }
        self.decrypt_sync(doc)?;
        self.decrypt_embedded(doc)
    }

    /// Runs when a document is reconstructed from storage, before the
    /// application sees it.
    ///
    /// Top-level documents resolve the partial-selection rule first: a
    /// projection covering every authenticated field authenticates, one
    /// covering none skips (nothing authenticated is exposed), and a mix
    /// fails the load — partial authentication would be a false guarantee.
    /// Decryption follows iff the ciphertext field was selected.
    ///
    /// Embedded documents only decrypt, synchronously and in place. The
    /// surrounding framework may swallow errors raised during nested
    /// construction, so failures are logged here before being returned.
    pub fn on_load(&self, doc: &mut Document) -> EncryptionResult<()> {
        if !self.run_lifecycle_hooks {
            return Ok(());
        }

        if doc.is_embedded() {
            return self.decrypt_sync(doc).inspect_err(|err| {
                error!(
                    id = %doc.id_string(),
                    "failed to decrypt embedded document during load: {err}"
                );
            });
        }

        match self.selection_state(doc) {
            SelectionState::Full => self.authenticate_sync(doc, None)?,
            SelectionState::Empty => {}
            SelectionState::Mixed => {
                return Err(EncryptionError::PartialSelection {
                    fields: self.policy().fields_to_check.clone(),
                });
            }
        }

        if doc.is_selected(CIPHERTEXT_FIELD) {
            self.decrypt_sync(doc)?;
        }
        Ok(())
    }

    /// Synchronously decrypts every embedded child document under the fields
    /// with a registered child engine. Useful standalone for containers
    /// whose children are encrypted while the container itself is not.
    pub fn decrypt_embedded(&self, doc: &mut Document) -> EncryptionResult<()> {
        for (field, children) in doc.children.iter_mut() {
            let Some(engine) = self.child_engines.get(field) else {
                if !children.is_empty() {
                    debug!(
                        field = %field,
                        "no child engine registered; leaving embedded documents packed"
                    );
                }
                continue;
            };
            for child in children.iter_mut() {
                engine.decrypt_sync(child)?;
            }
        }
        Ok(())
    }
}
