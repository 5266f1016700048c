//! The encryption/authentication engine.
//!
//! One engine is installed per schema and holds that schema's key material
//! (a capability constructed once at install time, passed explicitly — never
//! ambient state) plus the resolved field policy. Every operation is
//! stateless per call, so a single engine serves unbounded concurrent
//! documents.
//!
//! `decrypt`/`authenticate` have synchronous twins sharing one
//! implementation: embedded documents are processed inside the host
//! framework's synchronous traversal, which cannot suspend.

use crate::error::{EncryptionError, EncryptionResult};
use crate::options::EncryptionOptions;
use crate::policy::FieldPolicy;
use docseal_crypto::{
    CipherEnvelope, KeyMaterial, MacEnvelope, compute_mac, decrypt_bytes, encrypt_bytes,
    generate_iv, verify_mac,
};
use docseal_types::{
    AUTH_CODE_FIELD, Document, ID_FIELD, Schema, get_path, pick, unwrap_tagged,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How a projection relates to the authenticated field set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SelectionState {
    /// Every authenticated field (and the auth code) was selected.
    Full,
    /// No authenticated field was selected.
    Empty,
    /// Some but not all — authentication cannot be evaluated meaningfully.
    Mixed,
}

/// Document-level encryption and authentication over one schema.
pub struct EncryptionEngine {
    schema: Arc<Schema>,
    keys: KeyMaterial,
    policy: FieldPolicy,
    collection_id: Option<String>,
    require_authentication_code: bool,
    pub(crate) decrypt_after_persist: bool,
    pub(crate) run_lifecycle_hooks: bool,
    pub(crate) child_engines: BTreeMap<String, Arc<EncryptionEngine>>,
}

impl std::fmt::Debug for EncryptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionEngine")
            .field("keys", &"[redacted]")
            .field("collection_id", &self.collection_id)
            .field("require_authentication_code", &self.require_authentication_code)
            .field("decrypt_after_persist", &self.decrypt_after_persist)
            .field("run_lifecycle_hooks", &self.run_lifecycle_hooks)
            .field("child_engines", &self.child_engines.keys())
            .finish_non_exhaustive()
    }
}

impl EncryptionEngine {
    /// Installs the engine over a schema: validates key material, resolves
    /// the field policy, and trips the schema's one-install guard.
    pub fn install(schema: Arc<Schema>, options: EncryptionOptions) -> EncryptionResult<Self> {
        let keys = resolve_keys(&options)?;
        let policy = FieldPolicy::resolve(&schema, &options)?;

        if !schema.try_mark_installed() {
            return Err(EncryptionError::Config(
                "the encryption engine can only be installed once per schema; \
                 for migrations, install a migration engine on a schema without \
                 the standard engine"
                    .to_string(),
            ));
        }

        Ok(Self {
            schema,
            keys,
            policy,
            collection_id: options.collection_id,
            require_authentication_code: options.require_authentication_code,
            decrypt_after_persist: options.decrypt_after_persist,
            run_lifecycle_hooks: options.run_lifecycle_hooks,
            child_engines: BTreeMap::new(),
        })
    }

    /// Registers the engine governing embedded documents under `field`.
    /// Children under unregistered fields are never touched: the parent's
    /// field policy does not describe them, and decrypting with the wrong
    /// policy would drop data.
    pub fn with_child_engine(
        mut self,
        field: impl Into<String>,
        engine: Arc<EncryptionEngine>,
    ) -> Self {
        self.child_engines.insert(field.into(), engine);
        self
    }

    /// The resolved field policy.
    pub fn policy(&self) -> &FieldPolicy {
        &self.policy
    }

    /// The schema this engine is installed over.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Packs the configured plaintext fields into a fresh ciphertext
    /// envelope and clears them from the in-memory document.
    ///
    /// Fails if the document already carries ciphertext: encrypting again
    /// would silently discard the previously packed plaintext.
    pub async fn encrypt(&self, doc: &mut Document) -> EncryptionResult<()> {
        if doc.ciphertext.is_some() {
            return Err(EncryptionError::AlreadyEncrypted);
        }

        let iv = generate_iv();
        let subset = pick(&doc.data, &self.policy.encrypted_fields);
        let plaintext = serde_json::to_vec(&subset)?;
        let ciphertext = encrypt_bytes(self.keys.encryption_key(), &iv, &plaintext);
        doc.ciphertext = Some(CipherEnvelope::new(iv, ciphertext).encode());

        for field in &self.policy.encrypted_fields {
            doc.clear_field(field);
        }
        Ok(())
    }

    /// Suspension-capable variant of [`decrypt_sync`](Self::decrypt_sync).
    pub async fn decrypt(&self, doc: &mut Document) -> EncryptionResult<()> {
        self.decrypt_sync(doc)
    }

    /// Unpacks the ciphertext envelope back into plaintext fields, then
    /// clears both envelopes from the in-memory document. A document without
    /// ciphertext is left untouched, so repeated calls are idempotent.
    ///
    /// The caller is expected to have authenticated first: clearing the auth
    /// code here ends the envelope's in-memory lifetime.
    pub fn decrypt_sync(&self, doc: &mut Document) -> EncryptionResult<()> {
        let Some(bytes) = doc.ciphertext.as_deref() else {
            return Ok(());
        };

        let envelope = CipherEnvelope::decode(bytes)?;
        let plaintext = decrypt_bytes(self.keys.encryption_key(), &envelope.iv, &envelope.ciphertext)
            .map_err(|err| EncryptionError::DecryptParse {
                id: doc.id_string(),
                reason: err.to_string(),
            })?;
        let decrypted: Value =
            serde_json::from_slice(&plaintext).map_err(|err| EncryptionError::DecryptParse {
                id: doc.id_string(),
                reason: err.to_string(),
            })?;

        for field in &self.policy.encrypted_fields {
            if let Some(value) = get_path(&decrypted, field) {
                doc.set(field, unwrap_tagged(value.clone()));
            }
        }

        doc.ciphertext = None;
        doc.auth_code = None;
        Ok(())
    }

    /// Computes the authentication code over the configured field list at
    /// the current format version and stores the auth-code envelope.
    pub async fn sign(&self, doc: &mut Document) -> EncryptionResult<()> {
        let mac = self.mac_for(
            doc,
            &self.policy.authenticated_fields,
            docseal_crypto::FORMAT_VERSION,
            None,
        )?;
        let envelope = MacEnvelope::new(mac, self.policy.authenticated_fields.clone());
        doc.auth_code = Some(envelope.encode()?);
        Ok(())
    }

    /// Suspension-capable variant of [`authenticate_sync`](Self::authenticate_sync).
    pub async fn authenticate(&self, doc: &mut Document) -> EncryptionResult<()> {
        self.authenticate_sync(doc, None)
    }

    /// Verifies the stored authentication code and clears it on success.
    ///
    /// Verification recomputes the code over the field list and version
    /// *recorded in the envelope*, not the live configuration, so data
    /// signed under an older field configuration still verifies as long as
    /// the envelope is internally consistent. Comparison is constant-time.
    ///
    /// A missing code is an error only under `require_authentication_code`;
    /// with that policy off, unsigned legacy documents pass silently — and
    /// get no tamper detection.
    pub fn authenticate_sync(
        &self,
        doc: &mut Document,
        collection_override: Option<&str>,
    ) -> EncryptionResult<()> {
        let Some(bytes) = doc.auth_code.as_deref() else {
            if self.require_authentication_code {
                return Err(EncryptionError::AuthCodeMissing);
            }
            return Ok(());
        };

        let envelope = MacEnvelope::decode(bytes)?;
        let expected =
            self.mac_for(doc, &envelope.fields, envelope.version, collection_override)?;
        if !verify_mac(&expected, &envelope.mac) {
            return Err(EncryptionError::AuthFailed);
        }

        doc.auth_code = None;
        Ok(())
    }

    /// Computes the truncated code binding collection id, version, the
    /// canonical JSON of the picked field subset, and the field list itself.
    fn mac_for(
        &self,
        doc: &Document,
        fields: &[String],
        version: u8,
        collection_override: Option<&str>,
    ) -> EncryptionResult<[u8; docseal_crypto::MAC_LEN]> {
        if !fields.iter().any(|f| f == ID_FIELD) {
            return Err(EncryptionError::Config(
                "_id must be among the fields to authenticate".to_string(),
            ));
        }
        if fields.iter().any(|f| f == AUTH_CODE_FIELD) {
            return Err(EncryptionError::Config(
                "_ac cannot authenticate itself".to_string(),
            ));
        }

        let collection_id = collection_override
            .or(self.collection_id.as_deref())
            .or(self.schema.collection())
            .ok_or(EncryptionError::MissingCollectionId)?;

        let subset = pick(&doc.to_value(), fields);
        let payload = serde_json::to_vec(&subset)?;
        let field_list = serde_json::to_vec(fields)?;

        Ok(compute_mac(
            self.keys.signing_key(),
            collection_id,
            version,
            &payload,
            &field_list,
        ))
    }

    /// Classifies the document's projection against the authenticated field
    /// set. `fields_to_check` is never empty (it always holds `_ct` and
    /// `_ac`), so the fold below is total.
    pub(crate) fn selection_state(&self, doc: &Document) -> SelectionState {
        let mut selected = 0usize;
        for field in &self.policy.fields_to_check {
            if doc.is_selected(field) {
                selected += 1;
            }
        }
        if selected == self.policy.fields_to_check.len() {
            SelectionState::Full
        } else if selected == 0 {
            SelectionState::Empty
        } else {
            SelectionState::Mixed
        }
    }
}

/// Applies the key-material configuration rules: a secret XOR both explicit
/// keys, strict lengths on the explicit path.
fn resolve_keys(options: &EncryptionOptions) -> EncryptionResult<KeyMaterial> {
    match (&options.secret, &options.encryption_key, &options.signing_key) {
        (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(EncryptionError::Config(
            "if secret is used, encryption_key and signing_key must not be included".to_string(),
        )),
        (Some(secret), None, None) => Ok(KeyMaterial::derive(secret)),
        (None, Some(enc), Some(sig)) => Ok(KeyMaterial::from_base64(enc, sig)?),
        _ => Err(EncryptionError::Config(
            "must provide either secret or both encryption_key and signing_key".to_string(),
        )),
    }
}
