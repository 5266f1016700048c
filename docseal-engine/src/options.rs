//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for installing an [`EncryptionEngine`] over a schema.
///
/// Key material is supplied either as a single `secret` (from which both
/// operational keys are derived) or as both pre-derived keys in base64 —
/// never both, never neither.
///
/// [`EncryptionEngine`]: crate::EncryptionEngine
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionOptions {
    /// Secret from which the encryption and signing keys are derived.
    pub secret: Option<String>,

    /// Pre-derived 32-byte encryption key, base64-encoded.
    pub encryption_key: Option<String>,

    /// Pre-derived 64-byte signing key, base64-encoded.
    pub signing_key: Option<String>,

    /// Fields to encrypt. Defaults to every declared non-indexed field other
    /// than the identifier and the reserved envelope fields.
    pub encrypted_fields: Option<Vec<String>>,

    /// Fields to leave out of default encryption.
    pub exclude_from_encryption: Vec<String>,

    /// Fields to authenticate beyond the identifier and ciphertext, which
    /// are always authenticated.
    pub additional_authenticated_fields: Vec<String>,

    /// Whether a document with no authentication code fails authentication.
    ///
    /// Turning this off is a backward-compatibility escape hatch for data
    /// written before signing existed: such documents pass silently and get
    /// no tamper detection at all. Leave it on unless running a migration.
    pub require_authentication_code: bool,

    /// Whether to decrypt the in-memory document back to plaintext right
    /// after persisting. Turning this off is faster for write-heavy paths
    /// that do not read the values back, but leaves the caller holding the
    /// encrypted representation.
    pub decrypt_after_persist: bool,

    /// Overrides the collection identifier bound into authentication codes.
    /// Set this to the original model name if the schema is ever renamed.
    pub collection_id: Option<String>,

    /// Whether the lifecycle transition functions are active. Migrations
    /// install with this off and drive the engine methods directly.
    pub run_lifecycle_hooks: bool,
}

impl Default for EncryptionOptions {
    fn default() -> Self {
        Self {
            secret: None,
            encryption_key: None,
            signing_key: None,
            encrypted_fields: None,
            exclude_from_encryption: Vec::new(),
            additional_authenticated_fields: Vec::new(),
            require_authentication_code: true,
            decrypt_after_persist: true,
            collection_id: None,
            run_lifecycle_hooks: true,
        }
    }
}

impl EncryptionOptions {
    /// Options with a derivation secret and everything else defaulted.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self { secret: Some(secret.into()), ..Self::default() }
    }
}
