//! Engine error types.

use docseal_crypto::CryptoError;
use thiserror::Error;

/// Result type for engine operations.
pub type EncryptionResult<T> = Result<T, EncryptionError>;

/// Errors from installation, encryption, authentication and migration.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// Fatal install-time problems: conflicting or missing key material,
    /// malformed field names, duplicate installation.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("encrypt failed: document already contains ciphertext")]
    AlreadyEncrypted,

    /// Ciphertext decrypted but did not parse, or decryption itself failed.
    /// Carries the document identifier for diagnostics.
    #[error("error parsing JSON during decrypt of {id}: {reason}")]
    DecryptParse { id: String, reason: String },

    #[error("authentication code missing")]
    AuthCodeMissing,

    /// Tamper detected. Deliberately silent about which byte differed.
    #[error("authentication failed")]
    AuthFailed,

    #[error(
        "only some authenticated fields were selected by the query; select either all or none of {fields:?}"
    )]
    PartialSelection { fields: Vec<String> },

    #[error(
        "each collection must have a unique id for authentication; set the collection_id option or name the schema's collection"
    )]
    MissingCollectionId,

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reported by the host's persistence collaborator.
    #[error("persistence error: {0}")]
    Store(String),
}
