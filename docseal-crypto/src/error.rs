//! Crypto layer error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors from key handling, ciphering and envelope parsing.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("key material is not valid base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("ciphertext envelope too short ({len} bytes) to hold a version and iv")]
    CiphertextTooShort { len: usize },

    #[error("authentication code is too short and has likely been cut off or modified")]
    AuthCodeTooShort,

    #[error("authentication code carries an unreadable field list")]
    AuthCodeFieldList,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
