//! Cryptographic core for docseal.
//!
//! Provides the primitives the document engine composes:
//! - HMAC-SHA512 key derivation with label separation ([`derive_key`],
//!   [`drop256`], [`KeyMaterial`])
//! - AES-256-CBC with PKCS7 padding ([`encrypt_bytes`], [`decrypt_bytes`])
//! - Truncated HMAC-SHA512 authentication codes with constant-time
//!   verification ([`compute_mac`], [`verify_mac`])
//! - The versioned ciphertext and auth-code envelope formats
//!   ([`CipherEnvelope`], [`MacEnvelope`])
//!
//! Everything here is pure byte-level work: no document model, no I/O, no
//! shared mutable state. Key material is zeroized on drop.

mod cipher;
mod envelope;
mod error;
mod keys;
mod mac;

pub use cipher::{IV_LEN, decrypt_bytes, encrypt_bytes, generate_iv};
pub use envelope::{CipherEnvelope, FORMAT_VERSION, MacEnvelope, VERSION_LEN};
pub use error::{CryptoError, CryptoResult};
pub use keys::{
    ENCRYPTION_KEY_LEN, KeyMaterial, SIGNING_KEY_LEN, derive_key, drop256,
};
pub use mac::{MAC_LEN, compute_mac, verify_mac};
