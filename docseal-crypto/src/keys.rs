//! Key derivation and key material.
//!
//! Two operational keys drive the whole layer: a 32-byte encryption key and a
//! 64-byte signing key. Both can be derived from one secret via independent
//! HMAC-SHA512 derivations with distinct context labels, or supplied
//! pre-derived as base64 with strict length validation.

use crate::error::{CryptoError, CryptoResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha512 = Hmac<Sha512>;

/// Encryption key length (AES-256).
pub const ENCRYPTION_KEY_LEN: usize = 32;

/// Signing key length (HMAC-SHA512).
pub const SIGNING_KEY_LEN: usize = 64;

/// Context label for deriving the encryption key.
const ENCRYPTION_LABEL: &str = "enc";

/// Context label for deriving the signing key.
const SIGNING_LABEL: &str = "sig";

/// Derives a 64-byte key from a secret: HMAC-SHA512 over `label`, keyed by
/// `secret`. Distinct labels yield independent keys.
pub fn derive_key(secret: &str, label: &str) -> [u8; SIGNING_KEY_LEN] {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(label.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut out = [0u8; SIGNING_KEY_LEN];
    out.copy_from_slice(&digest);
    out
}

/// Truncates a 64-byte buffer to its first 32 bytes, zeroing the full source
/// in place so the discarded half does not linger in memory.
pub fn drop256(buf: &mut [u8; SIGNING_KEY_LEN]) -> [u8; ENCRYPTION_KEY_LEN] {
    let mut out = [0u8; ENCRYPTION_KEY_LEN];
    out.copy_from_slice(&buf[..ENCRYPTION_KEY_LEN]);
    buf.zeroize();
    out
}

/// The two operational keys, created once at install time and held read-only
/// for the schema's lifetime. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    encryption_key: [u8; ENCRYPTION_KEY_LEN],
    signing_key: [u8; SIGNING_KEY_LEN],
}

impl KeyMaterial {
    /// Derives both keys from a single secret.
    pub fn derive(secret: &str) -> Self {
        let mut full = derive_key(secret, ENCRYPTION_LABEL);
        let encryption_key = drop256(&mut full);
        let signing_key = derive_key(secret, SIGNING_LABEL);
        Self { encryption_key, signing_key }
    }

    /// Accepts pre-derived keys as base64, validating decoded lengths.
    pub fn from_base64(encryption_key: &str, signing_key: &str) -> CryptoResult<Self> {
        let enc = BASE64.decode(encryption_key)?;
        if enc.len() != ENCRYPTION_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: ENCRYPTION_KEY_LEN,
                actual: enc.len(),
            });
        }
        let sig = BASE64.decode(signing_key)?;
        if sig.len() != SIGNING_KEY_LEN {
            return Err(CryptoError::InvalidKeyLength {
                expected: SIGNING_KEY_LEN,
                actual: sig.len(),
            });
        }

        let mut encryption_key = [0u8; ENCRYPTION_KEY_LEN];
        encryption_key.copy_from_slice(&enc);
        let mut signing_key = [0u8; SIGNING_KEY_LEN];
        signing_key.copy_from_slice(&sig);
        Ok(Self { encryption_key, signing_key })
    }

    pub fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_LEN] {
        &self.encryption_key
    }

    pub fn signing_key(&self) -> &[u8; SIGNING_KEY_LEN] {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("encryption_key", &"[redacted]")
            .field("signing_key", &"[redacted]")
            .finish()
    }
}
