//! AES-256-CBC with PKCS7 padding.
//!
//! CBC with a detached HMAC is what the stored data format requires; nothing
//! here authenticates the ciphertext. Each encryption draws a fresh random
//! IV from the OS — reusing an IV under the same key breaks confidentiality
//! for this mode.

use crate::error::{CryptoError, CryptoResult};
use crate::keys::ENCRYPTION_KEY_LEN;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::{RngCore, rngs::OsRng};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// IV length for AES-CBC.
pub const IV_LEN: usize = 16;

/// Draws a fresh random IV from the OS entropy source.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypts `plaintext` under `key`/`iv`. Output length is the plaintext
/// length rounded up to the next block boundary (PKCS7 always pads).
pub fn encrypt_bytes(
    key: &[u8; ENCRYPTION_KEY_LEN],
    iv: &[u8; IV_LEN],
    plaintext: &[u8],
) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypts ciphertext produced by [`encrypt_bytes`]. A wrong key, wrong IV
/// or corrupted ciphertext surfaces as a padding failure.
pub fn decrypt_bytes(
    key: &[u8; ENCRYPTION_KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> CryptoResult<Vec<u8>> {
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption("bad padding or corrupted ciphertext".to_string()))
}
