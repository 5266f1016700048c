//! Versioned envelope formats.
//!
//! Two binary layouts travel through the datastore:
//!
//! ```text
//! ciphertext envelope   [ version(1) ][ iv(16) ][ ciphertext.. ]
//! auth-code envelope    [ version(1) ][ mac(32) ][ field-names JSON.. ]
//! ```
//!
//! Data written before the formats were versioned has no leading version
//! byte; migrations prepend it. Decoding is defensive: an auth-code envelope
//! must at least have room for an empty field list (`"[]"`).

use crate::cipher::IV_LEN;
use crate::error::{CryptoError, CryptoResult};
use crate::mac::MAC_LEN;

/// Current envelope format version.
pub const FORMAT_VERSION: u8 = b'a';

/// Length of the leading version byte.
pub const VERSION_LEN: usize = 1;

/// A parsed ciphertext envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherEnvelope {
    pub version: u8,
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

impl CipherEnvelope {
    /// Minimum encoded length: version + iv.
    pub const MIN_LEN: usize = VERSION_LEN + IV_LEN;

    /// Wraps freshly produced ciphertext at the current version.
    pub fn new(iv: [u8; IV_LEN], ciphertext: Vec<u8>) -> Self {
        Self { version: FORMAT_VERSION, iv, ciphertext }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VERSION_LEN + IV_LEN + self.ciphertext.len());
        out.push(self.version);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    pub fn decode(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < Self::MIN_LEN {
            return Err(CryptoError::CiphertextTooShort { len: bytes.len() });
        }
        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[VERSION_LEN..VERSION_LEN + IV_LEN]);
        Ok(Self {
            version: bytes[0],
            iv,
            ciphertext: bytes[VERSION_LEN + IV_LEN..].to_vec(),
        })
    }
}

/// A parsed authentication-code envelope. The field-name list records which
/// fields the stored code covers, so verification stays valid across
/// configuration changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacEnvelope {
    pub version: u8,
    pub mac: [u8; MAC_LEN],
    pub fields: Vec<String>,
}

impl MacEnvelope {
    /// Minimum encoded length: version + mac + `"[]"`.
    pub const MIN_LEN: usize = VERSION_LEN + MAC_LEN + 2;

    /// Wraps a freshly computed code at the current version.
    pub fn new(mac: [u8; MAC_LEN], fields: Vec<String>) -> Self {
        Self { version: FORMAT_VERSION, mac, fields }
    }

    pub fn encode(&self) -> CryptoResult<Vec<u8>> {
        let field_json = serde_json::to_vec(&self.fields)?;
        let mut out = Vec::with_capacity(VERSION_LEN + MAC_LEN + field_json.len());
        out.push(self.version);
        out.extend_from_slice(&self.mac);
        out.extend_from_slice(&field_json);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() < Self::MIN_LEN {
            return Err(CryptoError::AuthCodeTooShort);
        }
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&bytes[VERSION_LEN..VERSION_LEN + MAC_LEN]);
        let fields = serde_json::from_slice(&bytes[VERSION_LEN + MAC_LEN..])
            .map_err(|_| CryptoError::AuthCodeFieldList)?;
        Ok(Self { version: bytes[0], mac, fields })
    }
}
