//! Keyed message authentication.
//!
//! The authentication code is HMAC-SHA512 truncated to its first 256 bits,
//! computed over the collection id, the format version byte, the canonical
//! JSON of the authenticated field subset, and the JSON of the field-name
//! list. Canonical here means object keys serialize in a fixed sorted order;
//! `serde_json` maps are BTreeMap-backed (the `preserve_order` feature is not
//! enabled anywhere in this workspace), so structurally equal objects always
//! produce byte-identical JSON.

use crate::keys::{SIGNING_KEY_LEN, drop256};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

type HmacSha512 = Hmac<Sha512>;

/// Authentication code length: HMAC-SHA512 truncated to 256 bits.
pub const MAC_LEN: usize = 32;

/// Computes the truncated authentication code. The full 512-bit digest is
/// zeroed after truncation.
pub fn compute_mac(
    signing_key: &[u8; SIGNING_KEY_LEN],
    collection_id: &str,
    version: u8,
    payload_json: &[u8],
    field_list_json: &[u8],
) -> [u8; MAC_LEN] {
    let mut mac = HmacSha512::new_from_slice(signing_key)
        .expect("hmac accepts keys of any length");
    mac.update(collection_id.as_bytes());
    mac.update(&[version]);
    mac.update(payload_json);
    mac.update(field_list_json);
    let digest = mac.finalize().into_bytes();

    let mut full = [0u8; SIGNING_KEY_LEN];
    full.copy_from_slice(&digest);
    drop256(&mut full)
}

/// Constant-time comparison of an expected code against a stored one.
/// Never short-circuits on the first differing byte; a length mismatch is
/// simply unequal.
pub fn verify_mac(expected: &[u8; MAC_LEN], stored: &[u8]) -> bool {
    expected.as_slice().ct_eq(stored).into()
}
