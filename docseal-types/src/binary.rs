//! Tagged binary values.
//!
//! JSON has no byte-string type, so binary field values cross the
//! serialization boundary as a tagged wrapper object:
//!
//! ```json
//! {"type": "Binary", "data": [104, 105]}
//! ```
//!
//! [`Binary`] produces that shape; [`unwrap_tagged`] is the decode-side rule:
//! a decrypted field value matching the shape is reconstructed as the raw
//! byte array rather than being assigned the wrapper object itself.

use serde_json::{Value, json};

/// Tag discriminating a serialized binary value from an ordinary object.
pub const BINARY_TAG: &str = "Binary";

/// A binary field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    /// Renders the tagged wrapper shape for embedding in a document.
    pub fn to_value(&self) -> Value {
        json!({"type": BINARY_TAG, "data": self.0})
    }

    /// Parses a tagged wrapper back into bytes. Returns `None` for values of
    /// any other shape, including byte arrays that never had the tag.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        if obj.len() != 2 || obj.get("type")?.as_str()? != BINARY_TAG {
            return None;
        }
        let data = obj.get("data")?.as_array()?;
        let bytes = data
            .iter()
            .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()?;
        Some(Binary(bytes))
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Self {
        Binary(bytes)
    }
}

/// Applies the decode-side rule: a value of the tagged wrapper shape becomes
/// the raw byte array; anything else passes through unchanged.
pub fn unwrap_tagged(value: Value) -> Value {
    match Binary::from_value(&value) {
        Some(binary) => Value::from(binary.0),
        None => value,
    }
}
