//! The document model.
//!
//! A [`Document`] is a loosely typed record: a JSON object of named fields
//! plus two reserved envelope slots the engine manages. The envelopes are
//! held as typed byte buffers rather than JSON fields so a document can never
//! hold half-parsed envelope data, and so clearing them is unambiguous.
//!
//! Embedded child documents live under [`Document::children`], keyed by the
//! parent field that contains them. Children carry their own envelopes.

use crate::binary::Binary;
use crate::path;
use crate::projection::Projection;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved field holding the ciphertext envelope in persisted form.
pub const CIPHERTEXT_FIELD: &str = "_ct";

/// Reserved field holding the authentication-code envelope in persisted form.
pub const AUTH_CODE_FIELD: &str = "_ac";

/// The document identifier field.
pub const ID_FIELD: &str = "_id";

/// A structured record with named (possibly nested) fields.
#[derive(Clone, Debug)]
pub struct Document {
    /// Plaintext field map. Always a JSON object.
    pub data: Value,
    /// Ciphertext envelope, present iff the encrypted fields are packed.
    pub ciphertext: Option<Vec<u8>>,
    /// Authentication-code envelope, present iff the document is signed.
    pub auth_code: Option<Vec<u8>>,
    /// Embedded child documents, keyed by the containing field name.
    pub children: BTreeMap<String, Vec<Document>>,
    is_new: bool,
    embedded: bool,
    projection: Projection,
}

impl Document {
    /// A newly created (never persisted) document.
    pub fn new(data: Value) -> Self {
        Self {
            data: ensure_object(data),
            ciphertext: None,
            auth_code: None,
            children: BTreeMap::new(),
            is_new: true,
            embedded: false,
            projection: Projection::All,
        }
    }

    /// A document reconstructed from storage under the given projection.
    pub fn loaded(data: Value, projection: Projection) -> Self {
        Self {
            data: ensure_object(data),
            ciphertext: None,
            auth_code: None,
            children: BTreeMap::new(),
            is_new: false,
            embedded: false,
            projection,
        }
    }

    /// An embedded (sub-)document reconstructed inside a parent.
    pub fn loaded_embedded(data: Value) -> Self {
        let mut doc = Self::loaded(data, Projection::All);
        doc.embedded = true;
        doc
    }

    /// Whether this document has never been persisted.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Marks the document as persisted. Called by the lifecycle after a save.
    pub fn mark_persisted(&mut self) {
        self.is_new = false;
    }

    /// Whether this instance is an embedded (sub-)document.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// The projection this document was loaded under.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Whether the given path was selected by the originating query.
    /// The envelope fields answer from their typed slots when asked directly.
    pub fn is_selected(&self, field: &str) -> bool {
        self.projection.is_selected(field)
    }

    /// Reads a field by dotted path.
    pub fn get(&self, field: &str) -> Option<&Value> {
        path::get_path(&self.data, field)
    }

    /// Writes a field by dotted path, creating intermediate objects.
    pub fn set(&mut self, field: &str, value: Value) {
        path::set_path(&mut self.data, field, value);
    }

    /// Removes a field's in-memory value by dotted path.
    pub fn clear_field(&mut self, field: &str) {
        path::remove_path(&mut self.data, field);
    }

    /// The identifier value, when present.
    pub fn id(&self) -> Option<&Value> {
        self.get(ID_FIELD)
    }

    /// The identifier rendered for diagnostics; `"unknown"` when absent.
    pub fn id_string(&self) -> String {
        match self.id() {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "unknown".to_string(),
        }
    }

    /// Renders the full persisted form of the document: the field map with
    /// the envelope fields as tagged binary values and children as arrays.
    /// This is the representation authentication operates over.
    pub fn to_value(&self) -> Value {
        let mut out = self.data.clone();
        if let Some(ct) = &self.ciphertext {
            path::set_path(&mut out, CIPHERTEXT_FIELD, Binary(ct.clone()).to_value());
        }
        if let Some(ac) = &self.auth_code {
            path::set_path(&mut out, AUTH_CODE_FIELD, Binary(ac.clone()).to_value());
        }
        for (field, children) in &self.children {
            let rendered: Vec<Value> = children.iter().map(Document::to_value).collect();
            path::set_path(&mut out, field, Value::Array(rendered));
        }
        out
    }
}

fn ensure_object(data: Value) -> Value {
    if data.is_object() {
        data
    } else {
        Value::Object(Map::new())
    }
}
