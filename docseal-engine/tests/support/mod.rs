#![allow(dead_code)]

use docseal_engine::{EncryptionEngine, EncryptionOptions};
use docseal_types::{Document, FieldSpec, Projection, Schema};
use serde_json::json;
use std::sync::Arc;

/// A fresh schema per call so the one-install guard never trips across tests.
pub fn note_schema() -> Arc<Schema> {
    Arc::new(Schema::new(
        "notes",
        vec![
            FieldSpec::plain("_id"),
            FieldSpec::plain("text"),
            FieldSpec::plain("flag"),
            FieldSpec::plain("owner.email"),
            FieldSpec::indexed("slug"),
        ],
    ))
}

pub fn engine_with(options: EncryptionOptions) -> EncryptionEngine {
    EncryptionEngine::install(note_schema(), options).unwrap()
}

pub fn default_engine() -> EncryptionEngine {
    engine_with(EncryptionOptions::with_secret("test secret"))
}

pub fn new_note(id: &str) -> Document {
    Document::new(json!({
        "_id": id,
        "text": "hello",
        "flag": true,
        "owner": {"email": "a@b.c"},
        "slug": "hello-slug",
    }))
}

/// Simulates a storage round trip: the persisted representation comes back
/// as a freshly loaded document under `projection`. Unselected top-level
/// fields and envelopes are absent, as a projected read would leave them.
pub fn reload(doc: &Document, projection: Projection) -> Document {
    let mut data = doc.data.clone();
    if let Some(map) = data.as_object_mut() {
        map.retain(|key, _| projection.is_selected(key));
    }
    let mut loaded = Document::loaded(data, projection.clone());
    if projection.is_selected("_ct") {
        loaded.ciphertext = doc.ciphertext.clone();
    }
    if projection.is_selected("_ac") {
        loaded.auth_code = doc.auth_code.clone();
    }
    loaded
}
