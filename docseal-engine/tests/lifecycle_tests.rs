mod support;

use docseal_engine::{EncryptionEngine, EncryptionError, EncryptionOptions};
use docseal_types::{Document, Projection};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use support::{default_engine, engine_with, new_note, reload};

#[tokio::test]
async fn before_save_encrypts_and_signs_new_documents() {
    let engine = default_engine();
    let mut doc = new_note("note-1");

    engine.before_save(&mut doc).await.unwrap();

    assert!(doc.ciphertext.is_some());
    assert!(doc.auth_code.is_some());
    assert_eq!(doc.get("text"), None);
}

#[tokio::test]
async fn before_save_never_signs_embedded_documents() {
    let engine = default_engine();
    let mut child = Document::loaded_embedded(json!({"_id": "child-1", "text": "inner"}));

    engine.before_save(&mut child).await.unwrap();

    assert!(child.ciphertext.is_some());
    assert!(child.auth_code.is_none());
}

#[tokio::test]
async fn after_save_returns_plaintext_to_the_application() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    let original = doc.data.clone();

    engine.before_save(&mut doc).await.unwrap();
    engine.after_save(&mut doc).await.unwrap();

    assert_eq!(doc.data, original);
    assert!(!doc.is_new());
    assert!(doc.ciphertext.is_none());
    assert!(doc.auth_code.is_none());
}

#[tokio::test]
async fn after_save_can_leave_the_document_packed() {
    let mut options = EncryptionOptions::with_secret("test secret");
    options.decrypt_after_persist = false;
    let engine = engine_with(options);
    let mut doc = new_note("note-1");

    engine.before_save(&mut doc).await.unwrap();
    engine.after_save(&mut doc).await.unwrap();

    assert!(doc.ciphertext.is_some());
    assert_eq!(doc.get("text"), None);
    // the caller must decrypt explicitly before use
    engine.decrypt_sync(&mut doc).unwrap();
    assert_eq!(doc.get("text"), Some(&json!("hello")));
}

#[tokio::test]
async fn after_save_decrypts_embedded_children() {
    let child_engine = Arc::new(default_engine());
    let engine = default_engine().with_child_engine("items", Arc::clone(&child_engine));

    let mut child = Document::loaded_embedded(json!({"_id": "child-1", "text": "inner"}));
    child_engine.encrypt(&mut child).await.unwrap();

    let mut parent = new_note("parent-1");
    parent.children.insert("items".to_string(), vec![child]);

    engine.before_save(&mut parent).await.unwrap();
    engine.after_save(&mut parent).await.unwrap();

    let restored = &parent.children["items"][0];
    assert_eq!(restored.get("text"), Some(&json!("inner")));
    assert!(restored.ciphertext.is_none());
}

#[tokio::test]
async fn on_load_authenticates_then_decrypts_fully_selected_documents() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    let original = doc.data.clone();

    engine.before_save(&mut doc).await.unwrap();
    let mut loaded = reload(&doc, Projection::All);

    engine.on_load(&mut loaded).unwrap();

    assert_eq!(loaded.data, original);
    assert!(loaded.ciphertext.is_none());
    assert!(loaded.auth_code.is_none());
}

#[tokio::test]
async fn on_load_accepts_a_projection_of_exactly_the_authenticated_fields() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();

    let mut loaded = reload(&doc, Projection::include(["_ct", "_ac"]));
    engine.on_load(&mut loaded).unwrap();

    // decrypted, because the ciphertext field was selected
    assert_eq!(loaded.get("text"), Some(&json!("hello")));
}

#[tokio::test]
async fn on_load_rejects_partially_selected_authenticated_fields() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();

    for partial in [Projection::include(["_ct"]), Projection::include(["_ac"])] {
        let mut loaded = reload(&doc, partial);
        let err = engine.on_load(&mut loaded).unwrap_err();
        assert!(matches!(err, EncryptionError::PartialSelection { .. }));
    }
}

#[tokio::test]
async fn on_load_skips_authentication_when_nothing_authenticated_was_selected() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();

    let mut loaded = reload(&doc, Projection::include(["slug"]));
    engine.on_load(&mut loaded).unwrap();

    assert_eq!(loaded.get("slug"), Some(&json!("hello-slug")));
    assert_eq!(loaded.get("text"), None);
}

#[tokio::test]
async fn on_load_exclusion_projections_behave_like_inclusion() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();

    // excluding an unrelated field still selects every authenticated field
    let mut loaded = reload(&doc, Projection::exclude(["slug"]));
    engine.on_load(&mut loaded).unwrap();
    assert_eq!(loaded.get("text"), Some(&json!("hello")));

    // excluding the auth code leaves a meaningless mix
    let mut loaded = reload(&doc, Projection::exclude(["_ac"]));
    let err = engine.on_load(&mut loaded).unwrap_err();
    assert!(matches!(err, EncryptionError::PartialSelection { .. }));
}

#[tokio::test]
async fn on_load_decrypts_embedded_documents_without_authenticating() {
    let engine = default_engine();
    let mut child = Document::loaded_embedded(json!({"_id": "child-1", "text": "inner"}));
    engine.encrypt(&mut child).await.unwrap();

    engine.on_load(&mut child).unwrap();
    assert_eq!(child.get("text"), Some(&json!("inner")));
}

#[tokio::test]
async fn on_load_surfaces_embedded_decrypt_failures() {
    let writer = default_engine();
    let reader = engine_with(EncryptionOptions::with_secret("a different secret"));
    let mut child = Document::loaded_embedded(json!({"_id": "child-1", "text": "inner"}));
    writer.encrypt(&mut child).await.unwrap();

    let err = reader.on_load(&mut child).unwrap_err();
    assert!(matches!(err, EncryptionError::DecryptParse { .. }));
}

#[tokio::test]
async fn tampering_between_save_and_load_fails_the_load() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();

    let ct = doc.ciphertext.as_mut().unwrap();
    ct[20] ^= 0xff;

    let mut loaded = reload(&doc, Projection::All);
    let err = engine.on_load(&mut loaded).unwrap_err();
    assert!(matches!(err, EncryptionError::AuthFailed));
}

#[tokio::test]
async fn disabled_lifecycle_hooks_make_transitions_inert() {
    let mut options = EncryptionOptions::with_secret("test secret");
    options.run_lifecycle_hooks = false;
    let engine = engine_with(options);
    let mut doc = new_note("note-1");
    let original = doc.data.clone();

    engine.before_save(&mut doc).await.unwrap();
    assert!(doc.ciphertext.is_none());
    engine.on_load(&mut doc).unwrap();
    assert_eq!(doc.data, original);
}

#[tokio::test]
async fn resaving_a_loaded_document_repacks_it() {
    let engine = default_engine();
    let mut doc = new_note("note-1");
    engine.before_save(&mut doc).await.unwrap();
    engine.after_save(&mut doc).await.unwrap();

    // the decrypted, persisted document goes around again
    doc.set("text", json!("edited"));
    engine.before_save(&mut doc).await.unwrap();
    engine.after_save(&mut doc).await.unwrap();
    assert_eq!(doc.get("text"), Some(&json!("edited")));
}

#[tokio::test]
async fn concrete_end_to_end_scenario() {
    // secret "S", encrypt ["text"], additionally authenticate ["bool"]
    let mut options = EncryptionOptions::with_secret("S");
    options.encrypted_fields = Some(vec!["text".to_string()]);
    options.additional_authenticated_fields = vec!["bool".to_string()];
    let schema = Arc::new(docseal_types::Schema::new(
        "things",
        vec![
            docseal_types::FieldSpec::plain("_id"),
            docseal_types::FieldSpec::plain("text"),
            docseal_types::FieldSpec::plain("bool"),
        ],
    ));
    let engine = EncryptionEngine::install(schema, options).unwrap();

    let mut doc = Document::new(json!({"_id": "X", "text": "hello", "bool": true}));
    engine.before_save(&mut doc).await.unwrap();

    assert_eq!(doc.get("text"), None);
    let ct_len = doc.ciphertext.as_ref().unwrap().len();
    assert!(ct_len > 1 + 16);
    let ac_len = doc.auth_code.as_ref().unwrap().len();
    assert!(ac_len > 1 + 32);

    let persisted = doc.clone();
    engine.after_save(&mut doc).await.unwrap();
    assert_eq!(doc.get("text"), Some(&json!("hello")));

    // an out-of-band flip of the authenticated field breaks the next load
    let mut forged = reload(&persisted, Projection::All);
    forged.set("bool", json!(false));
    let err = engine.on_load(&mut forged).unwrap_err();
    assert!(matches!(err, EncryptionError::AuthFailed));
}
