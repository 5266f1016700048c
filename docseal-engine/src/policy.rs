//! Field selection policy.
//!
//! Resolves, once at install time, which declared fields get encrypted and
//! which get authenticated. The result is immutable for the engine's
//! lifetime.

use crate::error::{EncryptionError, EncryptionResult};
use crate::options::EncryptionOptions;
use docseal_types::{AUTH_CODE_FIELD, CIPHERTEXT_FIELD, ID_FIELD, Schema};
use std::collections::BTreeSet;

/// The resolved field lists.
#[derive(Clone, Debug)]
pub struct FieldPolicy {
    /// Fields packed into the ciphertext envelope on encrypt.
    pub encrypted_fields: Vec<String>,
    /// Fields covered by the authentication code. Always contains the
    /// identifier and the ciphertext field.
    pub authenticated_fields: Vec<String>,
    /// Fields probed to classify a projection as fully, partially or not at
    /// all covering the authenticated data. The identifier is left out
    /// because every projection selects it implicitly.
    pub fields_to_check: Vec<String>,
}

impl FieldPolicy {
    pub fn resolve(schema: &Schema, options: &EncryptionOptions) -> EncryptionResult<Self> {
        let encrypted_fields = match &options.encrypted_fields {
            Some(explicit) => {
                for field in explicit {
                    validate_path(field)?;
                }
                dedup(explicit.iter().filter(|f| *f != CIPHERTEXT_FIELD))
            }
            None => {
                let mut excluded: BTreeSet<&str> =
                    [ID_FIELD, CIPHERTEXT_FIELD, AUTH_CODE_FIELD].into();
                for field in &options.exclude_from_encryption {
                    validate_path(field)?;
                    excluded.insert(field.as_str());
                }
                dedup(
                    schema
                        .fields()
                        .iter()
                        .filter(|f| !f.indexed)
                        .map(|f| &f.path)
                        .filter(|p| !excluded.contains(p.as_str())),
                )
            }
        };

        let mut authenticated_fields = Vec::new();
        for field in &options.additional_authenticated_fields {
            validate_path(field)?;
            if !authenticated_fields.contains(field) {
                authenticated_fields.push(field.clone());
            }
        }
        for baseline in [ID_FIELD, CIPHERTEXT_FIELD] {
            if !authenticated_fields.iter().any(|f| f == baseline) {
                authenticated_fields.push(baseline.to_string());
            }
        }

        let mut fields_to_check: Vec<String> = authenticated_fields
            .iter()
            .filter(|f| *f != ID_FIELD)
            .cloned()
            .collect();
        fields_to_check.push(AUTH_CODE_FIELD.to_string());

        Ok(Self { encrypted_fields, authenticated_fields, fields_to_check })
    }
}

/// A configured field name must be addressable by the dotted-path engine:
/// no empty path and no empty segment (leading, trailing or doubled dots).
fn validate_path(path: &str) -> EncryptionResult<()> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(EncryptionError::Config(format!(
            "field name {path:?} cannot be addressed as a dotted path"
        )));
    }
    Ok(())
}

fn dedup<'a>(fields: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for field in fields {
        if seen.insert(field.as_str()) {
            out.push(field.clone());
        }
    }
    out
}
