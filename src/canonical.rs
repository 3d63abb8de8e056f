//! Deterministic canonical encoding of prescriptions.
//!
//! The byte string that gets signed is `"MIRATH-RX-v1\0"` followed by each
//! present field in ascending field-id order as `id(1) | len(4, LE) |
//! utf8`. Strings are NFC-normalized before encoding; numeric fields are
//! validated as base-10 integers and re-rendered without leading zeros.
//! Fields live in a `BTreeMap`, so insertion order never leaks into the
//! output: two prescriptions equal under normalization canonicalize to
//! identical bytes.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::CanonicalError;

/// Version header; the trailing NUL separates it from the first field id.
pub const CANONICAL_HEADER: &[u8] = b"MIRATH-RX-v1\0";

/// Closed registry of prescription fields. Wire ids are the enum
/// discriminants; ordering follows the ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FieldId {
    PatientName = 0x01,
    PatientId = 0x02,
    PhysicianName = 0x03,
    PhysicianLicense = 0x04,
    Medication = 0x05,
    Dosage = 0x06,
    Quantity = 0x07,
    Refills = 0x08,
    IssueDate = 0x09,
    Instructions = 0x0a,
}

struct FieldSpec {
    id: FieldId,
    name: &'static str,
    required: bool,
    numeric: bool,
}

static FIELD_REGISTRY: Lazy<BTreeMap<u8, FieldSpec>> = Lazy::new(|| {
    let specs = [
        FieldSpec { id: FieldId::PatientName, name: "patient_name", required: true, numeric: false },
        FieldSpec { id: FieldId::PatientId, name: "patient_id", required: true, numeric: false },
        FieldSpec { id: FieldId::PhysicianName, name: "physician_name", required: true, numeric: false },
        FieldSpec { id: FieldId::PhysicianLicense, name: "physician_license", required: true, numeric: false },
        FieldSpec { id: FieldId::Medication, name: "medication", required: true, numeric: false },
        FieldSpec { id: FieldId::Dosage, name: "dosage", required: true, numeric: false },
        FieldSpec { id: FieldId::Quantity, name: "quantity", required: true, numeric: true },
        FieldSpec { id: FieldId::Refills, name: "refills", required: false, numeric: true },
        FieldSpec { id: FieldId::IssueDate, name: "issue_date", required: true, numeric: false },
        FieldSpec { id: FieldId::Instructions, name: "instructions", required: false, numeric: false },
    ];
    specs.into_iter().map(|spec| (spec.id as u8, spec)).collect()
});

impl FieldId {
    /// Wire id.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Resolve a wire id; unknown ids are rejected, not passed through.
    pub fn from_raw(raw: u8) -> Result<FieldId, CanonicalError> {
        FIELD_REGISTRY
            .get(&raw)
            .map(|spec| spec.id)
            .ok_or(CanonicalError::UnknownFieldId(raw))
    }

    pub fn name(self) -> &'static str {
        FIELD_REGISTRY[&(self as u8)].name
    }

    fn spec(self) -> &'static FieldSpec {
        &FIELD_REGISTRY[&(self as u8)]
    }
}

/// A structured prescription. Field storage is order-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prescription {
    fields: BTreeMap<FieldId, String>,
}

impl Prescription {
    pub fn new() -> Prescription {
        Prescription::default()
    }

    pub fn set(&mut self, id: FieldId, value: impl Into<String>) -> &mut Self {
        self.fields.insert(id, value.into());
        self
    }

    /// Entry point for untyped callers holding a raw field id.
    pub fn set_raw(&mut self, raw: u8, value: impl Into<String>) -> Result<&mut Self, CanonicalError> {
        let id = FieldId::from_raw(raw)?;
        Ok(self.set(id, value))
    }

    pub fn get(&self, id: FieldId) -> Option<&str> {
        self.fields.get(&id).map(String::as_str)
    }

    /// Emit the canonical byte string. Pure: equal prescriptions under
    /// field-by-field normalization yield byte-identical output.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CanonicalError> {
        for spec in FIELD_REGISTRY.values() {
            if spec.required && !self.fields.contains_key(&spec.id) {
                return Err(CanonicalError::MissingField(spec.name));
            }
        }
        let mut out = CANONICAL_HEADER.to_vec();
        for (id, value) in &self.fields {
            let normalized = normalize_field(*id, value)?;
            out.push(id.raw());
            out.extend_from_slice(&(normalized.len() as u32).to_le_bytes());
            out.extend_from_slice(normalized.as_bytes());
        }
        Ok(out)
    }
}

fn normalize_field(id: FieldId, value: &str) -> Result<String, CanonicalError> {
    if id.spec().numeric {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CanonicalError::InvalidNumeric {
                field: id.name(),
                value: value.to_owned(),
            });
        }
        let parsed: u64 = value.parse().map_err(|_| CanonicalError::InvalidNumeric {
            field: id.name(),
            value: value.to_owned(),
        })?;
        Ok(parsed.to_string())
    } else {
        Ok(value.nfc().collect())
    }
}

/// Canonicalize a prescription: the message input to sign and verify.
pub fn canonicalize(prescription: &Prescription) -> Result<Vec<u8>, CanonicalError> {
    prescription.canonical_bytes()
}
