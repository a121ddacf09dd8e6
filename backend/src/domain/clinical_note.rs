//! Clinical notes attached to an appointment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::appointment::AppointmentId;
use super::error::Error;
use super::tenant::TenantId;

/// Validation errors for note payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    #[error("{kind} must not be empty")]
    Empty { kind: NoteKind },
    #[error("{kind} must be at most {max} characters")]
    TooLong { kind: NoteKind, max: usize },
    #[error("unknown note kind: {0}")]
    UnknownKind(String),
}

impl From<NoteValidationError> for Error {
    fn from(err: NoteValidationError) -> Self {
        let (field, code) = match &err {
            NoteValidationError::Empty { .. } => ("text", "empty_note"),
            NoteValidationError::TooLong { .. } => ("text", "note_too_long"),
            NoteValidationError::UnknownKind(_) => ("kind", "unknown_note_kind"),
        };
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": code }))
    }
}

/// The three note categories a doctor records per visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Diagnosis,
    Prescription,
    Requires,
}

impl NoteKind {
    /// Stored and wire spelling of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagnosis => "diagnosis",
            Self::Prescription => "prescription",
            Self::Requires => "requires",
        }
    }

    /// Longest text accepted for this kind.
    pub fn max_len(self) -> usize {
        match self {
            Self::Diagnosis => 200,
            Self::Prescription | Self::Requires => 100,
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = NoteValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "diagnosis" => Ok(Self::Diagnosis),
            "prescription" => Ok(Self::Prescription),
            "requires" => Ok(Self::Requires),
            other => Err(NoteValidationError::UnknownKind(other.to_owned())),
        }
    }
}

/// Validated note text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteBody(String);

impl NoteBody {
    /// Trim `text` and check it is non-empty and within the limit for `kind`.
    pub fn new(kind: NoteKind, text: &str) -> Result<Self, NoteValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::Empty { kind });
        }
        let max = kind.max_len();
        if trimmed.chars().count() > max {
            return Err(NoteValidationError::TooLong { kind, max });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for NoteBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a clinical note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Wrap an identifier loaded from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Fresh random (v4) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnosis, prescription, or requirement recorded for a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalNote {
    pub id: NoteId,
    pub appointment_id: AppointmentId,
    pub tenant_id: TenantId,
    pub kind: NoteKind,
    pub body: NoteBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
