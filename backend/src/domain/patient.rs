//! Patients and reception staff belonging to a tenant.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::error::Error;
use super::tenant::TenantId;
use super::user::UserId;

/// Oldest age accepted for a patient.
pub const AGE_MAX: u8 = 100;

/// Age validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("age must be between 0 and {max}, got {value}")]
pub struct AgeOutOfRange {
    pub value: i64,
    pub max: u8,
}

/// Patient age in whole years, within `0..=100`.
///
/// # Examples
/// ```
/// use clinic::domain::Age;
///
/// assert!(Age::new(42).is_ok());
/// assert!(Age::new(101).is_err());
/// assert!(Age::new(-1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Age(u8);

impl Age {
    pub fn new(value: i64) -> Result<Self, AgeOutOfRange> {
        u8::try_from(value)
            .ok()
            .filter(|age| *age <= AGE_MAX)
            .map(Self)
            .ok_or(AgeOutOfRange {
                value,
                max: AGE_MAX,
            })
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Age {
    type Error = AgeOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Age> for u8 {
    fn from(value: Age) -> Self {
        value.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AgeOutOfRange> for Error {
    fn from(err: AgeOutOfRange) -> Self {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "age", "code": "age_out_of_range" }))
    }
}

/// Identifier of a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(Uuid);

impl PatientId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Patient record linked one-to-one with a patient user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub age: Age,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identifier of a reception record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceptionId(Uuid);

impl ReceptionId {
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Reception staff record linked one-to-one with a reception user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    pub id: ReceptionId,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub created_at: DateTime<Utc>,
}
