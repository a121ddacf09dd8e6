//! Tenant registry: doctors, their partitions, and their network domains.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::error::Error;
use super::user::UserId;

/// Maximum length of a PostgreSQL identifier.
pub const SCHEMA_NAME_MAX: usize = 63;
/// Maximum length of a doctor's specialty.
pub const MAJOR_MAX: usize = 50;
/// Maximum length of a doctor's address list.
pub const ADDRESSES_MAX: usize = 150;
/// Maximum length of a host name.
pub const DOMAIN_MAX: usize = 253;

/// Validation errors for tenant registry values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TenantValidationError {
    #[error("schema name must not be empty")]
    EmptySchemaName,
    #[error("schema name must be at most {max} characters")]
    SchemaNameTooLong { max: usize },
    #[error("schema name must start with a letter and contain only a-z, 0-9 and _")]
    SchemaNameInvalid,
    #[error("schema name `public` is reserved")]
    SchemaNameReserved,
    #[error("major must not be empty")]
    EmptyMajor,
    #[error("major must be at most {max} characters")]
    MajorTooLong { max: usize },
    #[error("addresses must be at most {max} characters")]
    AddressesTooLong { max: usize },
    #[error("domain must be a valid host name")]
    InvalidDomain,
}

impl From<TenantValidationError> for Error {
    fn from(err: TenantValidationError) -> Self {
        let (field, code) = match &err {
            TenantValidationError::EmptySchemaName
            | TenantValidationError::SchemaNameTooLong { .. }
            | TenantValidationError::SchemaNameInvalid
            | TenantValidationError::SchemaNameReserved => ("schemaName", "invalid_schema_name"),
            TenantValidationError::EmptyMajor | TenantValidationError::MajorTooLong { .. } => {
                ("major", "invalid_major")
            }
            TenantValidationError::AddressesTooLong { .. } => ("addresses", "addresses_too_long"),
            TenantValidationError::InvalidDomain => ("domain", "invalid_domain"),
        };
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": code }))
    }
}

/// Tenant identifier; also the partition key for tenant-scoped data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
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

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition name, kept compatible with PostgreSQL schema identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TenantValidationError> {
        let value = raw.as_ref().trim();
        if value.is_empty() {
            return Err(TenantValidationError::EmptySchemaName);
        }
        if value.len() > SCHEMA_NAME_MAX {
            return Err(TenantValidationError::SchemaNameTooLong {
                max: SCHEMA_NAME_MAX,
            });
        }
        let mut chars = value.chars();
        let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
        let rest_valid = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !starts_with_letter || !rest_valid {
            return Err(TenantValidationError::SchemaNameInvalid);
        }
        if value == "public" {
            return Err(TenantValidationError::SchemaNameReserved);
        }
        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for SchemaName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Host name used to build post-login redirects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(String);

impl DomainName {
    /// Lower-case and validate a host name such as `mona.clinic.local`.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TenantValidationError> {
        let value = raw.as_ref().trim().to_ascii_lowercase();
        if value.is_empty() || value.len() > DOMAIN_MAX {
            return Err(TenantValidationError::InvalidDomain);
        }
        let labels_valid = value.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
        if !labels_valid {
            return Err(TenantValidationError::InvalidDomain);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visit prices charged by a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantRates {
    pub default_cost: u32,
    pub default_prior_cost: u32,
}

impl TenantRates {
    /// Price for a visit with the given priority.
    pub fn cost_for(&self, is_prior: bool) -> u32 {
        if is_prior {
            self.default_prior_cost
        } else {
            self.default_cost
        }
    }
}

/// Descriptive fields of a doctor's practice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Practice {
    major: String,
    addresses: String,
}

impl Practice {
    pub fn new(major: &str, addresses: &str) -> Result<Self, TenantValidationError> {
        let major = major.trim();
        if major.is_empty() {
            return Err(TenantValidationError::EmptyMajor);
        }
        if major.chars().count() > MAJOR_MAX {
            return Err(TenantValidationError::MajorTooLong { max: MAJOR_MAX });
        }
        let addresses = addresses.trim();
        if addresses.chars().count() > ADDRESSES_MAX {
            return Err(TenantValidationError::AddressesTooLong { max: ADDRESSES_MAX });
        }
        Ok(Self {
            major: major.to_owned(),
            addresses: addresses.to_owned(),
        })
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn addresses(&self) -> &str {
        &self.addresses
    }
}

/// A doctor's isolated partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: TenantId,
    pub schema_name: SchemaName,
    pub doctor_user_id: UserId,
    pub practice: Practice,
    pub rates: TenantRates,
    pub created_at: DateTime<Utc>,
}

/// Host name registered for a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantDomain {
    pub domain: DomainName,
    pub tenant_id: TenantId,
    pub is_primary: bool,
}
