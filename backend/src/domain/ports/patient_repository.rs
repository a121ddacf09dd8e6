//! Port abstraction for patient records.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Age, Patient, PatientId, PhoneNumber, TenantId, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by patient repository adapters.
    pub enum PatientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "patient repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "patient repository query failed: {message}"; InternalError,
        /// The patient user clashes with an existing account.
        Duplicate { field: String } => "a user with this {field} already exists"; Conflict {
            "field": field,
            "code": "duplicate",
        },
    }
}

/// Patient row joined with its user, as shown on the patients dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientListing {
    pub patient_id: PatientId,
    pub user_id: UserId,
    pub username: Username,
    pub phone: PhoneNumber,
    pub age: Age,
    pub created_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Insert the patient user and the patient record together.
    async fn create(&self, user: &User, patient: &Patient) -> Result<(), PatientRepositoryError>;

    /// Fetch the patient record linked to a user, in any tenant.
    async fn find_by_user(&self, user_id: &UserId)
    -> Result<Option<Patient>, PatientRepositoryError>;

    /// Fetch a patient record within a tenant.
    async fn find(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError>;

    /// Patients of a tenant, newest first.
    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<PatientListing>, PatientRepositoryError>;

    /// Number of patients in a tenant.
    async fn count_for_tenant(&self, tenant_id: &TenantId) -> Result<u64, PatientRepositoryError>;
}

