//! Port abstraction for the appointment ledger.
//!
//! Every method is scoped by [`TenantId`]; adapters must never return rows
//! from another tenant's partition.

use async_trait::async_trait;

use crate::domain::{Age, Appointment, AppointmentId, PatientId, TenantId, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by appointment repository adapters.
    pub enum AppointmentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "appointment repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String }
            => "appointment repository query failed: {message}"; InternalError,
    }
}

/// Appointment annotated with its patient, as shown on the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentListing {
    pub appointment: Appointment,
    pub patient_user_id: UserId,
    pub patient_username: Username,
    pub patient_age: Age,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError>;

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError>;

    /// Persist status and date. Cost and priority are never written here.
    async fn update_schedule(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError>;

    /// All appointments of a tenant, newest created first.
    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<AppointmentListing>, AppointmentRepositoryError>;

    /// Appointments of one patient, newest created first.
    async fn list_for_patient(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError>;

    /// Number of pending appointments in a tenant.
    async fn count_pending(&self, tenant_id: &TenantId) -> Result<u64, AppointmentRepositoryError>;
}

