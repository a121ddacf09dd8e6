//! Driving port for the read side: dashboards, profiles, and details.

use async_trait::async_trait;

use crate::domain::{
    Actor, Age, Appointment, AppointmentId, ClinicalNote, Error, PatientId, PhoneNumber, Role,
    TenantId, UserId, Username,
};

use super::{AppointmentListing, PatientListing};

/// Staff landing page summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub user_id: UserId,
    pub username: Username,
    pub role: Role,
    pub tenant_id: TenantId,
    pub patient_count: u64,
    pub pending_appointments: u64,
}

/// A patient with their appointment history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientProfileView {
    pub user_id: UserId,
    pub patient_id: PatientId,
    pub username: Username,
    pub phone: PhoneNumber,
    pub age: Age,
    pub appointments: Vec<Appointment>,
}

/// One appointment and every note recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDetailsView {
    pub patient_user_id: UserId,
    pub appointment: Appointment,
    pub notes: Vec<ClinicalNote>,
}

#[async_trait]
pub trait ClinicQuery: Send + Sync {
    /// Requires `staff`.
    async fn dashboard(&self, actor: &Actor) -> Result<DashboardView, Error>;

    /// Requires `staff`.
    async fn patients(&self, actor: &Actor) -> Result<Vec<PatientListing>, Error>;

    /// Requires `staff`.
    async fn appointments(&self, actor: &Actor) -> Result<Vec<AppointmentListing>, Error>;

    /// Requires `profile-owner` for `patient_user_id`.
    async fn patient_profile(
        &self,
        actor: &Actor,
        patient_user_id: &UserId,
    ) -> Result<PatientProfileView, Error>;

    /// Requires `profile-owner`; the appointment must belong to that patient.
    async fn appointment_details(
        &self,
        actor: &Actor,
        patient_user_id: &UserId,
        appointment_id: &AppointmentId,
    ) -> Result<AppointmentDetailsView, Error>;
}
