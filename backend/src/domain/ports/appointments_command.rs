//! Driving port for booking and updating appointments.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Actor, Appointment, AppointmentChanges, AppointmentId, Error, UserId};

/// Booking request; the patient is addressed by their user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateAppointmentRequest {
    pub patient_user_id: UserId,
    pub date: NaiveDate,
    pub is_prior: bool,
}

/// Staff-only appointment commands.
#[async_trait]
pub trait AppointmentsCommand: Send + Sync {
    async fn create(
        &self,
        actor: &Actor,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, Error>;

    /// Change status and/or date. Cost is never touched.
    async fn update(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        changes: AppointmentChanges,
    ) -> Result<Appointment, Error>;
}
