//! Read side: dashboards, patient profiles, and appointment details.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    AppointmentDetailsView, AppointmentListing, AppointmentRepository, ClinicQuery,
    ClinicalNoteRepository, DashboardView, PatientListing, PatientProfileView,
    PatientRepository, UserRepository,
};
use crate::domain::{Actor, AppointmentId, Error, Patient, User, UserId};

/// [`ClinicQuery`] over the identity store and the appointment ledger.
pub struct ClinicQueryService<U, P, A, N> {
    users: Arc<U>,
    patients: Arc<P>,
    appointments: Arc<A>,
    notes: Arc<N>,
}

impl<U, P, A, N> Clone for ClinicQueryService<U, P, A, N> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            patients: Arc::clone(&self.patients),
            appointments: Arc::clone(&self.appointments),
            notes: Arc::clone(&self.notes),
        }
    }
}

impl<U, P, A, N> ClinicQueryService<U, P, A, N> {
    pub fn new(users: Arc<U>, patients: Arc<P>, appointments: Arc<A>, notes: Arc<N>) -> Self {
        Self {
            users,
            patients,
            appointments,
            notes,
        }
    }
}

impl<U, P, A, N> ClinicQueryService<U, P, A, N>
where
    U: UserRepository,
    P: PatientRepository,
{
    /// Load a patient profile the actor may see.
    ///
    /// Actors that are neither the owner nor staff are refused before any
    /// lookup, so they cannot probe which profiles exist.
    async fn visible_patient(
        &self,
        actor: &Actor,
        patient_user_id: &UserId,
    ) -> Result<(User, Patient), Error> {
        if actor.user_id != *patient_user_id && !actor.is_staff() {
            return Err(Error::forbidden("profile access denied"));
        }
        let patient = self
            .patients
            .find_by_user(patient_user_id)
            .await?
            .ok_or_else(|| Error::not_found("patient not found"))?;
        actor.require_profile_access(*patient_user_id, patient.tenant_id)?;
        let user = self
            .users
            .find_by_id(patient_user_id)
            .await?
            .ok_or_else(|| Error::not_found("patient not found"))?;
        Ok((user, patient))
    }
}

#[async_trait]
impl<U, P, A, N> ClinicQuery for ClinicQueryService<U, P, A, N>
where
    U: UserRepository,
    P: PatientRepository,
    A: AppointmentRepository,
    N: ClinicalNoteRepository,
{
    async fn dashboard(&self, actor: &Actor) -> Result<DashboardView, Error> {
        let tenant_id = actor.require_staff()?;
        let user = self
            .users
            .find_by_id(&actor.user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        let patient_count = self.patients.count_for_tenant(&tenant_id).await?;
        let pending_appointments = self.appointments.count_pending(&tenant_id).await?;
        Ok(DashboardView {
            user_id: user.id(),
            username: user.username().clone(),
            role: user.role(),
            tenant_id,
            patient_count,
            pending_appointments,
        })
    }

    async fn patients(&self, actor: &Actor) -> Result<Vec<PatientListing>, Error> {
        let tenant_id = actor.require_staff()?;
        Ok(self.patients.list_for_tenant(&tenant_id).await?)
    }

    async fn appointments(&self, actor: &Actor) -> Result<Vec<AppointmentListing>, Error> {
        let tenant_id = actor.require_staff()?;
        Ok(self.appointments.list_for_tenant(&tenant_id).await?)
    }

    async fn patient_profile(
        &self,
        actor: &Actor,
        patient_user_id: &UserId,
    ) -> Result<PatientProfileView, Error> {
        let (user, patient) = self.visible_patient(actor, patient_user_id).await?;
        let appointments = self
            .appointments
            .list_for_patient(&patient.tenant_id, &patient.id)
            .await?;
        Ok(PatientProfileView {
            user_id: user.id(),
            patient_id: patient.id,
            username: user.username().clone(),
            phone: user.phone().clone(),
            age: patient.age,
            appointments,
        })
    }

    async fn appointment_details(
        &self,
        actor: &Actor,
        patient_user_id: &UserId,
        appointment_id: &AppointmentId,
    ) -> Result<AppointmentDetailsView, Error> {
        let (_, patient) = self.visible_patient(actor, patient_user_id).await?;
        let appointment = self
            .appointments
            .find(&patient.tenant_id, appointment_id)
            .await?
            .ok_or_else(|| Error::not_found("appointment not found"))?;
        if appointment.patient_id() != patient.id {
            debug!(
                %appointment_id,
                %patient_user_id,
                "appointment requested under another patient's path"
            );
            return Err(Error::forbidden("invalid URL parameters"));
        }
        let notes = self
            .notes
            .list_for_appointment(&patient.tenant_id, appointment_id)
            .await?;
        Ok(AppointmentDetailsView {
            patient_user_id: *patient_user_id,
            appointment,
            notes,
        })
    }
}

#[cfg(test)]
#[path = "clinic_query_service_tests.rs"]
mod tests;
