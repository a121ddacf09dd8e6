//! Booking and rescheduling for staff.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{
    AppointmentRepository, AppointmentsCommand, CreateAppointmentRequest, PatientRepository,
    TenantRepository,
};
use crate::domain::{
    Actor, Appointment, AppointmentChanges, AppointmentId, Error, NewAppointment,
};

/// [`AppointmentsCommand`] scoped to the actor's tenant.
pub struct AppointmentService<A, P, T> {
    appointments: Arc<A>,
    patients: Arc<P>,
    tenants: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<A, P, T> Clone for AppointmentService<A, P, T> {
    fn clone(&self) -> Self {
        Self {
            appointments: Arc::clone(&self.appointments),
            patients: Arc::clone(&self.patients),
            tenants: Arc::clone(&self.tenants),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A, P, T> AppointmentService<A, P, T> {
    pub fn new(
        appointments: Arc<A>,
        patients: Arc<P>,
        tenants: Arc<T>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            patients,
            tenants,
            clock,
        }
    }
}

#[async_trait]
impl<A, P, T> AppointmentsCommand for AppointmentService<A, P, T>
where
    A: AppointmentRepository,
    P: PatientRepository,
    T: TenantRepository,
{
    async fn create(
        &self,
        actor: &Actor,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, Error> {
        let tenant_id = actor.require_staff()?;
        let patient = self
            .patients
            .find_by_user(&request.patient_user_id)
            .await?
            .filter(|patient| patient.tenant_id == tenant_id)
            .ok_or_else(|| Error::not_found("patient not found"))?;
        let tenant = self
            .tenants
            .find_by_id(&tenant_id)
            .await?
            .ok_or_else(|| Error::internal(format!("tenant {tenant_id} is missing")))?;

        let now = self.clock.utc();
        let appointment = Appointment::schedule(
            NewAppointment {
                id: AppointmentId::random(),
                patient_id: patient.id,
                tenant_id,
                date: request.date,
                is_prior: request.is_prior,
            },
            tenant.rates,
            now.date_naive(),
            now,
        )?;
        self.appointments.insert(&appointment).await?;
        info!(
            %tenant_id,
            appointment_id = %appointment.id(),
            cost = appointment.cost(),
            "appointment booked"
        );
        Ok(appointment)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        changes: AppointmentChanges,
    ) -> Result<Appointment, Error> {
        let tenant_id = actor.require_staff()?;
        let mut appointment = self
            .appointments
            .find(&tenant_id, id)
            .await?
            .ok_or_else(|| Error::not_found("appointment not found"))?;

        let changed = appointment.apply(changes, self.clock.utc().date_naive())?;
        if changed {
            self.appointments.update_schedule(&appointment).await?;
            info!(
                %tenant_id,
                appointment_id = %id,
                status = %appointment.status(),
                "appointment updated"
            );
        } else {
            debug!(appointment_id = %id, "appointment update was a no-op");
        }
        Ok(appointment)
    }
}

#[cfg(test)]
#[path = "appointment_service_tests.rs"]
mod tests;
