//! Staff-initiated signups for patients and reception desks.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::identity_service::new_account;
use crate::domain::ports::{
    CredentialHasher, PatientRepository, ReceptionRepository, RegisterPatientRequest,
    RegisterReceptionRequest, RegisteredPatient, RegisteredReception, RegistrationCommand,
};
use crate::domain::{Actor, Error, Patient, PatientId, Reception, ReceptionId, Role};

/// [`RegistrationCommand`] writing new accounts into the actor's tenant.
pub struct RegistrationService<P, R, H> {
    patients: Arc<P>,
    receptions: Arc<R>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<P, R, H> Clone for RegistrationService<P, R, H> {
    fn clone(&self) -> Self {
        Self {
            patients: Arc::clone(&self.patients),
            receptions: Arc::clone(&self.receptions),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, R, H> RegistrationService<P, R, H> {
    pub fn new(
        patients: Arc<P>,
        receptions: Arc<R>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            receptions,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl<P, R, H> RegistrationCommand for RegistrationService<P, R, H>
where
    P: PatientRepository,
    R: ReceptionRepository,
    H: CredentialHasher,
{
    async fn register_patient(
        &self,
        actor: &Actor,
        request: RegisterPatientRequest,
    ) -> Result<RegisteredPatient, Error> {
        let tenant_id = actor.require_staff()?;
        let now = self.clock.utc();
        let user = new_account(
            self.hasher.as_ref(),
            request.username,
            request.phone,
            Role::Patient,
            request.password.as_deref().map(String::as_str),
            now,
        )?;
        let patient = Patient {
            id: PatientId::random(),
            user_id: user.id(),
            tenant_id,
            age: request.age,
            created_at: now,
            updated_at: now,
        };
        self.patients.create(&user, &patient).await?;
        info!(%tenant_id, user_id = %user.id(), registered_by = %actor.user_id, "patient registered");
        Ok(RegisteredPatient {
            user_id: user.id(),
            patient_id: patient.id,
            tenant_id,
        })
    }

    async fn register_reception(
        &self,
        actor: &Actor,
        request: RegisterReceptionRequest,
    ) -> Result<RegisteredReception, Error> {
        let tenant_id = actor.require_doctor()?;
        let now = self.clock.utc();
        let user = new_account(
            self.hasher.as_ref(),
            request.username,
            request.phone,
            Role::Reception,
            Some(request.password.as_str()),
            now,
        )?;
        let reception = Reception {
            id: ReceptionId::random(),
            user_id: user.id(),
            tenant_id,
            created_at: now,
        };
        self.receptions.create(&user, &reception).await?;
        info!(%tenant_id, user_id = %user.id(), "reception registered");
        Ok(RegisteredReception {
            user_id: user.id(),
            reception_id: reception.id,
            tenant_id,
        })
    }
}
