//! Repository port implementations for [`InMemoryClinicStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{InMemoryClinicStore, StoreFailure};
use crate::domain::ports::{
    AppointmentListing, AppointmentRepository, AppointmentRepositoryError, ClinicalNoteRepository,
    ClinicalNoteRepositoryError, PatientListing, PatientRepository, PatientRepositoryError,
    ReceptionRepository, ReceptionRepositoryError, TenantProvision, TenantRepository,
    TenantRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Appointment, AppointmentId, AppointmentRecord, AppointmentStatus, ClinicalNote, LockoutPolicy,
    LoginAttempts, NoteBody, NoteId, Patient, PatientId, PhoneNumber, Reception, Tenant,
    TenantDomain, TenantId, User, UserId,
};

macro_rules! store_failure_into {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<StoreFailure> for $error {
                fn from(failure: StoreFailure) -> Self {
                    match failure {
                        StoreFailure::Offline => Self::connection(failure.message()),
                        StoreFailure::Poisoned => Self::query(failure.message()),
                    }
                }
            }
        )*
    };
}

store_failure_into!(
    UserPersistenceError,
    TenantRepositoryError,
    ReceptionRepositoryError,
    PatientRepositoryError,
    AppointmentRepositoryError,
    ClinicalNoteRepositoryError,
);

#[async_trait]
impl UserRepository for InMemoryClinicStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        if let Some(field) = state.user_clash(user) {
            return Err(UserPersistenceError::duplicate(field));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|user| user.username().as_ref() == username)
            .cloned())
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|user| user.phone() == phone)
            .cloned())
    }

    async fn record_failed_attempt(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> Result<LoginAttempts, UserPersistenceError> {
        let mut state = self.lock()?;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| UserPersistenceError::query(format!("user {id} not found")))?;
        policy.record_failure(user.login_attempts_mut(), now);
        Ok(user.login_attempts().clone())
    }

    async fn record_successful_login(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.lock()?;
        if let Some(user) = state.users.get_mut(id) {
            *user.login_attempts_mut() = LoginAttempts::from_parts(0, Some(now), None);
        }
        Ok(())
    }
}

#[async_trait]
impl TenantRepository for InMemoryClinicStore {
    async fn provision(&self, provision: &TenantProvision) -> Result<(), TenantRepositoryError> {
        let mut state = self.lock()?;
        if let Some(field) = state.user_clash(&provision.doctor) {
            return Err(TenantRepositoryError::duplicate(field));
        }
        if state
            .tenants
            .values()
            .any(|tenant| tenant.schema_name == provision.tenant.schema_name)
        {
            return Err(TenantRepositoryError::duplicate("schema_name"));
        }
        if state
            .domains
            .iter()
            .any(|domain| domain.domain == provision.domain.domain)
        {
            return Err(TenantRepositoryError::duplicate("domain"));
        }
        state
            .users
            .insert(provision.doctor.id(), provision.doctor.clone());
        state
            .tenants
            .insert(provision.tenant.id, provision.tenant.clone());
        state.domains.push(provision.domain.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, TenantRepositoryError> {
        Ok(self.lock()?.tenants.get(id).cloned())
    }

    async fn find_by_doctor(
        &self,
        doctor_user_id: &UserId,
    ) -> Result<Option<Tenant>, TenantRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .tenants
            .values()
            .find(|tenant| tenant.doctor_user_id == *doctor_user_id)
            .cloned())
    }

    async fn primary_domain(
        &self,
        id: &TenantId,
    ) -> Result<Option<TenantDomain>, TenantRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .domains
            .iter()
            .find(|domain| domain.tenant_id == *id && domain.is_primary)
            .cloned())
    }

    async fn delete(&self, id: &TenantId) -> Result<bool, TenantRepositoryError> {
        Ok(self.lock()?.remove_tenant(id))
    }
}

#[async_trait]
impl ReceptionRepository for InMemoryClinicStore {
    async fn create(
        &self,
        user: &User,
        reception: &Reception,
    ) -> Result<(), ReceptionRepositoryError> {
        let mut state = self.lock()?;
        if let Some(field) = state.user_clash(user) {
            return Err(ReceptionRepositoryError::duplicate(field));
        }
        state.users.insert(user.id(), user.clone());
        state.receptions.insert(reception.user_id, reception.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Reception>, ReceptionRepositoryError> {
        Ok(self.lock()?.receptions.get(user_id).cloned())
    }
}

#[async_trait]
impl PatientRepository for InMemoryClinicStore {
    async fn create(&self, user: &User, patient: &Patient) -> Result<(), PatientRepositoryError> {
        let mut state = self.lock()?;
        if let Some(field) = state.user_clash(user) {
            return Err(PatientRepositoryError::duplicate(field));
        }
        state.users.insert(user.id(), user.clone());
        state.patients.insert(patient.id, patient.clone());
        Ok(())
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .patients
            .values()
            .find(|patient| patient.user_id == *user_id)
            .cloned())
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .patients
            .get(patient_id)
            .filter(|patient| patient.tenant_id == *tenant_id)
            .cloned())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<PatientListing>, PatientRepositoryError> {
        let state = self.lock()?;
        let mut listings: Vec<PatientListing> = state
            .patients
            .values()
            .filter(|patient| patient.tenant_id == *tenant_id)
            .filter_map(|patient| {
                state.users.get(&patient.user_id).map(|user| PatientListing {
                    patient_id: patient.id,
                    user_id: user.id(),
                    username: user.username().clone(),
                    phone: user.phone().clone(),
                    age: patient.age,
                    created_at: patient.created_at,
                })
            })
            .collect();
        listings.sort_by(|a, b| newest_first(a.created_at, b.created_at));
        Ok(listings)
    }

    async fn count_for_tenant(&self, tenant_id: &TenantId) -> Result<u64, PatientRepositoryError> {
        let state = self.lock()?;
        let count = state
            .patients
            .values()
            .filter(|patient| patient.tenant_id == *tenant_id)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryClinicStore {
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut state = self.lock()?;
        state
            .appointments
            .insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .appointments
            .get(id)
            .filter(|appointment| appointment.tenant_id() == *tenant_id)
            .cloned())
    }

    async fn update_schedule(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut state = self.lock()?;
        let Some(stored) = state.appointments.get_mut(&appointment.id()) else {
            return Err(AppointmentRepositoryError::query(format!(
                "appointment {} does not exist",
                appointment.id()
            )));
        };
        // Only status and date move; the stored cost is authoritative.
        *stored = Appointment::restore(AppointmentRecord {
            id: stored.id(),
            patient_id: stored.patient_id(),
            tenant_id: stored.tenant_id(),
            date: appointment.date(),
            status: appointment.status(),
            is_prior: stored.is_prior(),
            cost: stored.cost(),
            created_at: stored.created_at(),
        });
        Ok(())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<AppointmentListing>, AppointmentRepositoryError> {
        let state = self.lock()?;
        let mut listings: Vec<AppointmentListing> = state
            .appointments
            .values()
            .filter(|appointment| appointment.tenant_id() == *tenant_id)
            .filter_map(|appointment| {
                let patient = state.patients.get(&appointment.patient_id())?;
                let user = state.users.get(&patient.user_id)?;
                Some(AppointmentListing {
                    appointment: appointment.clone(),
                    patient_user_id: user.id(),
                    patient_username: user.username().clone(),
                    patient_age: patient.age,
                })
            })
            .collect();
        listings.sort_by(|a, b| {
            newest_first(a.appointment.created_at(), b.appointment.created_at())
        });
        Ok(listings)
    }

    async fn list_for_patient(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let state = self.lock()?;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| {
                appointment.tenant_id() == *tenant_id && appointment.patient_id() == *patient_id
            })
            .cloned()
            .collect();
        appointments.sort_by(|a, b| newest_first(a.created_at(), b.created_at()));
        Ok(appointments)
    }

    async fn count_pending(&self, tenant_id: &TenantId) -> Result<u64, AppointmentRepositoryError> {
        let state = self.lock()?;
        let count = state
            .appointments
            .values()
            .filter(|appointment| {
                appointment.tenant_id() == *tenant_id
                    && appointment.status() == AppointmentStatus::Pending
            })
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl ClinicalNoteRepository for InMemoryClinicStore {
    async fn insert(&self, note: &ClinicalNote) -> Result<(), ClinicalNoteRepositoryError> {
        let mut state = self.lock()?;
        if !state.appointments.contains_key(&note.appointment_id) {
            return Err(ClinicalNoteRepositoryError::query(format!(
                "appointment {} does not exist",
                note.appointment_id
            )));
        }
        state.notes.insert(note.id, note.clone());
        Ok(())
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
    ) -> Result<Option<ClinicalNote>, ClinicalNoteRepositoryError> {
        let state = self.lock()?;
        Ok(state
            .notes
            .get(id)
            .filter(|note| note.tenant_id == *tenant_id)
            .cloned())
    }

    async fn update_body(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
        body: &NoteBody,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ClinicalNoteRepositoryError> {
        let mut state = self.lock()?;
        match state
            .notes
            .get_mut(id)
            .filter(|note| note.tenant_id == *tenant_id)
        {
            Some(note) => {
                note.body = body.clone();
                note.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
    ) -> Result<bool, ClinicalNoteRepositoryError> {
        let mut state = self.lock()?;
        let owned = state
            .notes
            .get(id)
            .is_some_and(|note| note.tenant_id == *tenant_id);
        if owned {
            state.notes.remove(id);
        }
        Ok(owned)
    }

    async fn list_for_appointment(
        &self,
        tenant_id: &TenantId,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ClinicalNote>, ClinicalNoteRepositoryError> {
        let state = self.lock()?;
        let mut notes: Vec<ClinicalNote> = state
            .notes
            .values()
            .filter(|note| note.tenant_id == *tenant_id && note.appointment_id == *appointment_id)
            .cloned()
            .collect();
        notes.sort_by_key(|note| note.created_at);
        Ok(notes)
    }
}

fn newest_first(a: DateTime<Utc>, b: DateTime<Utc>) -> std::cmp::Ordering {
    b.cmp(&a)
}
