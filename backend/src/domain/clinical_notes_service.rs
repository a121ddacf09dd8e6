//! Doctor-only edits to diagnoses, prescriptions, and requirements.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{AppointmentRepository, ClinicalNoteRepository, ClinicalNotesCommand};
use crate::domain::{
    Actor, AppointmentId, ClinicalNote, Error, NoteBody, NoteId, NoteKind,
};

/// [`ClinicalNotesCommand`] scoped to the doctor's tenant.
pub struct ClinicalNotesService<A, N> {
    appointments: Arc<A>,
    notes: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<A, N> Clone for ClinicalNotesService<A, N> {
    fn clone(&self) -> Self {
        Self {
            appointments: Arc::clone(&self.appointments),
            notes: Arc::clone(&self.notes),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A, N> ClinicalNotesService<A, N> {
    pub fn new(appointments: Arc<A>, notes: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            appointments,
            notes,
            clock,
        }
    }
}

fn note_not_found() -> Error {
    Error::not_found("note not found")
}

#[async_trait]
impl<A, N> ClinicalNotesCommand for ClinicalNotesService<A, N>
where
    A: AppointmentRepository,
    N: ClinicalNoteRepository,
{
    async fn create(
        &self,
        actor: &Actor,
        appointment_id: &AppointmentId,
        kind: NoteKind,
        text: &str,
    ) -> Result<ClinicalNote, Error> {
        let tenant_id = actor.require_doctor()?;
        let body = NoteBody::new(kind, text)?;
        let appointment = self
            .appointments
            .find(&tenant_id, appointment_id)
            .await?
            .ok_or_else(|| Error::not_found("appointment not found"))?;

        let now = self.clock.utc();
        let note = ClinicalNote {
            id: NoteId::random(),
            appointment_id: appointment.id(),
            tenant_id,
            kind,
            body,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(&note).await?;
        info!(%tenant_id, note_id = %note.id, kind = %kind, "clinical note recorded");
        Ok(note)
    }

    async fn update(&self, actor: &Actor, id: &NoteId, text: &str) -> Result<ClinicalNote, Error> {
        let tenant_id = actor.require_doctor()?;
        let mut note = self
            .notes
            .find(&tenant_id, id)
            .await?
            .ok_or_else(note_not_found)?;
        let body = NoteBody::new(note.kind, text)?;
        let now = self.clock.utc();
        if !self.notes.update_body(&tenant_id, id, &body, now).await? {
            return Err(note_not_found());
        }
        note.body = body;
        note.updated_at = now;
        Ok(note)
    }

    async fn delete(&self, actor: &Actor, id: &NoteId) -> Result<(), Error> {
        let tenant_id = actor.require_doctor()?;
        if !self.notes.delete(&tenant_id, id).await? {
            return Err(note_not_found());
        }
        info!(%tenant_id, note_id = %id, "clinical note deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAppointmentRepository, MockClinicalNoteRepository};
    use crate::domain::{Appointment, ErrorCode, NewAppointment};
    use crate::outbound::memory::InMemoryClinicStore;
    use crate::test_support::{FIXTURE_RATES, MutableClock, SeededClinic, seed_clinic};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    type Service = ClinicalNotesService<InMemoryClinicStore, InMemoryClinicStore>;

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
    }

    async fn setup(today: NaiveDate) -> (SeededClinic, Appointment, Arc<MutableClock>, Service) {
        let store = Arc::new(InMemoryClinicStore::new());
        let clock = Arc::new(MutableClock::on(today));
        let clinic = seed_clinic(&store, "mona", 1, clock.utc()).await;
        let appointment = Appointment::schedule(
            NewAppointment {
                id: AppointmentId::random(),
                patient_id: clinic.patient.id,
                tenant_id: clinic.tenant.id,
                date: today,
                is_prior: false,
            },
            FIXTURE_RATES,
            today,
            clock.utc(),
        )
        .expect("valid appointment");
        AppointmentRepository::insert(store.as_ref(), &appointment)
            .await
            .expect("insert appointment");
        let service = ClinicalNotesService::new(Arc::clone(&store), store, clock.clone());
        (clinic, appointment, clock, service)
    }

    #[rstest]
    #[tokio::test]
    async fn doctors_record_update_and_delete_notes(today: NaiveDate) {
        let (clinic, appointment, clock, service) = setup(today).await;
        let doctor = clinic.doctor_actor();

        let note = service
            .create(&doctor, &appointment.id(), NoteKind::Diagnosis, " seasonal flu ")
            .await
            .expect("created");
        assert_eq!(note.body.as_ref(), "seasonal flu");

        clock.advance_minutes(10);
        let updated = service
            .update(&doctor, &note.id, "influenza A")
            .await
            .expect("updated");
        assert_eq!(updated.body.as_ref(), "influenza A");
        assert!(updated.updated_at > note.created_at);

        service.delete(&doctor, &note.id).await.expect("deleted");
        let err = service
            .delete(&doctor, &note.id)
            .await
            .expect_err("already gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn reception_cannot_write_notes(today: NaiveDate) {
        let (clinic, appointment, _, service) = setup(today).await;

        let err = service
            .create(
                &clinic.reception_actor(),
                &appointment.id(),
                NoteKind::Requires,
                "x-ray",
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(NoteKind::Prescription, String::new())]
    #[case(NoteKind::Prescription, "p".repeat(101))]
    #[case(NoteKind::Diagnosis, "d".repeat(201))]
    #[tokio::test]
    async fn invalid_note_text_is_rejected(
        today: NaiveDate,
        #[case] kind: NoteKind,
        #[case] text: String,
    ) {
        let (clinic, appointment, _, service) = setup(today).await;

        let err = service
            .create(&clinic.doctor_actor(), &appointment.id(), kind, &text)
            .await
            .expect_err("invalid text");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_appointments_are_not_found(today: NaiveDate) {
        let mut appointments = MockAppointmentRepository::new();
        appointments.expect_find().return_once(|_, _| Ok(None));
        let mut notes = MockClinicalNoteRepository::new();
        notes.expect_insert().times(0);
        let service = ClinicalNotesService::new(
            Arc::new(appointments),
            Arc::new(notes),
            Arc::new(MutableClock::on(today)),
        );
        let doctor = Actor {
            user_id: crate::domain::UserId::random(),
            role: crate::domain::Role::Doctor,
            membership: crate::domain::Membership::Doctor {
                tenant_id: crate::domain::TenantId::random(),
            },
        };

        let err = service
            .create(&doctor, &AppointmentId::random(), NoteKind::Diagnosis, "flu")
            .await
            .expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
