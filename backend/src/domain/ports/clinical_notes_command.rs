//! Driving port for doctor-only clinical note edits.

use async_trait::async_trait;

use crate::domain::{Actor, AppointmentId, ClinicalNote, Error, NoteId, NoteKind};

#[async_trait]
pub trait ClinicalNotesCommand: Send + Sync {
    async fn create(
        &self,
        actor: &Actor,
        appointment_id: &AppointmentId,
        kind: NoteKind,
        text: &str,
    ) -> Result<ClinicalNote, Error>;

    async fn update(&self, actor: &Actor, id: &NoteId, text: &str) -> Result<ClinicalNote, Error>;

    async fn delete(&self, actor: &Actor, id: &NoteId) -> Result<(), Error>;
}
