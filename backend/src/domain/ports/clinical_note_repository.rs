//! Port abstraction for clinical notes.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AppointmentId, ClinicalNote, NoteBody, NoteId, TenantId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by clinical note adapters.
    pub enum ClinicalNoteRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "clinical note repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String }
            => "clinical note repository query failed: {message}"; InternalError,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicalNoteRepository: Send + Sync {
    async fn insert(&self, note: &ClinicalNote) -> Result<(), ClinicalNoteRepositoryError>;

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
    ) -> Result<Option<ClinicalNote>, ClinicalNoteRepositoryError>;

    /// Replace the text of a note. Returns `false` when it does not exist.
    async fn update_body(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
        body: &NoteBody,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ClinicalNoteRepositoryError>;

    /// Returns `false` when the note does not exist.
    async fn delete(&self, tenant_id: &TenantId, id: &NoteId)
    -> Result<bool, ClinicalNoteRepositoryError>;

    /// Notes of an appointment, oldest first.
    async fn list_for_appointment(
        &self,
        tenant_id: &TenantId,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ClinicalNote>, ClinicalNoteRepositoryError>;
}

