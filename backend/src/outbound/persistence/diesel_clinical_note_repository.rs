//! PostgreSQL-backed `ClinicalNoteRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ClinicalNoteRepository, ClinicalNoteRepositoryError};
use crate::domain::{AppointmentId, ClinicalNote, NoteBody, NoteId, TenantId};

use super::diesel_error_mapping::{
    collect_rows, map_diesel_error, map_pool_error, map_row_error,
};
use super::models::ClinicalNoteRow;
use super::pool::DbPool;
use super::schema::clinical_notes;

/// Diesel-backed implementation of [`ClinicalNoteRepository`].
#[derive(Clone)]
pub struct DieselClinicalNoteRepository {
    pool: DbPool,
}

impl DieselClinicalNoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicalNoteRepository for DieselClinicalNoteRepository {
    async fn insert(&self, note: &ClinicalNote) -> Result<(), ClinicalNoteRepositoryError> {
        let row = ClinicalNoteRow::from(note);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<ClinicalNoteRepositoryError>)?;
        diesel::insert_into(clinical_notes::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error::<ClinicalNoteRepositoryError>)
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
    ) -> Result<Option<ClinicalNote>, ClinicalNoteRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<ClinicalNoteRepositoryError>)?;
        let row: Option<ClinicalNoteRow> = clinical_notes::table
            .filter(clinical_notes::id.eq(id.as_uuid()))
            .filter(clinical_notes::tenant_id.eq(tenant_id.as_uuid()))
            .select(ClinicalNoteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<ClinicalNoteRepositoryError>)?;
        row.map(ClinicalNoteRow::into_note)
            .transpose()
            .map_err(map_row_error::<ClinicalNoteRepositoryError>)
    }

    async fn update_body(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
        body: &NoteBody,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, ClinicalNoteRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<ClinicalNoteRepositoryError>)?;
        let updated = diesel::update(
            clinical_notes::table
                .filter(clinical_notes::id.eq(id.as_uuid()))
                .filter(clinical_notes::tenant_id.eq(tenant_id.as_uuid())),
        )
        .set((
            clinical_notes::body.eq(body.as_ref()),
            clinical_notes::updated_at.eq(updated_at),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error::<ClinicalNoteRepositoryError>)?;
        Ok(updated > 0)
    }

    async fn delete(
        &self,
        tenant_id: &TenantId,
        id: &NoteId,
    ) -> Result<bool, ClinicalNoteRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<ClinicalNoteRepositoryError>)?;
        let deleted = diesel::delete(
            clinical_notes::table
                .filter(clinical_notes::id.eq(id.as_uuid()))
                .filter(clinical_notes::tenant_id.eq(tenant_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error::<ClinicalNoteRepositoryError>)?;
        Ok(deleted > 0)
    }

    async fn list_for_appointment(
        &self,
        tenant_id: &TenantId,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ClinicalNote>, ClinicalNoteRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<ClinicalNoteRepositoryError>)?;
        let rows: Vec<ClinicalNoteRow> = clinical_notes::table
            .filter(clinical_notes::tenant_id.eq(tenant_id.as_uuid()))
            .filter(clinical_notes::appointment_id.eq(appointment_id.as_uuid()))
            .order_by(clinical_notes::created_at.asc())
            .select(ClinicalNoteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<ClinicalNoteRepositoryError>)?;
        collect_rows(rows, ClinicalNoteRow::into_note)
    }
}
