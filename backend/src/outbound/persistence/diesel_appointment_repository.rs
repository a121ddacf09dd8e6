//! PostgreSQL-backed appointment ledger.
//!
//! `update_schedule` writes only `date` and `status`; the cost column is set
//! by the insert and never touched again.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AppointmentListing, AppointmentRepository, AppointmentRepositoryError,
};
use crate::domain::{
    Age, Appointment, AppointmentId, AppointmentStatus, PatientId, TenantId, UserId, Username,
};

use super::diesel_error_mapping::{
    collect_rows, map_diesel_error, map_pool_error, map_row_error,
};
use super::models::{AppointmentRow, AppointmentScheduleUpdate};
use super::pool::DbPool;
use super::schema::{appointments, patients, users};

/// Diesel-backed implementation of [`AppointmentRepository`].
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type ListingRow = (AppointmentRow, uuid::Uuid, String, i16);

fn into_listing((row, user_id, username, age): ListingRow) -> Result<AppointmentListing, String> {
    Ok(AppointmentListing {
        appointment: row.into_appointment()?,
        patient_user_id: UserId::from_uuid(user_id),
        patient_username: Username::new(&username).map_err(|err| err.to_string())?,
        patient_age: Age::new(i64::from(age)).map_err(|err| err.to_string())?,
    })
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let row = AppointmentRow::from_appointment(appointment)
            .map_err(map_row_error::<AppointmentRepositoryError>)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        diesel::insert_into(appointments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error::<AppointmentRepositoryError>)
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        let row: Option<AppointmentRow> = appointments::table
            .filter(appointments::id.eq(id.as_uuid()))
            .filter(appointments::tenant_id.eq(tenant_id.as_uuid()))
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<AppointmentRepositoryError>)?;
        row.map(AppointmentRow::into_appointment)
            .transpose()
            .map_err(map_row_error::<AppointmentRepositoryError>)
    }

    async fn update_schedule(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        let changes = AppointmentScheduleUpdate {
            date: appointment.date(),
            status: appointment.status().as_str(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        let updated = diesel::update(
            appointments::table
                .filter(appointments::id.eq(appointment.id().as_uuid()))
                .filter(appointments::tenant_id.eq(appointment.tenant_id().as_uuid())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error::<AppointmentRepositoryError>)?;
        if updated == 0 {
            return Err(AppointmentRepositoryError::query(format!(
                "appointment {} not found",
                appointment.id()
            )));
        }
        Ok(())
    }

    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<AppointmentListing>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        let rows: Vec<ListingRow> = appointments::table
            .inner_join(patients::table.inner_join(users::table))
            .filter(appointments::tenant_id.eq(tenant_id.as_uuid()))
            .order_by(appointments::created_at.desc())
            .select((
                AppointmentRow::as_select(),
                users::id,
                users::username,
                patients::age,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<AppointmentRepositoryError>)?;
        collect_rows(rows, into_listing)
    }

    async fn list_for_patient(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        let rows: Vec<AppointmentRow> = appointments::table
            .filter(appointments::tenant_id.eq(tenant_id.as_uuid()))
            .filter(appointments::patient_id.eq(patient_id.as_uuid()))
            .order_by(appointments::created_at.desc())
            .select(AppointmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<AppointmentRepositoryError>)?;
        collect_rows(rows, AppointmentRow::into_appointment)
    }

    async fn count_pending(&self, tenant_id: &TenantId) -> Result<u64, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<AppointmentRepositoryError>)?;
        let count: i64 = appointments::table
            .filter(appointments::tenant_id.eq(tenant_id.as_uuid()))
            .filter(appointments::status.eq(AppointmentStatus::Pending.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error::<AppointmentRepositoryError>)?;
        u64::try_from(count).map_err(|err| map_row_error(err.to_string()))
    }
}
