//! PostgreSQL-backed `PatientRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{PatientListing, PatientRepository, PatientRepositoryError};
use crate::domain::{Patient, PatientId, PhoneNumber, TenantId, User, UserId, Username};

use super::diesel_error_mapping::{
    collect_rows, map_diesel_error, map_pool_error, map_row_error,
};
use super::models::{PatientRow, UserRow};
use super::pool::DbPool;
use super::schema::{patients, users};

/// Diesel-backed implementation of [`PatientRepository`].
#[derive(Clone)]
pub struct DieselPatientRepository {
    pool: DbPool,
}

impl DieselPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_patient(row: Option<PatientRow>) -> Result<Option<Patient>, PatientRepositoryError> {
    row.map(PatientRow::into_patient)
        .transpose()
        .map_err(map_row_error::<PatientRepositoryError>)
}

fn into_listing((patient, username, phone): (PatientRow, String, String)) -> Result<PatientListing, String> {
    let patient = patient.into_patient()?;
    Ok(PatientListing {
        patient_id: patient.id,
        user_id: patient.user_id,
        username: Username::new(&username).map_err(|err| err.to_string())?,
        phone: PhoneNumber::new(&phone).map_err(|err| err.to_string())?,
        age: patient.age,
        created_at: patient.created_at,
    })
}

#[async_trait]
impl PatientRepository for DieselPatientRepository {
    async fn create(&self, user: &User, patient: &Patient) -> Result<(), PatientRepositoryError> {
        let user_row = UserRow::from_user(user).map_err(map_row_error::<PatientRepositoryError>)?;
        let patient_row = PatientRow::from(patient);
        let mut conn = self.pool.get().await.map_err(map_pool_error::<PatientRepositoryError>)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(patients::table)
                    .values(&patient_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error::<PatientRepositoryError>)
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<PatientRepositoryError>)?;
        let row = patients::table
            .filter(patients::user_id.eq(user_id.as_uuid()))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<PatientRepositoryError>)?;
        into_patient(row)
    }

    async fn find(
        &self,
        tenant_id: &TenantId,
        patient_id: &PatientId,
    ) -> Result<Option<Patient>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<PatientRepositoryError>)?;
        let row = patients::table
            .filter(patients::id.eq(patient_id.as_uuid()))
            .filter(patients::tenant_id.eq(tenant_id.as_uuid()))
            .select(PatientRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<PatientRepositoryError>)?;
        into_patient(row)
    }

    async fn list_for_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<PatientListing>, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<PatientRepositoryError>)?;
        let rows: Vec<(PatientRow, String, String)> = patients::table
            .inner_join(users::table)
            .filter(patients::tenant_id.eq(tenant_id.as_uuid()))
            .order_by(patients::created_at.desc())
            .select((PatientRow::as_select(), users::username, users::phone))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error::<PatientRepositoryError>)?;
        collect_rows(rows, into_listing)
    }

    async fn count_for_tenant(&self, tenant_id: &TenantId) -> Result<u64, PatientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<PatientRepositoryError>)?;
        let count: i64 = patients::table
            .filter(patients::tenant_id.eq(tenant_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error::<PatientRepositoryError>)?;
        u64::try_from(count).map_err(|err| map_row_error(err.to_string()))
    }
}
