//! PostgreSQL-backed tenant registry.
//!
//! Provisioning inserts the doctor, the tenant, and its primary domain in one
//! transaction. Deletion removes every user linked to the tenant; foreign key
//! cascades take the tenant row and all tenant-scoped records with them.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{TenantProvision, TenantRepository, TenantRepositoryError};
use crate::domain::{Tenant, TenantDomain, TenantId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, map_row_error};
use super::models::{TenantDomainRow, TenantRow, UserRow};
use super::pool::DbPool;
use super::schema::{patients, receptions, tenant_domains, tenants, users};

/// Diesel-backed implementation of [`TenantRepository`].
#[derive(Clone)]
pub struct DieselTenantRepository {
    pool: DbPool,
}

impl DieselTenantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_tenant(row: Option<TenantRow>) -> Result<Option<Tenant>, TenantRepositoryError> {
    row.map(TenantRow::into_tenant)
        .transpose()
        .map_err(map_row_error::<TenantRepositoryError>)
}

#[async_trait]
impl TenantRepository for DieselTenantRepository {
    async fn provision(&self, provision: &TenantProvision) -> Result<(), TenantRepositoryError> {
        let user_row = UserRow::from_user(&provision.doctor)
            .map_err(map_row_error::<TenantRepositoryError>)?;
        let tenant_row = TenantRow::from_tenant(&provision.tenant)
            .map_err(map_row_error::<TenantRepositoryError>)?;
        let domain_row = TenantDomainRow::from_domain(&provision.domain);
        let mut conn = self.pool.get().await.map_err(map_pool_error::<TenantRepositoryError>)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tenants::table)
                    .values(&tenant_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(tenant_domains::table)
                    .values(&domain_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error::<TenantRepositoryError>)
    }

    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, TenantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<TenantRepositoryError>)?;
        let row = tenants::table
            .find(id.as_uuid())
            .select(TenantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<TenantRepositoryError>)?;
        into_tenant(row)
    }

    async fn find_by_doctor(
        &self,
        doctor_user_id: &UserId,
    ) -> Result<Option<Tenant>, TenantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<TenantRepositoryError>)?;
        let row = tenants::table
            .filter(tenants::doctor_user_id.eq(doctor_user_id.as_uuid()))
            .select(TenantRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<TenantRepositoryError>)?;
        into_tenant(row)
    }

    async fn primary_domain(
        &self,
        id: &TenantId,
    ) -> Result<Option<TenantDomain>, TenantRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<TenantRepositoryError>)?;
        let row = tenant_domains::table
            .filter(tenant_domains::tenant_id.eq(id.as_uuid()))
            .filter(tenant_domains::is_primary.eq(true))
            .select(TenantDomainRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<TenantRepositoryError>)?;
        row.map(TenantDomainRow::into_domain)
            .transpose()
            .map_err(map_row_error::<TenantRepositoryError>)
    }

    async fn delete(&self, id: &TenantId) -> Result<bool, TenantRepositoryError> {
        let tenant_id = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error::<TenantRepositoryError>)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let doctor: Option<Uuid> = tenants::table
                    .find(tenant_id)
                    .select(tenants::doctor_user_id)
                    .first(conn)
                    .await
                    .optional()?;
                let Some(doctor) = doctor else {
                    return Ok(false);
                };

                let mut user_ids: Vec<Uuid> = patients::table
                    .filter(patients::tenant_id.eq(tenant_id))
                    .select(patients::user_id)
                    .load(conn)
                    .await?;
                let reception_users: Vec<Uuid> = receptions::table
                    .filter(receptions::tenant_id.eq(tenant_id))
                    .select(receptions::user_id)
                    .load(conn)
                    .await?;
                user_ids.extend(reception_users);
                user_ids.push(doctor);

                let removed = diesel::delete(users::table.filter(users::id.eq_any(&user_ids)))
                    .execute(conn)
                    .await?;
                debug!(%tenant_id, removed, "tenant users removed");
                Ok(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error::<TenantRepositoryError>)
    }
}
