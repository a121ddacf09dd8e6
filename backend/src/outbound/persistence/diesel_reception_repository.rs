//! PostgreSQL-backed `ReceptionRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{ReceptionRepository, ReceptionRepositoryError};
use crate::domain::{Reception, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, map_row_error};
use super::models::{ReceptionRow, UserRow};
use super::pool::DbPool;
use super::schema::{receptions, users};

/// Diesel-backed implementation of [`ReceptionRepository`].
#[derive(Clone)]
pub struct DieselReceptionRepository {
    pool: DbPool,
}

impl DieselReceptionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceptionRepository for DieselReceptionRepository {
    async fn create(
        &self,
        user: &User,
        reception: &Reception,
    ) -> Result<(), ReceptionRepositoryError> {
        let user_row = UserRow::from_user(user).map_err(map_row_error::<ReceptionRepositoryError>)?;
        let reception_row = ReceptionRow::from(reception);
        let mut conn = self.pool.get().await.map_err(map_pool_error::<ReceptionRepositoryError>)?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(receptions::table)
                    .values(&reception_row)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error::<ReceptionRepositoryError>)
    }

    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Reception>, ReceptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<ReceptionRepositoryError>)?;
        let row: Option<ReceptionRow> = receptions::table
            .filter(receptions::user_id.eq(user_id.as_uuid()))
            .select(ReceptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<ReceptionRepositoryError>)?;
        Ok(row.map(Reception::from))
    }
}
