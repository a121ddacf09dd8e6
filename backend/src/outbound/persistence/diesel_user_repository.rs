//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Timestamptz, Uuid as SqlUuid};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{LockoutPolicy, LoginAttempts, PhoneNumber, User, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, map_row_error};
use super::models::{LoginAttemptsRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed identity store.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Count one failure in a single statement.
///
/// The row lock taken by `UPDATE` serialises concurrent failures, so every
/// one is counted. `$2` is the attempt time, `$3` the lock threshold and `$4`
/// the expiry a new suspension receives. An expired suspension restarts the
/// count at one; an active one keeps its expiry.
const RECORD_FAILURE_SQL: &str = r#"
UPDATE users
SET failed_login_attempts = CASE
        WHEN account_locked_until <= $2 THEN 1
        ELSE failed_login_attempts + 1
    END,
    account_locked_until = CASE
        WHEN account_locked_until > $2 THEN account_locked_until
        WHEN account_locked_until <= $2 THEN CASE WHEN 1 >= $3 THEN $4 END
        WHEN failed_login_attempts + 1 >= $3 THEN $4
        ELSE NULL
    END,
    last_login_attempt = $2
WHERE id = $1
RETURNING failed_login_attempts, last_login_attempt, account_locked_until
"#;

fn into_user(row: Option<UserRow>) -> Result<Option<User>, UserPersistenceError> {
    row.map(UserRow::into_user).transpose().map_err(map_row_error::<UserPersistenceError>)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let row = UserRow::from_user(user).map_err(map_row_error::<UserPersistenceError>)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error::<UserPersistenceError>)?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error::<UserPersistenceError>)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<UserPersistenceError>)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<UserPersistenceError>)?;
        into_user(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<UserPersistenceError>)?;
        let row = users::table
            .filter(users::username.eq(username.trim()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<UserPersistenceError>)?;
        into_user(row)
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error::<UserPersistenceError>)?;
        let row = users::table
            .filter(users::phone.eq(phone.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<UserPersistenceError>)?;
        into_user(row)
    }

    async fn record_failed_attempt(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> Result<LoginAttempts, UserPersistenceError> {
        let max_attempts = i32::try_from(policy.max_attempts()).unwrap_or(i32::MAX);
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<UserPersistenceError>)?;
        let row = sql_query(RECORD_FAILURE_SQL)
            .bind::<SqlUuid, _>(*id.as_uuid())
            .bind::<Timestamptz, _>(now)
            .bind::<Integer, _>(max_attempts)
            .bind::<Timestamptz, _>(now + policy.duration())
            .get_result::<LoginAttemptsRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error::<UserPersistenceError>)?
            .ok_or_else(|| UserPersistenceError::query(format!("user {id} not found")))?;
        row.into_attempts()
            .map_err(map_row_error::<UserPersistenceError>)
    }

    async fn record_successful_login(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(map_pool_error::<UserPersistenceError>)?;
        let updated = diesel::update(users::table.filter(users::id.eq(*id.as_uuid())))
            .set((
                users::failed_login_attempts.eq(0),
                users::last_login_attempt.eq(Some(now)),
                users::account_locked_until.eq(None::<DateTime<Utc>>),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error::<UserPersistenceError>)?;
        if updated == 0 {
            return Err(UserPersistenceError::query(format!("user {id} not found")));
        }
        Ok(())
    }
}
