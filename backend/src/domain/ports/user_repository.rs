//! Port abstraction for the identity store and its errors.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{LockoutPolicy, LoginAttempts, PhoneNumber, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by identity store adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "user repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}"; InternalError,
        /// A unique column (`username` or `phone`) already holds the value.
        Duplicate { field: String } => "a user with this {field} already exists"; Conflict {
            "field": field,
            "code": "duplicate",
        },
    }
}

/// Identity store access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised phone number.
    async fn find_by_phone(&self, phone: &PhoneNumber)
    -> Result<Option<User>, UserPersistenceError>;

    /// Count one failed login against `id` as a single atomic update.
    ///
    /// Concurrent failures must each be counted. An expired suspension starts
    /// a fresh window; an active one is kept. Returns the stored state after
    /// the update.
    async fn record_failed_attempt(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> Result<LoginAttempts, UserPersistenceError>;

    /// Clear the failure counter and any suspension after a successful login.
    async fn record_successful_login(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<(), UserPersistenceError>;
}

