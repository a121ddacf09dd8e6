//! Port abstraction for reception staff records.
use async_trait::async_trait;

use crate::domain::{Reception, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by reception repository adapters.
    pub enum ReceptionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "reception repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "reception repository query failed: {message}"; InternalError,
        /// The reception user clashes with an existing account.
        Duplicate { field: String } => "a user with this {field} already exists"; Conflict {
            "field": field,
            "code": "duplicate",
        },
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReceptionRepository: Send + Sync {
    /// Insert the reception user and its tenant link together.
    async fn create(&self, user: &User, reception: &Reception)
    -> Result<(), ReceptionRepositoryError>;

    /// Fetch the reception record linked to a user.
    async fn find_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Reception>, ReceptionRepositoryError>;
}

