//! Driving port that turns a session user id into an [`Actor`].

use async_trait::async_trait;

use crate::domain::{Actor, Error, UserId};

#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// Load the user and their tenant membership.
    ///
    /// Unknown or inactive users resolve to an unauthorised error so stale
    /// sessions are treated as signed out.
    async fn resolve(&self, user_id: &UserId) -> Result<Actor, Error>;
}
