//! Resolves the session user into an [`Actor`] for the role gate.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{
    ActorResolver, PatientRepository, ReceptionRepository, TenantRepository, UserRepository,
};
use crate::domain::{Actor, Error, MembershipResolver, UserId};

/// [`ActorResolver`] backed by the identity store and tenant links.
pub struct ActorService<U, T, R, P> {
    users: Arc<U>,
    membership: MembershipResolver<T, R, P>,
}

impl<U, T, R, P> Clone for ActorService<U, T, R, P> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            membership: self.membership.clone(),
        }
    }
}

impl<U, T, R, P> ActorService<U, T, R, P> {
    pub fn new(users: Arc<U>, membership: MembershipResolver<T, R, P>) -> Self {
        Self { users, membership }
    }
}

#[async_trait]
impl<U, T, R, P> ActorResolver for ActorService<U, T, R, P>
where
    U: UserRepository,
    T: TenantRepository,
    R: ReceptionRepository,
    P: PatientRepository,
{
    async fn resolve(&self, user_id: &UserId) -> Result<Actor, Error> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            debug!(%user_id, "session refers to an unknown user");
            return Err(Error::unauthorized("login required"));
        };
        if !user.is_active() {
            debug!(%user_id, "session refers to an inactive user");
            return Err(Error::unauthorized("login required"));
        }
        let membership = self.membership.membership(&user).await?;
        Ok(Actor {
            user_id: user.id(),
            role: user.role(),
            membership,
        })
    }
}
