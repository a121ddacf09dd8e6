//! Account provisioning.
//!
//! `new_account` is the single place where a password becomes a credential;
//! registration and tenant onboarding build their users through it as well.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHasher, UserRepository};
use crate::domain::{
    Credential, Error, PhoneNumber, Role, User, UserDraft, UserId, Username,
};

/// Raw input for a standalone account.
#[derive(Debug, Clone)]
pub struct ProvisionUserRequest {
    pub username: String,
    pub phone: String,
    pub role: Role,
    pub password: Option<Zeroizing<String>>,
}

/// Build a user, hashing `password` when one is supplied.
///
/// An empty password counts as absent, so patients end up passwordless and
/// every other role is rejected.
pub(crate) fn new_account<H>(
    hasher: &H,
    username: Username,
    phone: PhoneNumber,
    role: Role,
    password: Option<&str>,
    now: DateTime<Utc>,
) -> Result<User, Error>
where
    H: CredentialHasher + ?Sized,
{
    let credential = match password.filter(|value| !value.is_empty()) {
        Some(value) => Credential::Password(hasher.hash(value)?),
        None => Credential::Unusable,
    };
    let user = User::new(UserDraft {
        id: UserId::random(),
        username,
        phone,
        role,
        credential,
        created_at: now,
    })?;
    Ok(user)
}

/// Creates accounts that are not tied to a tenant.
#[derive(Clone)]
pub struct IdentityService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> IdentityService<U, H>
where
    U: UserRepository,
    H: CredentialHasher,
{
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }

    /// Validate and store a new account.
    pub async fn provision_user(&self, request: ProvisionUserRequest) -> Result<User, Error> {
        let username = Username::new(&request.username)?;
        let phone = PhoneNumber::new(&request.phone)?;
        let user = new_account(
            self.hasher.as_ref(),
            username,
            phone,
            request.role,
            request.password.as_deref().map(String::as_str),
            self.clock.utc(),
        )?;
        self.users.insert(&user).await?;
        info!(user_id = %user.id(), role = %user.role(), "account provisioned");
        Ok(user)
    }

    /// Create an admin account; a password is mandatory.
    pub async fn provision_superuser(
        &self,
        username: &str,
        phone: &str,
        password: Zeroizing<String>,
    ) -> Result<User, Error> {
        self.provision_user(ProvisionUserRequest {
            username: username.to_owned(),
            phone: phone.to_owned(),
            role: Role::Admin,
            password: Some(password),
        })
        .await
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;
