//! Login use-cases guarded by the lockout policy.
//!
//! Staff sign in with username and password; patients with phone and
//! username. Both paths check the lock before looking at credentials, count
//! failures against the matched account, and reset the counter on success.
//! Counting is delegated to the store as one atomic update, so parallel
//! failures cannot overwrite each other.
//! The redirect target comes from the primary domain of the actor's tenant.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CredentialHasher, LoginOutcome, LoginService, PatientRepository, ReceptionRepository,
    TenantRepository, UserRepository,
};
use crate::domain::{
    Error, FailureOutcome, LockoutPolicy, Membership, MembershipResolver, PatientCredentials,
    Role, StaffCredentials, TenantId, User, UserId,
};

/// Port used in staff redirects when none is configured.
pub const DEFAULT_TENANT_PORT: u16 = 8000;

/// Tunables for the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginSettings {
    pub lockout: LockoutPolicy,
    pub tenant_port: u16,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            lockout: LockoutPolicy::default(),
            tenant_port: DEFAULT_TENANT_PORT,
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn locked(message: &str, until: DateTime<Utc>) -> Error {
    Error::locked(message).with_details(json!({ "lockedUntil": until.to_rfc3339() }))
}

const STAFF_LOCKED: &str = "account locked; try again later";
const PATIENT_LOCKED: &str = "account locked; contact reception";

/// [`LoginService`] over the identity store and tenant registry.
pub struct AuthenticationService<U, T, R, P, H> {
    users: Arc<U>,
    membership: MembershipResolver<T, R, P>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    settings: LoginSettings,
}

impl<U, T, R, P, H> Clone for AuthenticationService<U, T, R, P, H> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            membership: self.membership.clone(),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
            settings: self.settings,
        }
    }
}

impl<U, T, R, P, H> AuthenticationService<U, T, R, P, H>
where
    U: UserRepository,
    T: TenantRepository,
    R: ReceptionRepository,
    P: PatientRepository,
    H: CredentialHasher,
{
    pub fn new(
        users: Arc<U>,
        membership: MembershipResolver<T, R, P>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
        settings: LoginSettings,
    ) -> Self {
        Self {
            users,
            membership,
            hasher,
            clock,
            settings,
        }
    }

    /// Count a failure against `user` in one atomic store update.
    async fn register_failure(&self, user: &User, now: DateTime<Utc>) -> Result<FailureOutcome, Error> {
        let lockout = self.settings.lockout;
        let attempts = self
            .users
            .record_failed_attempt(&user.id(), now, lockout)
            .await?;
        let outcome = lockout.assess(&attempts, now);
        match outcome {
            FailureOutcome::Remaining(remaining) => {
                debug!(user_id = %user.id(), remaining, "login attempt failed");
            }
            FailureOutcome::Locked { until } => {
                warn!(user_id = %user.id(), until = %until, "account locked after repeated failures");
            }
        }
        Ok(outcome)
    }

    async fn register_success(&self, user: &User, now: DateTime<Utc>) -> Result<(), Error> {
        self.users.record_successful_login(&user.id(), now).await?;
        Ok(())
    }

    async fn primary_host(&self, tenant_id: &TenantId) -> Result<Option<String>, Error> {
        let domain = self
            .membership
            .tenants()
            .primary_domain(tenant_id)
            .await?;
        Ok(domain.map(|domain| domain.domain.to_string()))
    }

    async fn staff_redirect(&self, user: &User) -> Result<String, Error> {
        let tenant_id = match self.membership.membership(user).await? {
            Membership::Doctor { tenant_id } | Membership::Reception { tenant_id } => tenant_id,
            Membership::Patient { .. } | Membership::Unaffiliated => {
                info!(user_id = %user.id(), "staff login refused: no clinic linked");
                return Err(Error::forbidden("no clinic is linked to this account")
                    .with_details(json!({ "redirect": "/" })));
            }
        };
        match self.primary_host(&tenant_id).await? {
            Some(host) => Ok(format!("http://{host}:{}/", self.settings.tenant_port)),
            None => {
                warn!(%tenant_id, "tenant has no primary domain; using dashboard fallback");
                Ok("/dashboard".to_owned())
            }
        }
    }

    async fn patient_redirect(&self, user: &User) -> Result<String, Error> {
        let user_id = user.id();
        let fallback = profile_fallback(&user_id);
        let tenant_id = match self.membership.membership(user).await? {
            Membership::Patient { tenant_id, .. } => tenant_id,
            _ => {
                warn!(%user_id, "patient account has no patient record; using profile fallback");
                return Ok(fallback);
            }
        };
        match self.primary_host(&tenant_id).await? {
            Some(host) => Ok(format!("http://{host}/patient-profile/{user_id}")),
            None => {
                warn!(%tenant_id, "tenant has no primary domain; using profile fallback");
                Ok(fallback)
            }
        }
    }
}

fn profile_fallback(user_id: &UserId) -> String {
    format!("/patients/{user_id}/profile")
}

#[async_trait]
impl<U, T, R, P, H> LoginService for AuthenticationService<U, T, R, P, H>
where
    U: UserRepository,
    T: TenantRepository,
    R: ReceptionRepository,
    P: PatientRepository,
    H: CredentialHasher,
{
    async fn login_staff(&self, credentials: &StaffCredentials) -> Result<LoginOutcome, Error> {
        let now = self.clock.utc();
        let Some(user) = self.users.find_by_username(credentials.username()).await? else {
            debug!("staff login for unknown username");
            return Err(invalid_credentials());
        };
        if !user.is_active() {
            return Err(invalid_credentials());
        }
        if let Some(until) = self
            .settings
            .lockout
            .locked_until(user.login_attempts(), now)
        {
            return Err(locked(STAFF_LOCKED, until));
        }

        let verified = user.role().is_staff_member()
            && user
                .credential()
                .password_hash()
                .is_some_and(|hash| self.hasher.verify(credentials.password(), hash));
        if !verified {
            return Err(match self.register_failure(&user, now).await? {
                FailureOutcome::Remaining(remaining) => {
                    invalid_credentials().with_details(json!({ "remainingAttempts": remaining }))
                }
                FailureOutcome::Locked { until } => locked(STAFF_LOCKED, until),
            });
        }

        self.register_success(&user, now).await?;
        let redirect = self.staff_redirect(&user).await?;
        info!(user_id = %user.id(), role = %user.role(), "staff login succeeded");
        Ok(LoginOutcome {
            user_id: user.id(),
            redirect,
        })
    }

    async fn login_patient(
        &self,
        credentials: &PatientCredentials,
    ) -> Result<LoginOutcome, Error> {
        let now = self.clock.utc();
        let Some(user) = self.users.find_by_phone(credentials.phone()).await? else {
            debug!("patient login for unknown phone");
            return Err(invalid_credentials());
        };
        if user.role() != Role::Patient || !user.is_active() {
            return Err(invalid_credentials());
        }
        if let Some(until) = self
            .settings
            .lockout
            .locked_until(user.login_attempts(), now)
        {
            return Err(locked(PATIENT_LOCKED, until));
        }
        if !credentials.matches(user.username()) {
            self.register_failure(&user, now).await?;
            return Err(invalid_credentials());
        }

        self.register_success(&user, now).await?;
        let redirect = self.patient_redirect(&user).await?;
        info!(user_id = %user.id(), "patient login succeeded");
        Ok(LoginOutcome {
            user_id: user.id(),
            redirect,
        })
    }
}

#[cfg(test)]
#[path = "authentication_service_tests.rs"]
mod tests;
