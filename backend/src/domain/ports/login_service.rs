//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate staff and patients
//! without importing persistence. The outcome carries the redirect the
//! client should follow after signing in.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, PatientCredentials, StaffCredentials, UserId};

/// Successful login: who signed in and where to send them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub redirect: String,
}

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Password login for doctors and reception staff.
    async fn login_staff(&self, credentials: &StaffCredentials) -> Result<LoginOutcome, Error>;

    /// Passwordless login for patients.
    async fn login_patient(&self, credentials: &PatientCredentials)
    -> Result<LoginOutcome, Error>;
}
