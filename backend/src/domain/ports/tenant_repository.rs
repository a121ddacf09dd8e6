//! Port abstraction for the tenant registry.
//!
//! Provisioning and deletion are whole-tenant operations: adapters apply them
//! atomically, including the doctor account and every dependent record.

use async_trait::async_trait;

use crate::domain::{Tenant, TenantDomain, TenantId, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tenant registry adapters.
    pub enum TenantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String }
            => "tenant repository connection failed: {message}"; ServiceUnavailable,
        /// Query or mutation failed during execution.
        Query { message: String } => "tenant repository query failed: {message}"; InternalError,
        /// A unique value (username, phone, schema name, or domain) is taken.
        Duplicate { field: String } => "{field} is already registered"; Conflict {
            "field": field,
            "code": "duplicate",
        },
    }
}

/// Everything created when a doctor is onboarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantProvision {
    pub doctor: User,
    pub tenant: Tenant,
    pub domain: TenantDomain,
}

/// Tenant registry access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Create the doctor user, tenant, and primary domain together.
    async fn provision(&self, provision: &TenantProvision) -> Result<(), TenantRepositoryError>;

    /// Fetch a tenant by identifier.
    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, TenantRepositoryError>;

    /// Fetch the tenant owned by a doctor user.
    async fn find_by_doctor(
        &self,
        doctor_user_id: &UserId,
    ) -> Result<Option<Tenant>, TenantRepositoryError>;

    /// Fetch the primary domain of a tenant.
    async fn primary_domain(
        &self,
        id: &TenantId,
    ) -> Result<Option<TenantDomain>, TenantRepositoryError>;

    /// Remove a tenant and everything it owns. Returns `false` when absent.
    async fn delete(&self, id: &TenantId) -> Result<bool, TenantRepositoryError>;
}

