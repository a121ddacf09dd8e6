//! Role gate: staff, doctor and profile checks on the authenticated actor.
//!
//! Staff status comes from a linked doctor tenant or reception record rather
//! than from the role column, so a doctor whose tenant was removed loses
//! staff access immediately.

use super::error::Error;
use super::patient::PatientId;
use super::tenant::TenantId;
use super::user::{Role, UserId};

/// How the actor relates to a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The actor owns the tenant.
    Doctor { tenant_id: TenantId },
    /// The actor works the reception desk of the tenant.
    Reception { tenant_id: TenantId },
    /// The actor is a patient of the tenant.
    Patient {
        tenant_id: TenantId,
        patient_id: PatientId,
    },
    /// No relationship, e.g. an admin or an orphaned account.
    Unaffiliated,
}

/// The authenticated user and their tenant relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    pub membership: Membership,
}

impl Actor {
    /// Tenant the actor acts for, if any.
    pub fn tenant_id(&self) -> Option<TenantId> {
        match self.membership {
            Membership::Doctor { tenant_id }
            | Membership::Reception { tenant_id }
            | Membership::Patient { tenant_id, .. } => Some(tenant_id),
            Membership::Unaffiliated => None,
        }
    }

    /// Tenant of a doctor or reception actor.
    pub fn staff_tenant(&self) -> Option<TenantId> {
        match self.membership {
            Membership::Doctor { tenant_id } | Membership::Reception { tenant_id } => {
                Some(tenant_id)
            }
            Membership::Patient { .. } | Membership::Unaffiliated => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.staff_tenant().is_some()
    }

    /// Require doctor or reception membership and return its tenant.
    pub fn require_staff(&self) -> Result<TenantId, Error> {
        self.staff_tenant()
            .ok_or_else(|| Error::forbidden("staff access required"))
    }

    /// Require doctor membership and return its tenant.
    pub fn require_doctor(&self) -> Result<TenantId, Error> {
        match self.membership {
            Membership::Doctor { tenant_id } => Ok(tenant_id),
            _ => Err(Error::forbidden("doctor access required")),
        }
    }

    /// Allow the profile owner or staff of the owner's tenant.
    pub fn require_profile_access(&self, owner: UserId, owner_tenant: TenantId) -> Result<(), Error> {
        if self.user_id == owner || self.staff_tenant() == Some(owner_tenant) {
            Ok(())
        } else {
            Err(Error::forbidden("profile access denied"))
        }
    }
}
