//! Resolves how a user relates to a tenant.

use std::sync::Arc;

use crate::domain::ports::{PatientRepository, ReceptionRepository, TenantRepository};
use crate::domain::{Error, Membership, User};

/// Looks up the doctor, reception, or patient link of a user.
pub struct MembershipResolver<T, R, P> {
    tenants: Arc<T>,
    receptions: Arc<R>,
    patients: Arc<P>,
}

impl<T, R, P> Clone for MembershipResolver<T, R, P> {
    fn clone(&self) -> Self {
        Self {
            tenants: Arc::clone(&self.tenants),
            receptions: Arc::clone(&self.receptions),
            patients: Arc::clone(&self.patients),
        }
    }
}

impl<T, R, P> MembershipResolver<T, R, P>
where
    T: TenantRepository,
    R: ReceptionRepository,
    P: PatientRepository,
{
    pub fn new(tenants: Arc<T>, receptions: Arc<R>, patients: Arc<P>) -> Self {
        Self {
            tenants,
            receptions,
            patients,
        }
    }

    pub fn tenants(&self) -> &Arc<T> {
        &self.tenants
    }

    /// Membership of `user`, checked in doctor, reception, patient order.
    pub async fn membership(&self, user: &User) -> Result<Membership, Error> {
        let user_id = user.id();
        if let Some(tenant) = self.tenants.find_by_doctor(&user_id).await? {
            return Ok(Membership::Doctor {
                tenant_id: tenant.id,
            });
        }
        if let Some(reception) = self.receptions.find_by_user(&user_id).await? {
            return Ok(Membership::Reception {
                tenant_id: reception.tenant_id,
            });
        }
        if let Some(patient) = self.patients.find_by_user(&user_id).await? {
            return Ok(Membership::Patient {
                tenant_id: patient.tenant_id,
                patient_id: patient.id,
            });
        }
        Ok(Membership::Unaffiliated)
    }
}
