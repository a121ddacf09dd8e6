//! Doctor onboarding and tenant removal.
//!
//! Both operations run outside the HTTP surface; the `provision-doctor`
//! binary drives them against the configured store.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::identity_service::new_account;
use crate::domain::ports::{CredentialHasher, TenantProvision, TenantRepository};
use crate::domain::{
    DomainName, Error, PhoneNumber, Practice, Role, SchemaName, Tenant, TenantDomain, TenantId,
    TenantRates, Username,
};

/// Raw input for a new doctor and their clinic.
#[derive(Debug, Clone)]
pub struct ProvisionDoctorRequest {
    pub username: String,
    pub phone: String,
    pub password: Zeroizing<String>,
    pub major: String,
    pub addresses: String,
    pub schema_name: String,
    pub domain: String,
    pub default_cost: u32,
    pub default_prior_cost: u32,
}

/// Creates and removes whole tenants.
pub struct TenantService<T, H> {
    tenants: Arc<T>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<T, H> Clone for TenantService<T, H> {
    fn clone(&self) -> Self {
        Self {
            tenants: Arc::clone(&self.tenants),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, H> TenantService<T, H>
where
    T: TenantRepository,
    H: CredentialHasher,
{
    pub fn new(tenants: Arc<T>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tenants,
            hasher,
            clock,
        }
    }

    /// Create the doctor account, its tenant, and the primary domain.
    pub async fn provision_doctor(
        &self,
        request: ProvisionDoctorRequest,
    ) -> Result<TenantProvision, Error> {
        let username = Username::new(&request.username)?;
        let phone = PhoneNumber::new(&request.phone)?;
        let schema_name = SchemaName::new(&request.schema_name)?;
        let domain = DomainName::new(&request.domain)?;
        let practice = Practice::new(&request.major, &request.addresses)?;
        let now = self.clock.utc();

        let doctor = new_account(
            self.hasher.as_ref(),
            username,
            phone,
            Role::Doctor,
            Some(request.password.as_str()),
            now,
        )?;
        let tenant = Tenant {
            id: TenantId::random(),
            schema_name,
            doctor_user_id: doctor.id(),
            practice,
            rates: TenantRates {
                default_cost: request.default_cost,
                default_prior_cost: request.default_prior_cost,
            },
            created_at: now,
        };
        let provision = TenantProvision {
            domain: TenantDomain {
                domain,
                tenant_id: tenant.id,
                is_primary: true,
            },
            doctor,
            tenant,
        };
        self.tenants.provision(&provision).await?;
        info!(
            tenant_id = %provision.tenant.id,
            schema = %provision.tenant.schema_name,
            domain = %provision.domain.domain,
            "tenant provisioned"
        );
        Ok(provision)
    }

    /// Remove a tenant and everything it owns.
    pub async fn delete_tenant(&self, tenant_id: &TenantId) -> Result<(), Error> {
        if !self.tenants.delete(tenant_id).await? {
            return Err(Error::not_found(format!("tenant {tenant_id} not found")));
        }
        info!(%tenant_id, "tenant deleted");
        Ok(())
    }
}
