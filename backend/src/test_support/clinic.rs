//! Seeded clinics over the in-memory store.
//!
//! Every seeded account uses [`FixtureCredentialHasher`] so tests can log in
//! with [`FIXTURE_PASSWORD`] without paying for real key derivation.

use chrono::{DateTime, Utc};

use crate::domain::ports::{
    CredentialHasher, FixtureCredentialHasher, PatientRepository, ReceptionRepository,
    TenantProvision, TenantRepository,
};
use crate::domain::{
    Actor, Age, Credential, DomainName, Membership, Patient, PatientId, PhoneNumber, Practice,
    Reception, ReceptionId, Role, SchemaName, Tenant, TenantDomain, TenantId, TenantRates, User,
    UserDraft, UserId, Username,
};
use crate::outbound::memory::InMemoryClinicStore;

/// Password given to every seeded staff account.
pub const FIXTURE_PASSWORD: &str = "correct horse battery";

/// Rates applied to seeded tenants.
pub const FIXTURE_RATES: TenantRates = TenantRates {
    default_cost: 100,
    default_prior_cost: 250,
};

/// One tenant with a doctor, a receptionist, and a passwordless patient.
#[derive(Debug, Clone)]
pub struct SeededClinic {
    pub tenant: Tenant,
    pub domain: TenantDomain,
    pub doctor: User,
    pub reception: User,
    pub patient_user: User,
    pub patient: Patient,
}

impl SeededClinic {
    pub fn doctor_actor(&self) -> Actor {
        Actor {
            user_id: self.doctor.id(),
            role: Role::Doctor,
            membership: Membership::Doctor {
                tenant_id: self.tenant.id,
            },
        }
    }

    pub fn reception_actor(&self) -> Actor {
        Actor {
            user_id: self.reception.id(),
            role: Role::Reception,
            membership: Membership::Reception {
                tenant_id: self.tenant.id,
            },
        }
    }

    pub fn patient_actor(&self) -> Actor {
        Actor {
            user_id: self.patient_user.id(),
            role: Role::Patient,
            membership: Membership::Patient {
                tenant_id: self.tenant.id,
                patient_id: self.patient.id,
            },
        }
    }
}

/// Build a user, panicking on invalid fixture input.
pub fn fixture_user(username: &str, phone: &str, role: Role, now: DateTime<Utc>) -> User {
    let credential = if role == Role::Patient {
        Credential::Unusable
    } else {
        match FixtureCredentialHasher.hash(FIXTURE_PASSWORD) {
            Ok(hash) => Credential::Password(hash),
            Err(error) => panic!("fixture hash: {error}"),
        }
    };
    let draft = UserDraft {
        id: UserId::random(),
        username: Username::new(username).unwrap_or_else(|err| panic!("username: {err}")),
        phone: PhoneNumber::new(phone).unwrap_or_else(|err| panic!("phone: {err}")),
        role,
        credential,
        created_at: now,
    };
    User::new(draft).unwrap_or_else(|err| panic!("fixture user: {err}"))
}

/// Seed a clinic named `label`. `block` keeps phone numbers unique when
/// several clinics share a store.
pub async fn seed_clinic(
    store: &InMemoryClinicStore,
    label: &str,
    block: u8,
    now: DateTime<Utc>,
) -> SeededClinic {
    let phone = |seq: u8| format!("010{block:02}00000{seq}");
    let doctor = fixture_user(&format!("dr_{label}"), &phone(1), Role::Doctor, now);
    let tenant = Tenant {
        id: TenantId::random(),
        schema_name: SchemaName::new(label).unwrap_or_else(|err| panic!("schema: {err}")),
        doctor_user_id: doctor.id(),
        practice: Practice::new("General practice", "Cairo")
            .unwrap_or_else(|err| panic!("practice: {err}")),
        rates: FIXTURE_RATES,
        created_at: now,
    };
    let domain = TenantDomain {
        domain: DomainName::new(format!("{label}.clinic.test"))
            .unwrap_or_else(|err| panic!("domain: {err}")),
        tenant_id: tenant.id,
        is_primary: true,
    };
    TenantRepository::provision(
        store,
        &TenantProvision {
            doctor: doctor.clone(),
            tenant: tenant.clone(),
            domain: domain.clone(),
        },
    )
    .await
    .unwrap_or_else(|err| panic!("provision tenant: {err}"));

    let reception = fixture_user(&format!("desk_{label}"), &phone(2), Role::Reception, now);
    ReceptionRepository::create(
        store,
        &reception,
        &Reception {
            id: ReceptionId::random(),
            user_id: reception.id(),
            tenant_id: tenant.id,
            created_at: now,
        },
    )
    .await
    .unwrap_or_else(|err| panic!("create reception: {err}"));

    let patient_user = fixture_user(&format!("patient_{label}"), &phone(3), Role::Patient, now);
    let patient = Patient {
        id: PatientId::random(),
        user_id: patient_user.id(),
        tenant_id: tenant.id,
        age: Age::new(34).unwrap_or_else(|err| panic!("age: {err}")),
        created_at: now,
        updated_at: now,
    };
    PatientRepository::create(store, &patient_user, &patient)
        .await
        .unwrap_or_else(|err| panic!("create patient: {err}"));

    SeededClinic {
        tenant,
        domain,
        doctor,
        reception,
        patient_user,
        patient,
    }
}
