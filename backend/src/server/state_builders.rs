//! Builders for the HTTP state from the configured store.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use clinic::inbound::http::state::{ClinicRepositories, HttpState};
use clinic::outbound::memory::InMemoryClinicStore;
use clinic::outbound::persistence::{
    DbPool, DieselAppointmentRepository, DieselClinicalNoteRepository, DieselPatientRepository,
    DieselReceptionRepository, DieselTenantRepository, DieselUserRepository,
};
use clinic::outbound::security::Pbkdf2CredentialHasher;

use super::ServerConfig;

fn diesel_repositories(
    pool: &DbPool,
) -> ClinicRepositories<
    DieselUserRepository,
    DieselTenantRepository,
    DieselReceptionRepository,
    DieselPatientRepository,
    DieselAppointmentRepository,
    DieselClinicalNoteRepository,
> {
    ClinicRepositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        tenants: Arc::new(DieselTenantRepository::new(pool.clone())),
        receptions: Arc::new(DieselReceptionRepository::new(pool.clone())),
        patients: Arc::new(DieselPatientRepository::new(pool.clone())),
        appointments: Arc::new(DieselAppointmentRepository::new(pool.clone())),
        notes: Arc::new(DieselClinicalNoteRepository::new(pool.clone())),
    }
}

/// Repositories that all point at one in-memory store.
fn memory_repositories(
    store: &Arc<InMemoryClinicStore>,
) -> ClinicRepositories<
    InMemoryClinicStore,
    InMemoryClinicStore,
    InMemoryClinicStore,
    InMemoryClinicStore,
    InMemoryClinicStore,
    InMemoryClinicStore,
> {
    ClinicRepositories {
        users: Arc::clone(store),
        tenants: Arc::clone(store),
        receptions: Arc::clone(store),
        patients: Arc::clone(store),
        appointments: Arc::clone(store),
        notes: Arc::clone(store),
    }
}

/// Build HTTP state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let hasher = Arc::new(Pbkdf2CredentialHasher::default());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let login = config.login;

    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            HttpState::from_repositories(diesel_repositories(pool), hasher, clock, login)
        }
        None => {
            warn!("no database configured; clinic data lives in memory only");
            let store = Arc::new(InMemoryClinicStore::new());
            HttpState::from_repositories(memory_repositories(&store), hasher, clock, login)
        }
    };
    web::Data::new(state)
}
