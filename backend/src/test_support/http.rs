//! HTTP state over the in-memory store.

use std::sync::Arc;

use crate::domain::LoginSettings;
use crate::domain::ports::FixtureCredentialHasher;
use crate::inbound::http::state::{ClinicRepositories, HttpState};
use crate::outbound::memory::InMemoryClinicStore;

use super::MutableClock;

/// Real services over `store`, fixture hashing, and a controllable clock.
pub fn clinic_http_state(store: &Arc<InMemoryClinicStore>, clock: Arc<MutableClock>) -> HttpState {
    HttpState::from_repositories(
        ClinicRepositories {
            users: Arc::clone(store),
            tenants: Arc::clone(store),
            receptions: Arc::clone(store),
            patients: Arc::clone(store),
            appointments: Arc::clone(store),
            notes: Arc::clone(store),
        },
        Arc::new(FixtureCredentialHasher),
        clock,
        LoginSettings::default(),
    )
}
