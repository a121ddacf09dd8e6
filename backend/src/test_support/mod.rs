//! Test utilities for the clinic crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`) via
//! the `test-support` feature.

pub mod clinic;
pub mod clock;
pub mod http;

pub use clinic::{FIXTURE_PASSWORD, FIXTURE_RATES, SeededClinic, fixture_user, seed_clinic};
pub use clock::MutableClock;
pub use http::clinic_http_state;
