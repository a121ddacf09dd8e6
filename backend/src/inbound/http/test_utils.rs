//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{App, web};
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::Value;

use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryClinicStore;
use crate::test_support::{MutableClock, SeededClinic, clinic_http_state, seed_clinic};

/// Session middleware with a fresh key and a non-`Secure` cookie named
/// `session`, suitable for plain-HTTP test requests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The full `/api/v1` surface over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(configure_api))
}

/// One seeded clinic behind real services and the in-memory store.
pub struct TestClinic {
    pub store: Arc<InMemoryClinicStore>,
    pub clock: Arc<MutableClock>,
    pub clinic: SeededClinic,
    pub state: HttpState,
}

pub async fn test_clinic() -> TestClinic {
    let store = Arc::new(InMemoryClinicStore::new());
    let clock = Arc::new(MutableClock::on(
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
    ));
    let clinic = seed_clinic(&store, "mona", 1, clock.utc()).await;
    let state = clinic_http_state(&store, clock.clone());
    TestClinic {
        store,
        clock,
        clinic,
        state,
    }
}

/// Extract the session cookie from a login response.
pub fn session_cookie(response: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

/// Read a JSON body.
pub async fn json_body(response: actix_web::dev::ServiceResponse) -> Value {
    let bytes = actix_web::test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Login request for a seeded staff account.
pub fn staff_login_request(username: &str) -> actix_web::test::TestRequest {
    actix_web::test::TestRequest::post()
        .uri("/api/v1/staff/login")
        .set_json(serde_json::json!({
            "username": username,
            "password": crate::test_support::FIXTURE_PASSWORD,
        }))
}

/// Login request for a seeded patient.
pub fn patient_login_request(phone: &str, username: &str) -> actix_web::test::TestRequest {
    actix_web::test::TestRequest::post()
        .uri("/api/v1/patients/login")
        .set_json(serde_json::json!({ "phone": phone, "username": username }))
}
