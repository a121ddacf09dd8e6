//! Shared harness: a seeded in-memory clinic behind the full `/api/v1` app.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::{App, web};
use chrono::NaiveDate;
use clinic::Trace;
use clinic::inbound::http::configure_api;
use clinic::inbound::http::state::HttpState;
use clinic::outbound::memory::InMemoryClinicStore;
use clinic::test_support::{
    FIXTURE_PASSWORD, MutableClock, SeededClinic, clinic_http_state, seed_clinic,
};
use mockable::Clock;
use serde_json::{Value, json};

/// One seeded clinic ("mona") over real services.
pub struct World {
    pub store: Arc<InMemoryClinicStore>,
    pub clock: Arc<MutableClock>,
    pub clinic: SeededClinic,
    pub state: HttpState,
}

pub async fn world() -> World {
    let store = Arc::new(InMemoryClinicStore::new());
    let clock = Arc::new(MutableClock::on(
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date"),
    ));
    let clinic = seed_clinic(&store, "mona", 1, clock.utc()).await;
    let state = clinic_http_state(&store, clock.clone());
    World {
        store,
        clock,
        clinic,
        state,
    }
}

/// The API as the server mounts it, with a plain-HTTP session cookie.
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").wrap(session).configure(configure_api))
}

pub fn staff_login(username: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/staff/login")
        .set_json(json!({ "username": username, "password": password }))
}

pub fn seeded_staff_login(username: &str) -> TestRequest {
    staff_login(username, FIXTURE_PASSWORD)
}

pub fn patient_login(phone: &str, username: &str) -> TestRequest {
    TestRequest::post()
        .uri("/api/v1/patients/login")
        .set_json(json!({ "phone": phone, "username": username }))
}

pub fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

pub async fn json_body(response: ServiceResponse) -> Value {
    let bytes = actix_web::test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}
