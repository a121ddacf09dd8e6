//! HTTP inbound adapter exposing the clinic's JSON API.

pub mod actor;
pub mod appointments;
pub mod auth;
pub mod clinic;
pub mod dto;
pub mod error;
pub mod health;
pub mod notes;
pub mod registration;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Login routes come before the parameterised patient routes so
/// `/patients/login` never reaches a `{user_id}` matcher.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::staff_login)
        .service(auth::staff_logout)
        .service(auth::patient_login)
        .service(auth::patient_logout)
        .service(clinic::dashboard)
        .service(clinic::list_patients)
        .service(registration::register_patient)
        .service(registration::register_reception)
        .service(clinic::list_appointments)
        .service(appointments::create_appointment)
        .service(appointments::update_appointment)
        .service(clinic::patient_profile)
        .service(clinic::appointment_details)
        .service(notes::create_note)
        .service(notes::update_note)
        .service(notes::delete_note);
}
