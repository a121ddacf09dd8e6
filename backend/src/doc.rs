//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every handler under `/api/v1` plus the health probes.
//! Domain types stay free of utoipa; the schema wrappers in
//! [`crate::inbound::http::schemas`] describe the error envelope instead.
//!
//! Swagger UI serves the document in debug builds. The `openapi-dump`
//! binary prints it for external tooling.

use crate::inbound::http::auth::{PatientLoginRequest, StaffLoginRequest};
use crate::inbound::http::dto::{
    AppointmentDetailsResponse, AppointmentResponse, AppointmentSummary, DashboardResponse,
    LoginResponse, NoteResponse, PatientProfileResponse, PatientSummary,
    RegisteredPatientResponse, RegisteredReceptionResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/staff/login or /api/v1/patients/login.",
            ))),
        );
    }
}

/// OpenAPI document for the clinic API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Clinic backend API",
        description = "Multi-tenant clinic management: staff and patient sessions, \
                       registration, appointments, and clinical notes.",
    ),
    servers(
        (url = "/", description = "Relative to the clinic's domain")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::staff_login,
        crate::inbound::http::auth::staff_logout,
        crate::inbound::http::auth::patient_login,
        crate::inbound::http::auth::patient_logout,
        crate::inbound::http::clinic::dashboard,
        crate::inbound::http::clinic::list_patients,
        crate::inbound::http::clinic::list_appointments,
        crate::inbound::http::clinic::patient_profile,
        crate::inbound::http::clinic::appointment_details,
        crate::inbound::http::registration::register_patient,
        crate::inbound::http::registration::register_reception,
        crate::inbound::http::appointments::create_appointment,
        crate::inbound::http::appointments::update_appointment,
        crate::inbound::http::notes::create_note,
        crate::inbound::http::notes::update_note,
        crate::inbound::http::notes::delete_note,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        StaffLoginRequest,
        PatientLoginRequest,
        LoginResponse,
        DashboardResponse,
        PatientSummary,
        AppointmentSummary,
        AppointmentResponse,
        NoteResponse,
        PatientProfileResponse,
        AppointmentDetailsResponse,
        RegisteredPatientResponse,
        RegisteredReceptionResponse,
    )),
    tags(
        (name = "auth", description = "Staff and patient sessions"),
        (name = "clinic", description = "Dashboards, listings, and patient records"),
        (name = "registration", description = "Adding patients and receptionists"),
        (name = "appointments", description = "Booking and updating visits"),
        (name = "notes", description = "Diagnoses, prescriptions, and requirements"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
