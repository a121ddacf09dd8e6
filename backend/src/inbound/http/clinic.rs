//! Read endpoints: staff dashboard, listings, profiles, and visit details.

use actix_web::{get, web};

use crate::domain::{AppointmentId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::dto::{
    AppointmentDetailsResponse, AppointmentSummary, DashboardResponse, PatientProfileResponse,
    PatientSummary,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const USER_ID: FieldName = FieldName::new("userId");
const APPOINTMENT_ID: FieldName = FieldName::new("appointmentId");

/// Counts for the signed-in staff member's clinic.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["clinic"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<DashboardResponse>> {
    let view = state.queries.dashboard(&actor).await?;
    Ok(web::Json(view.into()))
}

/// Patients of the clinic, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "Patients", body = [PatientSummary]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["clinic"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<Vec<PatientSummary>>> {
    let rows = state.queries.patients(&actor).await?;
    Ok(web::Json(rows.iter().map(PatientSummary::from).collect()))
}

/// Appointments of the clinic with the patient's name and age.
#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Appointments", body = [AppointmentSummary]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["clinic"],
    operation_id = "listAppointments"
)]
#[get("/appointments")]
pub async fn list_appointments(
    state: web::Data<HttpState>,
    actor: CurrentActor,
) -> ApiResult<web::Json<Vec<AppointmentSummary>>> {
    let rows = state.queries.appointments(&actor).await?;
    Ok(web::Json(rows.iter().map(AppointmentSummary::from).collect()))
}

/// A patient's details and visit history. Visible to the patient and to
/// staff of the same clinic.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{user_id}/profile",
    params(("user_id" = String, Path, description = "Patient's user id")),
    responses(
        (status = 200, description = "Profile", body = PatientProfileResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Patient not found", body = ErrorSchema)
    ),
    tags = ["clinic"],
    operation_id = "patientProfile"
)]
#[get("/patients/{user_id}/profile")]
pub async fn patient_profile(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
) -> ApiResult<web::Json<PatientProfileResponse>> {
    let user_id = UserId::from_uuid(parse_uuid(&path.into_inner(), USER_ID)?);
    let view = state.queries.patient_profile(&actor, &user_id).await?;
    Ok(web::Json(view.into()))
}

/// One visit with its diagnoses, prescriptions, and requirements.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{user_id}/appointments/{appointment_id}",
    params(
        ("user_id" = String, Path, description = "Patient's user id"),
        ("appointment_id" = String, Path, description = "Appointment id")
    ),
    responses(
        (status = 200, description = "Appointment details", body = AppointmentDetailsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["clinic"],
    operation_id = "appointmentDetails"
)]
#[get("/patients/{user_id}/appointments/{appointment_id}")]
pub async fn appointment_details(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<AppointmentDetailsResponse>> {
    let (raw_user, raw_appointment) = path.into_inner();
    let user_id = UserId::from_uuid(parse_uuid(&raw_user, USER_ID)?);
    let appointment_id = AppointmentId::from_uuid(parse_uuid(&raw_appointment, APPOINTMENT_ID)?);
    let view = state
        .queries
        .appointment_details(&actor, &user_id, &appointment_id)
        .await?;
    Ok(web::Json(view.into()))
}

#[cfg(test)]
#[path = "clinic_tests.rs"]
mod tests;
