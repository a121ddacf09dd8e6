//! Booking and updating appointments.
//!
//! ```text
//! POST  /api/v1/patients/{user_id}/appointments {"date":"2026-03-02","isPrior":false}
//! PATCH /api/v1/appointments/{appointment_id} {"status":"Completed"}
//! ```
//!
//! Cost is never accepted from the client; it is fixed from the clinic's
//! rates when the appointment is booked.

use actix_web::{HttpResponse, patch, post, web};
use serde::Deserialize;

use crate::domain::ports::CreateAppointmentRequest;
use crate::domain::{AppointmentChanges, AppointmentId, AppointmentStatus, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::dto::AppointmentResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_change_error, missing_field_error, parse_date, parse_optional_date,
    parse_uuid,
};

const USER_ID: FieldName = FieldName::new("userId");
const APPOINTMENT_ID: FieldName = FieldName::new("appointmentId");
const DATE: FieldName = FieldName::new("date");

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointmentBody {
    #[schema(example = "2026-03-02")]
    pub date: Option<String>,
    #[serde(default)]
    pub is_prior: bool,
}

/// Partial update. `cost` is not part of the body and unknown keys are
/// ignored, so a client cannot reprice a visit.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[schema(example = "Completed")]
    pub status: Option<String>,
    pub date: Option<String>,
}

impl TryFrom<AppointmentPatch> for AppointmentChanges {
    type Error = Error;

    fn try_from(value: AppointmentPatch) -> Result<Self, Self::Error> {
        if value.status.is_none() && value.date.is_none() {
            return Err(empty_change_error(FieldName::new("status")));
        }
        let status = value
            .status
            .as_deref()
            .map(str::parse::<AppointmentStatus>)
            .transpose()?;
        let date = parse_optional_date(value.date.as_deref(), DATE)?;
        Ok(Self { status, date })
    }
}

/// Book a visit for a patient of the caller's clinic.
#[utoipa::path(
    post,
    path = "/api/v1/patients/{user_id}/appointments",
    params(("user_id" = String, Path, description = "Patient's user id")),
    request_body = NewAppointmentBody,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Patient not found", body = ErrorSchema)
    ),
    tags = ["appointments"],
    operation_id = "createAppointment"
)]
#[post("/patients/{user_id}/appointments")]
pub async fn create_appointment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<NewAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let patient_user_id = UserId::from_uuid(parse_uuid(&path.into_inner(), USER_ID)?);
    let body = payload.into_inner();
    let raw_date = body.date.ok_or_else(|| missing_field_error(DATE))?;
    let request = CreateAppointmentRequest {
        patient_user_id,
        date: parse_date(&raw_date, DATE)?,
        is_prior: body.is_prior,
    };
    let appointment = state.appointments.create(&actor, request).await?;
    Ok(HttpResponse::Created().json(AppointmentResponse::from(&appointment)))
}

/// Change status or date of an appointment.
#[utoipa::path(
    patch,
    path = "/api/v1/appointments/{appointment_id}",
    params(("appointment_id" = String, Path, description = "Appointment id")),
    request_body = AppointmentPatch,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Appointment not found", body = ErrorSchema),
        (status = 409, description = "Appointment already finished", body = ErrorSchema)
    ),
    tags = ["appointments"],
    operation_id = "updateAppointment"
)]
#[patch("/appointments/{appointment_id}")]
pub async fn update_appointment(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    path: web::Path<String>,
    payload: web::Json<AppointmentPatch>,
) -> ApiResult<web::Json<AppointmentResponse>> {
    let id = AppointmentId::from_uuid(parse_uuid(&path.into_inner(), APPOINTMENT_ID)?);
    let changes = AppointmentChanges::try_from(payload.into_inner())?;
    let appointment = state.appointments.update(&actor, &id, changes).await?;
    Ok(web::Json(AppointmentResponse::from(&appointment)))
}
