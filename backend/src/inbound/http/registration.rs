//! Staff registering patients and receptionists for their clinic.
//!
//! ```text
//! POST /api/v1/patients {"username":"amal","phone":"01001234567","age":42}
//! POST /api/v1/receptions {"username":"desk","phone":"01007654321","password":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::domain::ports::{RegisterPatientRequest, RegisterReceptionRequest};
use crate::domain::{Age, Error, PhoneNumber, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::actor::CurrentActor;
use crate::inbound::http::dto::{RegisteredPatientResponse, RegisteredReceptionResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

/// New patient. The password is optional; patients normally sign in with
/// phone and username.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRegistration {
    pub username: String,
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
    pub age: Option<i64>,
}

impl TryFrom<PatientRegistration> for RegisterPatientRequest {
    type Error = Error;

    fn try_from(value: PatientRegistration) -> Result<Self, Self::Error> {
        let age = value
            .age
            .ok_or_else(|| missing_field_error(FieldName::new("age")))?;
        Ok(Self {
            username: Username::new(&value.username)?,
            phone: PhoneNumber::new(&value.phone)?,
            password: value
                .password
                .filter(|password| !password.is_empty())
                .map(Zeroizing::new),
            age: Age::new(age)?,
        })
    }
}

/// New receptionist; staff always need a password.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionRegistration {
    pub username: String,
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<ReceptionRegistration> for RegisterReceptionRequest {
    type Error = Error;

    fn try_from(value: ReceptionRegistration) -> Result<Self, Self::Error> {
        Ok(Self {
            username: Username::new(&value.username)?,
            phone: PhoneNumber::new(&value.phone)?,
            password: Zeroizing::new(value.password),
        })
    }
}

/// Register a patient in the caller's clinic.
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = PatientRegistration,
    responses(
        (status = 201, description = "Patient registered", body = RegisteredPatientResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Username or phone taken", body = ErrorSchema)
    ),
    tags = ["registration"],
    operation_id = "registerPatient"
)]
#[post("/patients")]
pub async fn register_patient(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<PatientRegistration>,
) -> ApiResult<HttpResponse> {
    let request = RegisterPatientRequest::try_from(payload.into_inner())?;
    let registered = state.registration.register_patient(&actor, request).await?;
    Ok(HttpResponse::Created().json(RegisteredPatientResponse::from(registered)))
}

/// Register a receptionist; doctors only.
#[utoipa::path(
    post,
    path = "/api/v1/receptions",
    request_body = ReceptionRegistration,
    responses(
        (status = 201, description = "Receptionist registered", body = RegisteredReceptionResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Username or phone taken", body = ErrorSchema)
    ),
    tags = ["registration"],
    operation_id = "registerReception"
)]
#[post("/receptions")]
pub async fn register_reception(
    state: web::Data<HttpState>,
    actor: CurrentActor,
    payload: web::Json<ReceptionRegistration>,
) -> ApiResult<HttpResponse> {
    let request = RegisterReceptionRequest::try_from(payload.into_inner())?;
    let registered = state
        .registration
        .register_reception(&actor, request)
        .await?;
    Ok(HttpResponse::Created().json(RegisteredReceptionResponse::from(registered)))
}
