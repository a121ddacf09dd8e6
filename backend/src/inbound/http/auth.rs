//! Login and logout handlers for staff and patients.
//!
//! ```text
//! POST /api/v1/staff/login {"username":"dr_mona","password":"..."}
//! POST /api/v1/patients/login {"phone":"01001000003","username":"patient_mona"}
//! ```
//!
//! A successful login renews the session and stores only the user id. Any
//! failed attempt drops whatever session the browser was carrying.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginValidationError, PatientCredentials, StaffCredentials};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::LoginResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::{Portal, SessionContext};
use crate::inbound::http::state::HttpState;

/// Staff login body.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffLoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<StaffLoginRequest> for StaffCredentials {
    type Error = LoginValidationError;

    fn try_from(value: StaffLoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Patient login body: phone plus username, no password.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientLoginRequest {
    pub phone: String,
    pub username: String,
}

impl TryFrom<PatientLoginRequest> for PatientCredentials {
    type Error = LoginValidationError;

    fn try_from(value: PatientLoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.phone, &value.username)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
        LoginValidationError::InvalidPhone => ("phone", "invalid_phone"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn finish_login(
    session: &SessionContext,
    result: Result<LoginResponse, Error>,
) -> ApiResult<HttpResponse> {
    match result {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(error) => {
            session.clear();
            Err(error)
        }
    }
}

/// Authenticate a doctor or receptionist.
#[utoipa::path(
    post,
    path = "/api/v1/staff/login",
    request_body = StaffLoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 403, description = "No clinic linked to the account", body = ErrorSchema),
        (status = 423, description = "Account locked", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "staffLogin",
    security([])
)]
#[post("/staff/login")]
pub async fn staff_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StaffLoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        StaffCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let result = match state.login.login_staff(&credentials).await {
        Ok(outcome) => session
            .sign_in(&outcome.user_id, Portal::Staff)
            .map(|()| LoginResponse::from(outcome)),
        Err(error) => Err(error),
    };
    finish_login(&session, result)
}

/// Authenticate a patient by phone and username.
#[utoipa::path(
    post,
    path = "/api/v1/patients/login",
    request_body = PatientLoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 423, description = "Account locked", body = ErrorSchema),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "patientLogin",
    security([])
)]
#[post("/patients/login")]
pub async fn patient_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PatientLoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        PatientCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let result = match state.login.login_patient(&credentials).await {
        Ok(outcome) => session
            .sign_in(&outcome.user_id, Portal::Patient)
            .map(|()| LoginResponse::from(outcome)),
        Err(error) => Err(error),
    };
    finish_login(&session, result)
}

/// End a staff session.
#[utoipa::path(
    post,
    path = "/api/v1/staff/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "staffLogout",
    security([])
)]
#[post("/staff/logout")]
pub async fn staff_logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// End a patient session.
#[utoipa::path(
    post,
    path = "/api/v1/patients/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "patientLogout",
    security([])
)]
#[post("/patients/logout")]
pub async fn patient_logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
