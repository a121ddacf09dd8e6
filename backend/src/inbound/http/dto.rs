//! Response bodies shared by the clinic handlers.
//!
//! Domain types stay free of HTTP concerns; these structs fix the JSON
//! shape (camelCase keys, plain strings for identifiers and enums).

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    AppointmentDetailsView, AppointmentListing, DashboardView, LoginOutcome, PatientListing,
    PatientProfileView, RegisteredPatient, RegisteredReception,
};
use crate::domain::{Appointment, ClinicalNote};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: Uuid,
    #[schema(example = "http://mona.clinic.test:8000/")]
    pub redirect: String,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            user_id: *outcome.user_id.as_uuid(),
            redirect: outcome.redirect,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: NaiveDate,
    #[schema(example = "Pending")]
    pub status: String,
    pub is_prior: bool,
    pub cost: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&Appointment> for AppointmentResponse {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: *appointment.id().as_uuid(),
            patient_id: *appointment.patient_id().as_uuid(),
            date: appointment.date(),
            status: appointment.status().as_str().to_owned(),
            is_prior: appointment.is_prior(),
            cost: appointment.cost(),
            created_at: appointment.created_at(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub appointment_id: Uuid,
    #[schema(example = "diagnosis")]
    pub kind: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ClinicalNote> for NoteResponse {
    fn from(note: &ClinicalNote) -> Self {
        Self {
            id: *note.id.as_uuid(),
            appointment_id: *note.appointment_id.as_uuid(),
            kind: note.kind.as_str().to_owned(),
            text: note.body.as_ref().to_owned(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user_id: Uuid,
    pub username: String,
    #[schema(example = "doctor")]
    pub role: String,
    pub tenant_id: Uuid,
    pub patient_count: u64,
    pub pending_appointments: u64,
}

impl From<DashboardView> for DashboardResponse {
    fn from(view: DashboardView) -> Self {
        Self {
            user_id: *view.user_id.as_uuid(),
            username: view.username.to_string(),
            role: view.role.to_string(),
            tenant_id: *view.tenant_id.as_uuid(),
            patient_count: view.patient_count,
            pending_appointments: view.pending_appointments,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub phone: String,
    pub age: u8,
    pub created_at: DateTime<Utc>,
}

impl From<&PatientListing> for PatientSummary {
    fn from(listing: &PatientListing) -> Self {
        Self {
            patient_id: *listing.patient_id.as_uuid(),
            user_id: *listing.user_id.as_uuid(),
            username: listing.username.to_string(),
            phone: listing.phone.to_string(),
            age: listing.age.value(),
            created_at: listing.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub appointment: AppointmentResponse,
    pub patient_user_id: Uuid,
    pub patient_username: String,
    pub patient_age: u8,
}

impl From<&AppointmentListing> for AppointmentSummary {
    fn from(listing: &AppointmentListing) -> Self {
        Self {
            appointment: AppointmentResponse::from(&listing.appointment),
            patient_user_id: *listing.patient_user_id.as_uuid(),
            patient_username: listing.patient_username.to_string(),
            patient_age: listing.patient_age.value(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileResponse {
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub username: String,
    pub phone: String,
    pub age: u8,
    pub appointments: Vec<AppointmentResponse>,
}

impl From<PatientProfileView> for PatientProfileResponse {
    fn from(view: PatientProfileView) -> Self {
        Self {
            user_id: *view.user_id.as_uuid(),
            patient_id: *view.patient_id.as_uuid(),
            username: view.username.to_string(),
            phone: view.phone.to_string(),
            age: view.age.value(),
            appointments: view.appointments.iter().map(AppointmentResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetailsResponse {
    pub patient_user_id: Uuid,
    pub appointment: AppointmentResponse,
    pub notes: Vec<NoteResponse>,
}

impl From<AppointmentDetailsView> for AppointmentDetailsResponse {
    fn from(view: AppointmentDetailsView) -> Self {
        Self {
            patient_user_id: *view.patient_user_id.as_uuid(),
            appointment: AppointmentResponse::from(&view.appointment),
            notes: view.notes.iter().map(NoteResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPatientResponse {
    pub user_id: Uuid,
    pub patient_id: Uuid,
    pub tenant_id: Uuid,
}

impl From<RegisteredPatient> for RegisteredPatientResponse {
    fn from(registered: RegisteredPatient) -> Self {
        Self {
            user_id: *registered.user_id.as_uuid(),
            patient_id: *registered.patient_id.as_uuid(),
            tenant_id: *registered.tenant_id.as_uuid(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredReceptionResponse {
    pub user_id: Uuid,
    pub reception_id: Uuid,
    pub tenant_id: Uuid,
}

impl From<RegisteredReception> for RegisteredReceptionResponse {
    fn from(registered: RegisteredReception) -> Self {
        Self {
            user_id: *registered.user_id.as_uuid(),
            reception_id: *registered.reception_id.as_uuid(),
            tenant_id: *registered.tenant_id.as_uuid(),
        }
    }
}
