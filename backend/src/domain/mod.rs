//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed clinic entities used by the HTTP and
//! persistence adapters, plus the services implementing the driving ports.
//! Invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Tenant, Patient, Reception, Appointment, ClinicalNote: the data
//!   model.
//! - Actor / Membership: the role gate.
//! - LockoutPolicy / LoginAttempts: the lockout guard.

pub mod access;
pub mod appointment;
pub mod auth;
pub mod clinical_note;
pub mod error;
pub mod lockout;
pub mod patient;
pub mod ports;
pub mod tenant;
pub mod trace_id;
pub mod user;

mod actor_service;
mod appointment_service;
mod authentication_service;
mod clinic_query_service;
mod clinical_notes_service;
mod identity_service;
mod membership;
mod registration_service;
mod tenant_service;

pub use self::access::{Actor, Membership};
pub use self::actor_service::ActorService;
pub use self::appointment::{
    Appointment, AppointmentChanges, AppointmentId, AppointmentRecord, AppointmentStatus,
    AppointmentValidationError, NewAppointment,
};
pub use self::appointment_service::AppointmentService;
pub use self::auth::{LoginValidationError, PatientCredentials, StaffCredentials};
pub use self::authentication_service::{AuthenticationService, DEFAULT_TENANT_PORT, LoginSettings};
pub use self::clinic_query_service::ClinicQueryService;
pub use self::clinical_note::{
    ClinicalNote, NoteBody, NoteId, NoteKind, NoteValidationError,
};
pub use self::clinical_notes_service::ClinicalNotesService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity_service::{IdentityService, ProvisionUserRequest};
pub use self::lockout::{
    DEFAULT_LOCKOUT_MINUTES, DEFAULT_MAX_ATTEMPTS, FailureOutcome, LockoutPolicy, LoginAttempts,
};
pub use self::membership::MembershipResolver;
pub use self::patient::{Age, AgeOutOfRange, Patient, PatientId, Reception, ReceptionId};
pub use self::registration_service::RegistrationService;
pub use self::tenant::{
    DomainName, Practice, SchemaName, Tenant, TenantDomain, TenantId, TenantRates,
    TenantValidationError,
};
pub use self::tenant_service::{ProvisionDoctorRequest, TenantService};
pub use self::trace_id::TraceId;
pub use self::user::{
    Credential, PasswordHash, PhoneNumber, Role, User, UserDraft, UserId, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use clinic::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
