//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the credential hasher) are implemented by
//! outbound adapters. Driving ports are the use-cases inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod actor_resolver;
mod appointment_repository;
mod appointments_command;
mod clinic_query;
mod clinical_note_repository;
mod clinical_notes_command;
mod credential_hasher;
mod login_service;
mod patient_repository;
mod reception_repository;
mod registration_command;
mod tenant_repository;
mod user_repository;

pub use actor_resolver::ActorResolver;
#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentListing, AppointmentRepository, AppointmentRepositoryError,
};
pub use appointments_command::{AppointmentsCommand, CreateAppointmentRequest};
pub use clinic_query::{AppointmentDetailsView, ClinicQuery, DashboardView, PatientProfileView};
#[cfg(test)]
pub use clinical_note_repository::MockClinicalNoteRepository;
pub use clinical_note_repository::{ClinicalNoteRepository, ClinicalNoteRepositoryError};
pub use clinical_notes_command::ClinicalNotesCommand;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher, FixtureCredentialHasher};
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use patient_repository::MockPatientRepository;
pub use patient_repository::{PatientListing, PatientRepository, PatientRepositoryError};
#[cfg(test)]
pub use reception_repository::MockReceptionRepository;
pub use reception_repository::{ReceptionRepository, ReceptionRepositoryError};
pub use registration_command::{
    RegisterPatientRequest, RegisterReceptionRequest, RegisteredPatient, RegisteredReception,
    RegistrationCommand,
};
#[cfg(test)]
pub use tenant_repository::MockTenantRepository;
pub use tenant_repository::{TenantProvision, TenantRepository, TenantRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
