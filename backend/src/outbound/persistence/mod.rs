//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the clinic repository ports backed by
//! PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between rows and domain types;
//!   no business rules live here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Tenant partitioning**: every tenant-scoped query filters on
//!   `tenant_id` as well as the record id.
//!
//! # Example
//!
//! ```ignore
//! use clinic::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/clinic")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_appointment_repository;
mod diesel_clinical_note_repository;
mod diesel_error_mapping;
mod diesel_patient_repository;
mod diesel_reception_repository;
mod diesel_tenant_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_appointment_repository::DieselAppointmentRepository;
pub use diesel_clinical_note_repository::DieselClinicalNoteRepository;
pub use diesel_patient_repository::DieselPatientRepository;
pub use diesel_reception_repository::DieselReceptionRepository;
pub use diesel_tenant_repository::DieselTenantRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
