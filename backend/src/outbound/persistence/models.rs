//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions back into domain
//! types re-run domain validation, so a row that no longer satisfies an
//! invariant surfaces as a query error instead of a corrupt aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Age, Appointment, AppointmentId, AppointmentRecord, AppointmentStatus, ClinicalNote,
    Credential, DomainName, LoginAttempts, NoteBody, NoteId, NoteKind, PasswordHash, Patient,
    PatientId, PhoneNumber, Practice, Reception, ReceptionId, Role, SchemaName, Tenant,
    TenantDomain, TenantId, TenantRates, User, UserDraft, UserId, Username,
};

use super::schema::{
    appointments, clinical_notes, patients, receptions, tenant_domains, tenants, users,
};

fn to_db_int(value: u32, column: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{column} {value} exceeds the column range"))
}

fn from_db_int(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{column} {value} is negative"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for the users table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub phone: String,
    pub role: String,
    pub password_hash: Option<String>,
    pub failed_login_attempts: i32,
    pub last_login_attempt: Option<DateTime<Utc>>,
    pub account_locked_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn from_user(user: &User) -> Result<Self, String> {
        let attempts = user.login_attempts();
        Ok(Self {
            id: *user.id().as_uuid(),
            username: user.username().as_ref().to_owned(),
            phone: user.phone().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            password_hash: user
                .credential()
                .password_hash()
                .map(|hash| hash.as_ref().to_owned()),
            failed_login_attempts: to_db_int(attempts.failed(), "failed_login_attempts")?,
            last_login_attempt: attempts.last_attempt_at(),
            account_locked_until: attempts.locked_until(),
            is_active: user.is_active(),
            created_at: user.created_at(),
        })
    }

    pub(crate) fn into_user(self) -> Result<User, String> {
        let credential = match self.password_hash {
            Some(encoded) => Credential::Password(PasswordHash::new(encoded)),
            None => Credential::Unusable,
        };
        let failed = from_db_int(self.failed_login_attempts, "failed_login_attempts")?;
        let user = User::new(UserDraft {
            id: UserId::from_uuid(self.id),
            username: Username::new(&self.username).map_err(|err| err.to_string())?,
            phone: PhoneNumber::new(&self.phone).map_err(|err| err.to_string())?,
            role: self.role.parse::<Role>().map_err(|err| err.to_string())?,
            credential,
            created_at: self.created_at,
        })
        .map_err(|err| err.to_string())?;
        Ok(user
            .with_login_attempts(LoginAttempts::from_parts(
                failed,
                self.last_login_attempt,
                self.account_locked_until,
            ))
            .with_active(self.is_active))
    }
}

/// Lockout columns returned by the failed-attempt update.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct LoginAttemptsRow {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    pub failed_login_attempts: i32,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub last_login_attempt: Option<DateTime<Utc>>,
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Timestamptz>)]
    pub account_locked_until: Option<DateTime<Utc>>,
}

impl LoginAttemptsRow {
    pub(crate) fn into_attempts(self) -> Result<LoginAttempts, String> {
        Ok(LoginAttempts::from_parts(
            from_db_int(self.failed_login_attempts, "failed_login_attempts")?,
            self.last_login_attempt,
            self.account_locked_until,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tenant registry
// ---------------------------------------------------------------------------

/// Row struct for the tenants table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TenantRow {
    pub id: Uuid,
    pub schema_name: String,
    pub doctor_user_id: Uuid,
    pub major: String,
    pub addresses: String,
    pub default_cost: i32,
    pub default_prior_cost: i32,
    pub created_at: DateTime<Utc>,
}

impl TenantRow {
    pub(crate) fn from_tenant(tenant: &Tenant) -> Result<Self, String> {
        Ok(Self {
            id: *tenant.id.as_uuid(),
            schema_name: tenant.schema_name.as_ref().to_owned(),
            doctor_user_id: *tenant.doctor_user_id.as_uuid(),
            major: tenant.practice.major().to_owned(),
            addresses: tenant.practice.addresses().to_owned(),
            default_cost: to_db_int(tenant.rates.default_cost, "default_cost")?,
            default_prior_cost: to_db_int(tenant.rates.default_prior_cost, "default_prior_cost")?,
            created_at: tenant.created_at,
        })
    }

    pub(crate) fn into_tenant(self) -> Result<Tenant, String> {
        Ok(Tenant {
            id: TenantId::from_uuid(self.id),
            schema_name: SchemaName::new(&self.schema_name).map_err(|err| err.to_string())?,
            doctor_user_id: UserId::from_uuid(self.doctor_user_id),
            practice: Practice::new(&self.major, &self.addresses).map_err(|err| err.to_string())?,
            rates: TenantRates {
                default_cost: from_db_int(self.default_cost, "default_cost")?,
                default_prior_cost: from_db_int(self.default_prior_cost, "default_prior_cost")?,
            },
            created_at: self.created_at,
        })
    }
}

/// Row struct for the tenant_domains table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tenant_domains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TenantDomainRow {
    pub domain: String,
    pub tenant_id: Uuid,
    pub is_primary: bool,
}

impl TenantDomainRow {
    pub(crate) fn from_domain(domain: &TenantDomain) -> Self {
        Self {
            domain: domain.domain.as_ref().to_owned(),
            tenant_id: *domain.tenant_id.as_uuid(),
            is_primary: domain.is_primary,
        }
    }

    pub(crate) fn into_domain(self) -> Result<TenantDomain, String> {
        Ok(TenantDomain {
            domain: DomainName::new(&self.domain).map_err(|err| err.to_string())?,
            tenant_id: TenantId::from_uuid(self.tenant_id),
            is_primary: self.is_primary,
        })
    }
}

// ---------------------------------------------------------------------------
// Staff and patient links
// ---------------------------------------------------------------------------

/// Row struct for the receptions table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = receptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReceptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Reception> for ReceptionRow {
    fn from(reception: &Reception) -> Self {
        Self {
            id: *reception.id.as_uuid(),
            user_id: *reception.user_id.as_uuid(),
            tenant_id: *reception.tenant_id.as_uuid(),
            created_at: reception.created_at,
        }
    }
}

impl From<ReceptionRow> for Reception {
    fn from(row: ReceptionRow) -> Self {
        Self {
            id: ReceptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            created_at: row.created_at,
        }
    }
}

/// Row struct for the patients table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub age: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            id: *patient.id.as_uuid(),
            user_id: *patient.user_id.as_uuid(),
            tenant_id: *patient.tenant_id.as_uuid(),
            age: i16::from(patient.age.value()),
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

impl PatientRow {
    pub(crate) fn into_patient(self) -> Result<Patient, String> {
        Ok(Patient {
            id: PatientId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            age: Age::new(i64::from(self.age)).map_err(|err| err.to_string())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Appointment ledger
// ---------------------------------------------------------------------------

/// Row struct for the appointments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AppointmentRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub status: String,
    pub is_prior: bool,
    pub cost: i32,
    pub created_at: DateTime<Utc>,
}

impl AppointmentRow {
    pub(crate) fn from_appointment(appointment: &Appointment) -> Result<Self, String> {
        Ok(Self {
            id: *appointment.id().as_uuid(),
            patient_id: *appointment.patient_id().as_uuid(),
            tenant_id: *appointment.tenant_id().as_uuid(),
            date: appointment.date(),
            status: appointment.status().as_str().to_owned(),
            is_prior: appointment.is_prior(),
            cost: to_db_int(appointment.cost(), "cost")?,
            created_at: appointment.created_at(),
        })
    }

    pub(crate) fn into_appointment(self) -> Result<Appointment, String> {
        Ok(Appointment::restore(AppointmentRecord {
            id: AppointmentId::from_uuid(self.id),
            patient_id: PatientId::from_uuid(self.patient_id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            date: self.date,
            status: self
                .status
                .parse::<AppointmentStatus>()
                .map_err(|err| err.to_string())?,
            is_prior: self.is_prior,
            cost: from_db_int(self.cost, "cost")?,
            created_at: self.created_at,
        }))
    }
}

/// Changeset for the mutable appointment columns; cost is not among them.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
pub(crate) struct AppointmentScheduleUpdate<'a> {
    pub date: NaiveDate,
    pub status: &'a str,
}

/// Row struct for the clinical_notes table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = clinical_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ClinicalNoteRow {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub tenant_id: Uuid,
    pub kind: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ClinicalNote> for ClinicalNoteRow {
    fn from(note: &ClinicalNote) -> Self {
        Self {
            id: *note.id.as_uuid(),
            appointment_id: *note.appointment_id.as_uuid(),
            tenant_id: *note.tenant_id.as_uuid(),
            kind: note.kind.as_str().to_owned(),
            body: note.body.as_ref().to_owned(),
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

impl ClinicalNoteRow {
    pub(crate) fn into_note(self) -> Result<ClinicalNote, String> {
        let kind = self.kind.parse::<NoteKind>().map_err(|err| err.to_string())?;
        Ok(ClinicalNote {
            id: NoteId::from_uuid(self.id),
            appointment_id: AppointmentId::from_uuid(self.appointment_id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            kind,
            body: NoteBody::new(kind, &self.body).map_err(|err| err.to_string())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
