//! Appointment ledger: visits, statuses, and their fixed cost.
//!
//! Cost is derived once from the tenant's rates when an appointment is
//! scheduled. Later changes touch only status and date, so there is no way
//! to alter the cost of an existing appointment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::error::Error;
use super::patient::PatientId;
use super::tenant::{TenantId, TenantRates};

/// Validation and lifecycle errors for appointments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentValidationError {
    #[error("appointment cannot be in the past: {date} is before {today}")]
    DateInPast { date: NaiveDate, today: NaiveDate },
    #[error("appointment status cannot change from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },
    #[error("a {status} appointment can no longer be rescheduled")]
    Finalised { status: AppointmentStatus },
    #[error("unknown appointment status: {0}")]
    UnknownStatus(String),
}

impl From<AppointmentValidationError> for Error {
    fn from(err: AppointmentValidationError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentValidationError::DateInPast { .. } => Error::invalid_request(message)
                .with_details(json!({ "field": "date", "code": "date_in_past" })),
            AppointmentValidationError::UnknownStatus(_) => Error::invalid_request(message)
                .with_details(json!({ "field": "status", "code": "unknown_status" })),
            AppointmentValidationError::InvalidTransition { from, to } => Error::conflict(message)
                .with_details(json!({
                    "code": "invalid_transition",
                    "from": from.as_str(),
                    "to": to.as_str(),
                })),
            AppointmentValidationError::Finalised { status } => Error::conflict(message)
                .with_details(json!({ "code": "appointment_finalised", "status": status.as_str() })),
        }
    }
}

/// Identifier of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    /// Wrap an identifier loaded from storage.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Fresh random (v4) identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visit status. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Completed,
    #[default]
    Pending,
    Canceled,
}

impl AppointmentStatus {
    /// Stored and wire spelling of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Pending => "Pending",
            Self::Canceled => "Canceled",
        }
    }

    /// `Completed` and `Canceled` accept no further changes.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether moving to `next` is allowed. Staying put always is.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || !self.is_terminal()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(Self::Completed),
            "Pending" => Ok(Self::Pending),
            "Canceled" => Ok(Self::Canceled),
            other => Err(AppointmentValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Request to book a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub tenant_id: TenantId,
    pub date: NaiveDate,
    pub is_prior: bool,
}

/// Stored appointment fields, used when reading from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub tenant_id: TenantId,
    pub date: NaiveDate,
    pub status: AppointmentStatus,
    pub is_prior: bool,
    pub cost: u32,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppointmentChanges {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
}

/// A scheduled visit.
///
/// ## Invariants
/// - `cost` is assigned by [`Appointment::schedule`] and never changes.
/// - Terminal statuses never transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    id: AppointmentId,
    patient_id: PatientId,
    tenant_id: TenantId,
    date: NaiveDate,
    status: AppointmentStatus,
    is_prior: bool,
    cost: u32,
    created_at: DateTime<Utc>,
}

impl Appointment {
    /// Book a pending visit priced from the tenant's rates.
    ///
    /// # Examples
    /// ```
    /// use chrono::{NaiveDate, Utc};
    /// use clinic::domain::{
    ///     Appointment, AppointmentId, NewAppointment, PatientId, TenantId, TenantRates,
    /// };
    ///
    /// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let rates = TenantRates { default_cost: 100, default_prior_cost: 250 };
    /// let appointment = Appointment::schedule(
    ///     NewAppointment {
    ///         id: AppointmentId::random(),
    ///         patient_id: PatientId::random(),
    ///         tenant_id: TenantId::random(),
    ///         date: today,
    ///         is_prior: false,
    ///     },
    ///     rates,
    ///     today,
    ///     Utc::now(),
    /// )
    /// .unwrap();
    /// assert_eq!(appointment.cost(), 100);
    /// ```
    pub fn schedule(
        request: NewAppointment,
        rates: TenantRates,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Self, AppointmentValidationError> {
        ensure_not_past(request.date, today)?;
        Ok(Self {
            id: request.id,
            patient_id: request.patient_id,
            tenant_id: request.tenant_id,
            date: request.date,
            status: AppointmentStatus::Pending,
            is_prior: request.is_prior,
            cost: rates.cost_for(request.is_prior),
            created_at: now,
        })
    }

    /// Rehydrate a stored appointment.
    pub fn restore(record: AppointmentRecord) -> Self {
        Self {
            id: record.id,
            patient_id: record.patient_id,
            tenant_id: record.tenant_id,
            date: record.date,
            status: record.status,
            is_prior: record.is_prior,
            cost: record.cost,
            created_at: record.created_at,
        }
    }

    /// Apply a staff update. Returns whether anything changed.
    pub fn apply(
        &mut self,
        changes: AppointmentChanges,
        today: NaiveDate,
    ) -> Result<bool, AppointmentValidationError> {
        let next_status = changes.status.unwrap_or(self.status);
        if !self.status.can_transition_to(next_status) {
            return Err(AppointmentValidationError::InvalidTransition {
                from: self.status,
                to: next_status,
            });
        }

        let next_date = changes.date.unwrap_or(self.date);
        if next_date != self.date {
            if self.status.is_terminal() {
                return Err(AppointmentValidationError::Finalised {
                    status: self.status,
                });
            }
            ensure_not_past(next_date, today)?;
        }

        let changed = next_status != self.status || next_date != self.date;
        self.status = next_status;
        self.date = next_date;
        Ok(changed)
    }

    /// Appointment identifier.
    pub fn id(&self) -> AppointmentId {
        self.id
    }

    /// Patient the visit is booked for.
    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    /// Clinic that owns the visit.
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Day of the visit.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Current status.
    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    /// Whether the visit was booked at the priority rate.
    pub fn is_prior(&self) -> bool {
        self.is_prior
    }

    /// Price fixed from the clinic rates at booking time.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// When the visit was booked.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), AppointmentValidationError> {
    if date < today {
        return Err(AppointmentValidationError::DateInPast { date, today });
    }
    Ok(())
}
