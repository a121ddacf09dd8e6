//! In-process clinic store implementing every repository port.
//!
//! Used when no database URL is configured and by tests. All state sits
//! behind one mutex, so each port call is atomic with respect to the others.

mod repositories;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    Appointment, AppointmentId, ClinicalNote, NoteId, Patient, PatientId, Reception, Tenant,
    TenantDomain, TenantId, User, UserId,
};

#[derive(Debug, Default)]
struct ClinicState {
    users: HashMap<UserId, User>,
    tenants: HashMap<TenantId, Tenant>,
    domains: Vec<TenantDomain>,
    receptions: HashMap<UserId, Reception>,
    patients: HashMap<PatientId, Patient>,
    appointments: HashMap<AppointmentId, Appointment>,
    notes: HashMap<NoteId, ClinicalNote>,
}

impl ClinicState {
    /// Name of the first unique user column `user` would clash on.
    fn user_clash(&self, user: &User) -> Option<&'static str> {
        self.users.values().find_map(|existing| {
            if existing.username() == user.username() {
                Some("username")
            } else if existing.phone() == user.phone() {
                Some("phone")
            } else {
                None
            }
        })
    }

    fn remove_tenant(&mut self, id: &TenantId) -> bool {
        let Some(tenant) = self.tenants.remove(id) else {
            return false;
        };
        self.notes.retain(|_, note| note.tenant_id != *id);
        self.appointments
            .retain(|_, appointment| appointment.tenant_id() != *id);

        let patient_users: Vec<UserId> = self
            .patients
            .values()
            .filter(|patient| patient.tenant_id == *id)
            .map(|patient| patient.user_id)
            .collect();
        self.patients.retain(|_, patient| patient.tenant_id != *id);

        let reception_users: Vec<UserId> = self
            .receptions
            .values()
            .filter(|reception| reception.tenant_id == *id)
            .map(|reception| reception.user_id)
            .collect();
        self.receptions
            .retain(|_, reception| reception.tenant_id != *id);

        self.domains.retain(|domain| domain.tenant_id != *id);
        for user_id in patient_users
            .iter()
            .chain(reception_users.iter())
            .chain(std::iter::once(&tenant.doctor_user_id))
        {
            self.users.remove(user_id);
        }
        true
    }
}

/// Failure raised by the store itself, before a port maps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFailure {
    Offline,
    Poisoned,
}

impl StoreFailure {
    fn message(self) -> &'static str {
        match self {
            Self::Offline => "in-memory store is offline",
            Self::Poisoned => "in-memory store lock poisoned",
        }
    }
}

/// Mutex-guarded clinic data.
///
/// # Examples
/// ```
/// use clinic::outbound::memory::InMemoryClinicStore;
///
/// let store = InMemoryClinicStore::new();
/// assert!(store.is_available());
/// store.set_available(false);
/// assert!(!store.is_available());
/// ```
#[derive(Debug)]
pub struct InMemoryClinicStore {
    state: Mutex<ClinicState>,
    available: AtomicBool,
}

impl Default for InMemoryClinicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClinicState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the backing store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ClinicState>, StoreFailure> {
        if !self.is_available() {
            return Err(StoreFailure::Offline);
        }
        self.state.lock().map_err(|_| StoreFailure::Poisoned)
    }
}

#[cfg(test)]
mod tests;
