//! Driving port for staff-initiated account registration.

use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::{
    Actor, Age, Error, PatientId, PhoneNumber, ReceptionId, TenantId, UserId, Username,
};

/// Patient signup performed by reception or the doctor.
#[derive(Debug, Clone)]
pub struct RegisterPatientRequest {
    pub username: Username,
    pub phone: PhoneNumber,
    pub password: Option<Zeroizing<String>>,
    pub age: Age,
}

/// Reception signup performed by the doctor.
#[derive(Debug, Clone)]
pub struct RegisterReceptionRequest {
    pub username: Username,
    pub phone: PhoneNumber,
    pub password: Zeroizing<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPatient {
    pub user_id: UserId,
    pub patient_id: PatientId,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredReception {
    pub user_id: UserId,
    pub reception_id: ReceptionId,
    pub tenant_id: TenantId,
}

#[async_trait]
pub trait RegistrationCommand: Send + Sync {
    /// Requires the `staff` capability; the patient joins the actor's tenant.
    async fn register_patient(
        &self,
        actor: &Actor,
        request: RegisterPatientRequest,
    ) -> Result<RegisteredPatient, Error>;

    /// Requires the `doctor` capability.
    async fn register_reception(
        &self,
        actor: &Actor,
        request: RegisterReceptionRequest,
    ) -> Result<RegisteredReception, Error>;
}
