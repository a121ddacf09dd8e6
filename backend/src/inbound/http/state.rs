//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on driving ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ActorResolver, AppointmentRepository, AppointmentsCommand, ClinicQuery,
    ClinicalNoteRepository, ClinicalNotesCommand, CredentialHasher, LoginService,
    PatientRepository, ReceptionRepository, RegistrationCommand, TenantRepository,
    UserRepository,
};
use crate::domain::{
    ActorService, AppointmentService, AuthenticationService, ClinicQueryService,
    ClinicalNotesService, LoginSettings, MembershipResolver, RegistrationService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub actors: Arc<dyn ActorResolver>,
    pub registration: Arc<dyn RegistrationCommand>,
    pub appointments: Arc<dyn AppointmentsCommand>,
    pub queries: Arc<dyn ClinicQuery>,
    pub notes: Arc<dyn ClinicalNotesCommand>,
}

/// Driven adapters the clinic services run over.
///
/// The in-memory store fills every slot with the same `Arc`; the Diesel
/// adapters are one repository per table family.
pub struct ClinicRepositories<U, T, R, P, A, N> {
    pub users: Arc<U>,
    pub tenants: Arc<T>,
    pub receptions: Arc<R>,
    pub patients: Arc<P>,
    pub appointments: Arc<A>,
    pub notes: Arc<N>,
}

impl HttpState {
    /// Wire every driving port to its domain service.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use clinic::domain::LoginSettings;
    /// use clinic::domain::ports::FixtureCredentialHasher;
    /// use clinic::inbound::http::state::{ClinicRepositories, HttpState};
    /// use clinic::outbound::memory::InMemoryClinicStore;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(InMemoryClinicStore::new());
    /// let state = HttpState::from_repositories(
    ///     ClinicRepositories {
    ///         users: store.clone(),
    ///         tenants: store.clone(),
    ///         receptions: store.clone(),
    ///         patients: store.clone(),
    ///         appointments: store.clone(),
    ///         notes: store,
    ///     },
    ///     Arc::new(FixtureCredentialHasher),
    ///     Arc::new(DefaultClock),
    ///     LoginSettings::default(),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn from_repositories<U, T, R, P, A, N, H>(
        repositories: ClinicRepositories<U, T, R, P, A, N>,
        hasher: Arc<H>,
        clock: Arc<dyn Clock>,
        settings: LoginSettings,
    ) -> Self
    where
        U: UserRepository + 'static,
        T: TenantRepository + 'static,
        R: ReceptionRepository + 'static,
        P: PatientRepository + 'static,
        A: AppointmentRepository + 'static,
        N: ClinicalNoteRepository + 'static,
        H: CredentialHasher + 'static,
    {
        let ClinicRepositories {
            users,
            tenants,
            receptions,
            patients,
            appointments,
            notes,
        } = repositories;
        let membership = MembershipResolver::new(
            Arc::clone(&tenants),
            Arc::clone(&receptions),
            Arc::clone(&patients),
        );

        Self {
            login: Arc::new(AuthenticationService::new(
                Arc::clone(&users),
                membership.clone(),
                Arc::clone(&hasher),
                Arc::clone(&clock),
                settings,
            )),
            actors: Arc::new(ActorService::new(Arc::clone(&users), membership)),
            registration: Arc::new(RegistrationService::new(
                Arc::clone(&patients),
                receptions,
                hasher,
                Arc::clone(&clock),
            )),
            appointments: Arc::new(AppointmentService::new(
                Arc::clone(&appointments),
                Arc::clone(&patients),
                tenants,
                Arc::clone(&clock),
            )),
            queries: Arc::new(ClinicQueryService::new(
                users,
                patients,
                Arc::clone(&appointments),
                Arc::clone(&notes),
            )),
            notes: Arc::new(ClinicalNotesService::new(appointments, notes, clock)),
        }
    }
}
