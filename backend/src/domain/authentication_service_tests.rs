//! Tests for the login flows and the lockout guard.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::future::join_all;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then};

use super::*;
use crate::domain::ports::{
    FixtureCredentialHasher, MockPatientRepository, MockReceptionRepository,
    MockTenantRepository, MockUserRepository, UserPersistenceError,
};
use crate::domain::{ErrorCode, LoginAttempts, PhoneNumber};
use crate::outbound::memory::InMemoryClinicStore;
use crate::test_support::{FIXTURE_PASSWORD, MutableClock, SeededClinic, fixture_user, seed_clinic};

type Store = InMemoryClinicStore;
type Service = AuthenticationService<Store, Store, Store, Store, FixtureCredentialHasher>;

struct World {
    store: Arc<Store>,
    clock: Arc<MutableClock>,
    clinic: SeededClinic,
    service: Service,
}

#[fixture]
fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid instant")
}

async fn world(start: chrono::DateTime<Utc>) -> World {
    world_with(start, LoginSettings::default()).await
}

async fn world_with(start: chrono::DateTime<Utc>, settings: LoginSettings) -> World {
    let store = Arc::new(Store::new());
    let clock = Arc::new(MutableClock::new(start));
    let clinic = seed_clinic(&store, "mona", 1, start).await;
    let membership =
        MembershipResolver::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&store));
    let service = AuthenticationService::new(
        Arc::clone(&store),
        membership,
        Arc::new(FixtureCredentialHasher),
        clock.clone(),
        settings,
    );
    World {
        store,
        clock,
        clinic,
        service,
    }
}

fn staff(username: &str, password: &str) -> StaffCredentials {
    StaffCredentials::try_from_parts(username, password).expect("credentials")
}

async fn stored_attempts(world: &World, user_id: &UserId) -> LoginAttempts {
    UserRepository::find_by_id(world.store.as_ref(), user_id)
        .await
        .expect("lookup")
        .expect("user exists")
        .login_attempts()
        .clone()
}

#[rstest]
#[tokio::test]
async fn doctor_login_redirects_to_the_tenant_domain(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let outcome = world
        .service
        .login_staff(&staff("dr_mona", FIXTURE_PASSWORD))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.user_id, world.clinic.doctor.id());
    assert_eq!(outcome.redirect, "http://mona.clinic.test:8000/");
}

#[rstest]
#[tokio::test]
async fn reception_login_uses_the_doctors_domain(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let outcome = world
        .service
        .login_staff(&staff("desk_mona", FIXTURE_PASSWORD))
        .await
        .expect("login succeeds");

    assert_eq!(outcome.redirect, "http://mona.clinic.test:8000/");
}

#[rstest]
#[tokio::test]
async fn wrong_password_reports_remaining_attempts(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let err = world
        .service
        .login_staff(&staff("dr_mona", "wrong"))
        .await
        .expect_err("bad password");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.details().expect("details")["remainingAttempts"], 14);
    let attempts = stored_attempts(&world, &world.clinic.doctor.id()).await;
    assert_eq!(attempts.failed(), 1);
    assert_eq!(attempts.last_attempt_at(), Some(start));
}

/// Identity store that yields after every lookup, so concurrent logins all
/// read the account before any of them records a failure.
struct InterleavingUsers(Arc<Store>);

#[async_trait]
impl UserRepository for InterleavingUsers {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        UserRepository::insert(self.0.as_ref(), user).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let found = UserRepository::find_by_id(self.0.as_ref(), id).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        let found = self.0.find_by_username(username).await;
        tokio::task::yield_now().await;
        found
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<User>, UserPersistenceError> {
        let found = self.0.find_by_phone(phone).await;
        tokio::task::yield_now().await;
        found
    }

    async fn record_failed_attempt(
        &self,
        id: &UserId,
        now: chrono::DateTime<Utc>,
        policy: LockoutPolicy,
    ) -> Result<LoginAttempts, UserPersistenceError> {
        self.0.record_failed_attempt(id, now, policy).await
    }

    async fn record_successful_login(
        &self,
        id: &UserId,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), UserPersistenceError> {
        self.0.record_successful_login(id, now).await
    }
}

#[rstest]
#[tokio::test]
async fn interleaved_failures_are_all_counted(start: chrono::DateTime<Utc>) {
    let store = Arc::new(Store::new());
    let clinic = seed_clinic(&store, "mona", 1, start).await;
    let membership =
        MembershipResolver::new(Arc::clone(&store), Arc::clone(&store), Arc::clone(&store));
    let service = AuthenticationService::new(
        Arc::new(InterleavingUsers(Arc::clone(&store))),
        membership,
        Arc::new(FixtureCredentialHasher),
        Arc::new(MutableClock::new(start)),
        LoginSettings::default(),
    );

    let bad = staff("dr_mona", "wrong");
    let results = join_all((0..20).map(|_| service.login_staff(&bad))).await;

    let locked = results
        .iter()
        .filter(|result| {
            result
                .as_ref()
                .is_err_and(|err| err.code() == ErrorCode::Locked)
        })
        .count();
    assert_eq!(locked, 6, "failures 15 through 20 report the lock");

    let attempts = UserRepository::find_by_id(store.as_ref(), &clinic.doctor.id())
        .await
        .expect("lookup")
        .expect("doctor exists")
        .login_attempts()
        .clone();
    assert_eq!(attempts.failed(), 20);
    assert_eq!(attempts.locked_until(), Some(start + chrono::Duration::minutes(15)));

    let err = service
        .login_staff(&staff("dr_mona", FIXTURE_PASSWORD))
        .await
        .expect_err("account is locked");
    assert_eq!(err.code(), ErrorCode::Locked);
}

#[rstest]
#[tokio::test]
async fn unknown_usernames_get_a_generic_error(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let err = world
        .service
        .login_staff(&staff("nobody", "whatever"))
        .await
        .expect_err("unknown user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid credentials");
    assert!(err.details().is_none());
}

#[rstest]
#[tokio::test]
async fn success_resets_the_failure_counter(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    for _ in 0..3 {
        let _ = world.service.login_staff(&staff("dr_mona", "wrong")).await;
    }
    assert_eq!(
        stored_attempts(&world, &world.clinic.doctor.id()).await.failed(),
        3
    );

    world
        .service
        .login_staff(&staff("dr_mona", FIXTURE_PASSWORD))
        .await
        .expect("login succeeds");

    let attempts = stored_attempts(&world, &world.clinic.doctor.id()).await;
    assert_eq!(attempts.failed(), 0);
    assert_eq!(attempts.locked_until(), None);
}

#[rstest]
#[tokio::test]
async fn patients_cannot_use_the_staff_login(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let err = world
        .service
        .login_staff(&staff("patient_mona", FIXTURE_PASSWORD))
        .await
        .expect_err("patients are not staff");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(
        stored_attempts(&world, &world.clinic.patient_user.id())
            .await
            .failed(),
        1
    );
}

#[rstest]
#[tokio::test]
async fn staff_without_a_clinic_are_sent_home(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let admin = fixture_user("root", "01000000000", Role::Admin, start);
    UserRepository::insert(world.store.as_ref(), &admin)
        .await
        .expect("insert admin");

    let err = world
        .service
        .login_staff(&staff("root", FIXTURE_PASSWORD))
        .await
        .expect_err("no clinic");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.details().expect("details")["redirect"], "/");
}

// Lockout scenario, written as behaviour steps.

#[given("the default lockout policy")]
fn the_default_lockout_policy() -> LoginSettings {
    LoginSettings::default()
}

async fn a_doctor_who_failed_fifteen_times(
    start: chrono::DateTime<Utc>,
    settings: LoginSettings,
) -> World {
    let world = world_with(start, settings).await;
    let mut last = None;
    for _ in 0..15 {
        last = Some(
            world
                .service
                .login_staff(&staff("dr_mona", "wrong"))
                .await
                .expect_err("bad password"),
        );
    }
    let last = last.expect("attempts were made");
    assert_eq!(last.code(), ErrorCode::Locked);
    world
}

async fn the_doctor_logs_in_correctly(world: &World) -> Result<LoginOutcome, Error> {
    world
        .service
        .login_staff(&staff("dr_mona", FIXTURE_PASSWORD))
        .await
}

#[then("the login is refused as locked")]
fn the_login_is_refused_as_locked(result: Result<LoginOutcome, Error>) {
    let err = result.expect_err("account locked");
    assert_eq!(err.code(), ErrorCode::Locked);
    assert!(err.details().expect("details")["lockedUntil"].is_string());
}

#[then("the login succeeds")]
fn the_login_succeeds(result: Result<LoginOutcome, Error>) {
    let outcome = result.expect("login succeeds");
    assert_eq!(outcome.redirect, "http://mona.clinic.test:8000/");
}

#[rstest]
#[tokio::test]
async fn locked_accounts_refuse_correct_passwords_until_expiry(start: chrono::DateTime<Utc>) {
    let world = a_doctor_who_failed_fifteen_times(start, the_default_lockout_policy()).await;

    the_login_is_refused_as_locked(the_doctor_logs_in_correctly(&world).await);
    world.clock.advance_minutes(14);
    the_login_is_refused_as_locked(the_doctor_logs_in_correctly(&world).await);

    world.clock.advance_minutes(1);
    the_login_succeeds(the_doctor_logs_in_correctly(&world).await);
    assert_eq!(
        stored_attempts(&world, &world.clinic.doctor.id()).await.failed(),
        0
    );
}

#[rstest]
#[tokio::test]
async fn attempts_while_locked_are_not_counted(start: chrono::DateTime<Utc>) {
    let world = a_doctor_who_failed_fifteen_times(start, the_default_lockout_policy()).await;
    let before = stored_attempts(&world, &world.clinic.doctor.id()).await;

    let _ = world.service.login_staff(&staff("dr_mona", "wrong")).await;

    assert_eq!(stored_attempts(&world, &world.clinic.doctor.id()).await, before);
}

fn patient(phone: &str, username: &str) -> PatientCredentials {
    PatientCredentials::try_from_parts(phone, username).expect("credentials")
}

#[rstest]
#[tokio::test]
async fn patient_login_redirects_to_the_profile(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    let outcome = world
        .service
        .login_patient(&patient("01001000003", "patient_mona"))
        .await
        .expect("login succeeds");

    let user_id = world.clinic.patient_user.id();
    assert_eq!(outcome.user_id, user_id);
    assert_eq!(
        outcome.redirect,
        format!("http://mona.clinic.test/patient-profile/{user_id}")
    );
}

#[rstest]
#[case("01001000003", "someone_else")]
#[case("01009999999", "patient_mona")]
#[case("01001000001", "dr_mona")]
#[tokio::test]
async fn patient_failures_share_one_generic_message(
    start: chrono::DateTime<Utc>,
    #[case] phone: &str,
    #[case] username: &str,
) {
    let world = world(start).await;
    let err = world
        .service
        .login_patient(&patient(phone, username))
        .await
        .expect_err("login fails");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid credentials");
    assert!(err.details().is_none());
}

#[rstest]
#[tokio::test]
async fn locked_patients_are_told_to_contact_reception(start: chrono::DateTime<Utc>) {
    let world = world(start).await;
    for _ in 0..15 {
        let _ = world
            .service
            .login_patient(&patient("01001000003", "wrong_name"))
            .await;
    }

    let err = world
        .service
        .login_patient(&patient("01001000003", "patient_mona"))
        .await
        .expect_err("locked");

    assert_eq!(err.code(), ErrorCode::Locked);
    assert_eq!(err.message(), "account locked; contact reception");
}

#[rstest]
#[tokio::test]
async fn missing_primary_domain_falls_back_to_the_dashboard(start: chrono::DateTime<Utc>) {
    let doctor = fixture_user("dr_mona", "01001000001", Role::Doctor, start);
    let tenant_id = TenantId::random();

    let mut users = MockUserRepository::new();
    let found = doctor.clone();
    users
        .expect_find_by_username()
        .return_once(move |_| Ok(Some(found)));
    users
        .expect_record_successful_login()
        .returning(|_, _| Ok(()));

    let mut tenants = MockTenantRepository::new();
    let owner = doctor.id();
    tenants.expect_find_by_doctor().return_once(move |_| {
        Ok(Some(crate::domain::Tenant {
            id: tenant_id,
            schema_name: crate::domain::SchemaName::new("mona").expect("schema"),
            doctor_user_id: owner,
            practice: crate::domain::Practice::new("General", "Cairo").expect("practice"),
            rates: crate::test_support::FIXTURE_RATES,
            created_at: start,
        }))
    });
    tenants.expect_primary_domain().return_once(|_| Ok(None));

    let membership = MembershipResolver::new(
        Arc::new(tenants),
        Arc::new(MockReceptionRepository::new()),
        Arc::new(MockPatientRepository::new()),
    );
    let service = AuthenticationService::new(
        Arc::new(users),
        membership,
        Arc::new(FixtureCredentialHasher),
        Arc::new(MutableClock::new(start)),
        LoginSettings::default(),
    );

    let outcome = service
        .login_staff(&staff("dr_mona", FIXTURE_PASSWORD))
        .await
        .expect("login succeeds");
    assert_eq!(outcome.redirect, "/dashboard");
}
