//! Behaviour of the in-memory clinic store.

use chrono::{NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AppointmentRepository, ClinicalNoteRepository, PatientRepository, TenantRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AppointmentStatus, LockoutPolicy, LoginAttempts, NewAppointment, NoteBody, NoteKind, Role,
};
use crate::test_support::{FIXTURE_RATES, fixture_user, seed_clinic};

#[fixture]
fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid instant")
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
}

fn book(tenant_id: TenantId, patient_id: PatientId, at: chrono::DateTime<Utc>) -> Appointment {
    Appointment::schedule(
        NewAppointment {
            id: AppointmentId::random(),
            patient_id,
            tenant_id,
            date: today(),
            is_prior: false,
        },
        FIXTURE_RATES,
        today(),
        at,
    )
    .expect("valid appointment")
}

#[rstest]
#[tokio::test]
async fn duplicate_usernames_and_phones_are_rejected(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let first = fixture_user("amira", "01012345678", Role::Admin, now);
    UserRepository::insert(&store, &first).await.expect("insert");

    let same_name = fixture_user("amira", "01099999999", Role::Admin, now);
    let err = UserRepository::insert(&store, &same_name)
        .await
        .expect_err("duplicate username");
    assert_eq!(err, UserPersistenceError::duplicate("username"));

    let same_phone = fixture_user("other", "+201012345678", Role::Admin, now);
    let err = UserRepository::insert(&store, &same_phone)
        .await
        .expect_err("duplicate phone");
    assert_eq!(err, UserPersistenceError::duplicate("phone"));
}

#[rstest]
#[tokio::test]
async fn offline_store_reports_connection_errors(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    store.set_available(false);
    let user = fixture_user("amira", "01012345678", Role::Admin, now);

    let err = UserRepository::insert(&store, &user)
        .await
        .expect_err("offline");
    assert!(matches!(err, UserPersistenceError::Connection { .. }));
}

#[rstest]
#[tokio::test]
async fn failed_attempts_accumulate_until_the_lock(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let clinic = seed_clinic(&store, "mona", 1, now).await;
    let policy = LockoutPolicy::new(2, chrono::Duration::minutes(15));

    let first = store
        .record_failed_attempt(&clinic.doctor.id(), now, policy)
        .await
        .expect("first failure");
    let second = store
        .record_failed_attempt(&clinic.doctor.id(), now, policy)
        .await
        .expect("second failure");

    assert_eq!(first, LoginAttempts::from_parts(1, Some(now), None));
    assert_eq!(second.failed(), 2);
    assert_eq!(second.locked_until(), Some(now + chrono::Duration::minutes(15)));
    let reloaded = UserRepository::find_by_id(&store, &clinic.doctor.id())
        .await
        .expect("lookup")
        .expect("doctor exists");
    assert_eq!(reloaded.login_attempts(), &second);
}

#[rstest]
#[tokio::test]
async fn successful_logins_clear_the_counter(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let clinic = seed_clinic(&store, "mona", 1, now).await;
    store
        .record_failed_attempt(&clinic.doctor.id(), now, LockoutPolicy::default())
        .await
        .expect("failure");

    store
        .record_successful_login(&clinic.doctor.id(), now)
        .await
        .expect("success");

    let reloaded = UserRepository::find_by_id(&store, &clinic.doctor.id())
        .await
        .expect("lookup")
        .expect("doctor exists");
    assert_eq!(
        reloaded.login_attempts(),
        &LoginAttempts::from_parts(0, Some(now), None)
    );
}

#[rstest]
#[tokio::test]
async fn failures_for_unknown_users_are_query_errors(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let err = store
        .record_failed_attempt(&crate::domain::UserId::random(), now, LockoutPolicy::default())
        .await
        .expect_err("no such user");
    assert!(matches!(err, UserPersistenceError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn tenant_scoped_reads_ignore_other_tenants(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let mona = seed_clinic(&store, "mona", 1, now).await;
    let samir = seed_clinic(&store, "samir", 2, now).await;
    let appointment = book(mona.tenant.id, mona.patient.id, now);
    AppointmentRepository::insert(&store, &appointment)
        .await
        .expect("insert");

    let foreign = AppointmentRepository::find(&store, &samir.tenant.id, &appointment.id())
        .await
        .expect("lookup");
    assert!(foreign.is_none());
    let foreign_patient = PatientRepository::find(&store, &samir.tenant.id, &mona.patient.id)
        .await
        .expect("lookup");
    assert!(foreign_patient.is_none());
    assert_eq!(
        store.count_for_tenant(&samir.tenant.id).await.expect("count"),
        1
    );
}

#[rstest]
#[tokio::test]
async fn appointment_listings_are_newest_first(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let clinic = seed_clinic(&store, "mona", 1, now).await;
    let older = book(clinic.tenant.id, clinic.patient.id, now);
    let newer = book(
        clinic.tenant.id,
        clinic.patient.id,
        now + chrono::Duration::minutes(5),
    );
    AppointmentRepository::insert(&store, &older).await.expect("insert");
    AppointmentRepository::insert(&store, &newer).await.expect("insert");

    let listings = AppointmentRepository::list_for_tenant(&store, &clinic.tenant.id)
        .await
        .expect("list");
    let ids: Vec<_> = listings.iter().map(|row| row.appointment.id()).collect();
    assert_eq!(ids, vec![newer.id(), older.id()]);
    assert_eq!(listings[0].patient_user_id, clinic.patient_user.id());
    assert_eq!(
        store.count_pending(&clinic.tenant.id).await.expect("count"),
        2
    );
}

#[rstest]
#[tokio::test]
async fn schedule_updates_keep_the_stored_cost(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let clinic = seed_clinic(&store, "mona", 1, now).await;
    let appointment = book(clinic.tenant.id, clinic.patient.id, now);
    AppointmentRepository::insert(&store, &appointment)
        .await
        .expect("insert");

    let tampered = Appointment::restore(crate::domain::AppointmentRecord {
        id: appointment.id(),
        patient_id: appointment.patient_id(),
        tenant_id: appointment.tenant_id(),
        date: appointment.date(),
        status: AppointmentStatus::Completed,
        is_prior: true,
        cost: 9_999,
        created_at: appointment.created_at(),
    });
    store.update_schedule(&tampered).await.expect("update");

    let stored = AppointmentRepository::find(&store, &clinic.tenant.id, &appointment.id())
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stored.status(), AppointmentStatus::Completed);
    assert_eq!(stored.cost(), 100);
    assert!(!stored.is_prior());
}

#[rstest]
#[tokio::test]
async fn deleting_a_tenant_cascades_to_dependents(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let mona = seed_clinic(&store, "mona", 1, now).await;
    let samir = seed_clinic(&store, "samir", 2, now).await;
    let appointment = book(mona.tenant.id, mona.patient.id, now);
    AppointmentRepository::insert(&store, &appointment)
        .await
        .expect("insert");
    let note = ClinicalNote {
        id: NoteId::random(),
        appointment_id: appointment.id(),
        tenant_id: mona.tenant.id,
        kind: NoteKind::Diagnosis,
        body: NoteBody::new(NoteKind::Diagnosis, "flu").expect("valid body"),
        created_at: now,
        updated_at: now,
    };
    ClinicalNoteRepository::insert(&store, &note)
        .await
        .expect("insert note");

    assert!(TenantRepository::delete(&store, &mona.tenant.id).await.expect("delete"));

    for user in [&mona.doctor, &mona.reception, &mona.patient_user] {
        let found = UserRepository::find_by_id(&store, &user.id())
            .await
            .expect("lookup");
        assert!(found.is_none(), "{} should be gone", user.username());
    }
    assert!(
        AppointmentRepository::find(&store, &mona.tenant.id, &appointment.id())
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        ClinicalNoteRepository::find(&store, &mona.tenant.id, &note.id)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(
        store
            .primary_domain(&mona.tenant.id)
            .await
            .expect("lookup")
            .is_none()
    );

    let survivor = UserRepository::find_by_id(&store, &samir.patient_user.id())
        .await
        .expect("lookup");
    assert!(survivor.is_some());
    assert!(!TenantRepository::delete(&store, &mona.tenant.id).await.expect("delete"));
}

#[rstest]
#[tokio::test]
async fn provisioning_rejects_taken_schema_names(now: chrono::DateTime<Utc>) {
    let store = InMemoryClinicStore::new();
    let mona = seed_clinic(&store, "mona", 1, now).await;
    let doctor = fixture_user("dr_other", "01077777777", Role::Doctor, now);
    let tenant = Tenant {
        id: TenantId::random(),
        doctor_user_id: doctor.id(),
        ..mona.tenant.clone()
    };
    let domain = TenantDomain {
        tenant_id: tenant.id,
        ..mona.domain.clone()
    };

    let err = store
        .provision(&crate::domain::ports::TenantProvision {
            doctor,
            tenant,
            domain,
        })
        .await
        .expect_err("schema clash");
    assert_eq!(
        err,
        crate::domain::ports::TenantRepositoryError::duplicate("schema_name")
    );
}
