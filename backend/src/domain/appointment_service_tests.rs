//! Tests for booking and updating appointments.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

use super::*;
use crate::domain::ports::{
    AppointmentRepositoryError, MockAppointmentRepository, MockPatientRepository,
    MockTenantRepository,
};
use crate::domain::{
    AppointmentStatus, ErrorCode, Membership, Role, TenantId, TenantRates, UserId,
};
use crate::outbound::memory::InMemoryClinicStore;
use crate::test_support::{MutableClock, SeededClinic, seed_clinic};

type Store = InMemoryClinicStore;
type Service = AppointmentService<Store, Store, Store>;

struct World {
    clock: Arc<MutableClock>,
    clinic: SeededClinic,
    service: Service,
}

#[fixture]
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
}

async fn world(today: NaiveDate) -> World {
    let store = Arc::new(Store::new());
    let clock = Arc::new(MutableClock::on(today));
    let clinic = seed_clinic(&store, "mona", 1, clock.utc()).await;
    let service = AppointmentService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        clock.clone(),
    );
    World {
        clock,
        clinic,
        service,
    }
}

fn booking(world: &World, date: NaiveDate, is_prior: bool) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_user_id: world.clinic.patient_user.id(),
        date,
        is_prior,
    }
}

fn status_change(status: AppointmentStatus) -> AppointmentChanges {
    AppointmentChanges {
        status: Some(status),
        date: None,
    }
}

// Cost scenario: default rate 100, standard visit, later completed.

#[given("a clinic whose default cost is 100")]
fn a_clinic_whose_default_cost_is_100(rates: TenantRates) -> u32 {
    rates.default_cost
}

#[when("the appointment is marked completed")]
fn the_appointment_is_marked_completed() -> AppointmentChanges {
    status_change(AppointmentStatus::Completed)
}

#[then("the appointment still costs the default rate")]
fn the_appointment_still_costs(appointment: Appointment, expected: u32) {
    assert_eq!(appointment.cost(), expected);
}

#[rstest]
#[tokio::test]
async fn completing_an_appointment_keeps_its_cost(today: NaiveDate) {
    let world = world(today).await;
    let rate = a_clinic_whose_default_cost_is_100(world.clinic.tenant.rates);
    assert_eq!(rate, 100);

    let booked = world
        .service
        .create(&world.clinic.reception_actor(), booking(&world, today, false))
        .await
        .expect("booked");
    the_appointment_still_costs(booked.clone(), rate);
    assert_eq!(booked.status(), AppointmentStatus::Pending);

    let completed = world
        .service
        .update(
            &world.clinic.doctor_actor(),
            &booked.id(),
            the_appointment_is_marked_completed(),
        )
        .await
        .expect("completed");
    assert_eq!(completed.status(), AppointmentStatus::Completed);
    the_appointment_still_costs(completed, rate);
}

#[rstest]
#[tokio::test]
async fn prior_visits_use_the_prior_rate(today: NaiveDate) {
    let world = world(today).await;
    let booked = world
        .service
        .create(&world.clinic.doctor_actor(), booking(&world, today, true))
        .await
        .expect("booked");

    assert_eq!(booked.cost(), 250);
    assert!(booked.is_prior());
}

#[rstest]
#[tokio::test]
async fn past_dates_are_rejected(today: NaiveDate) {
    let world = world(today).await;
    let yesterday = today.pred_opt().expect("valid date");

    let err = world
        .service
        .create(&world.clinic.reception_actor(), booking(&world, yesterday, false))
        .await
        .expect_err("past date");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["code"], "date_in_past");
}

#[rstest]
#[tokio::test]
async fn terminal_appointments_cannot_transition(today: NaiveDate) {
    let world = world(today).await;
    let actor = world.clinic.reception_actor();
    let booked = world
        .service
        .create(&actor, booking(&world, today, false))
        .await
        .expect("booked");
    world
        .service
        .update(&actor, &booked.id(), status_change(AppointmentStatus::Canceled))
        .await
        .expect("canceled");

    let err = world
        .service
        .update(&actor, &booked.id(), status_change(AppointmentStatus::Pending))
        .await
        .expect_err("terminal");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let same = world
        .service
        .update(&actor, &booked.id(), status_change(AppointmentStatus::Canceled))
        .await
        .expect("resubmitting the status is a no-op");
    assert_eq!(same.status(), AppointmentStatus::Canceled);
}

#[rstest]
#[tokio::test]
async fn rescheduling_checks_the_current_date(today: NaiveDate) {
    let world = world(today).await;
    let actor = world.clinic.reception_actor();
    let next_week = today + chrono::Duration::days(7);
    let booked = world
        .service
        .create(&actor, booking(&world, next_week, false))
        .await
        .expect("booked");

    world.clock.advance_days(3);
    let err = world
        .service
        .update(
            &actor,
            &booked.id(),
            AppointmentChanges {
                status: None,
                date: Some(today),
            },
        )
        .await
        .expect_err("date now in the past");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let moved = world
        .service
        .update(
            &actor,
            &booked.id(),
            AppointmentChanges {
                status: None,
                date: Some(world.clock.today()),
            },
        )
        .await
        .expect("rescheduled");
    assert_eq!(moved.date(), world.clock.today());
    assert_eq!(moved.cost(), booked.cost());
}

#[rstest]
#[tokio::test]
async fn patients_cannot_book(today: NaiveDate) {
    let world = world(today).await;
    let err = world
        .service
        .create(&world.clinic.patient_actor(), booking(&world, today, false))
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn patients_of_other_tenants_are_not_found(today: NaiveDate) {
    let world = world(today).await;
    let stranger = Actor {
        user_id: UserId::random(),
        role: Role::Doctor,
        membership: Membership::Doctor {
            tenant_id: TenantId::random(),
        },
    };

    let err = world
        .service
        .create(&stranger, booking(&world, today, false))
        .await
        .expect_err("not found");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn repository_outages_map_to_service_unavailable(today: NaiveDate) {
    let mut appointments = MockAppointmentRepository::new();
    appointments
        .expect_find()
        .times(1)
        .return_once(|_, _| Err(AppointmentRepositoryError::connection("pool exhausted")));
    let service = AppointmentService::new(
        Arc::new(appointments),
        Arc::new(MockPatientRepository::new()),
        Arc::new(MockTenantRepository::new()),
        Arc::new(MutableClock::on(today)),
    );
    let actor = Actor {
        user_id: UserId::random(),
        role: Role::Reception,
        membership: Membership::Reception {
            tenant_id: TenantId::random(),
        },
    };

    let err = service
        .update(
            &actor,
            &AppointmentId::random(),
            status_change(AppointmentStatus::Completed),
        )
        .await
        .expect_err("unavailable");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
