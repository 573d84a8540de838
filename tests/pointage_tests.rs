use predicates::str::contains;

mod common;
use common::{
    FAR_FROM_SITE, NEAR_SITE, SITE, add_day_contract, init_tenant_and_worker, pointage,
    setup_test_db, sp,
};

#[test]
fn clock_in_outside_the_geofence_reports_distance_and_limit() {
    let db = setup_test_db("geofence_reject");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    pointage(&db, FAR_FROM_SITE, "2099-01-05 09:00")
        .failure()
        .stderr(contains("the limit is 500 m"))
        .stderr(contains("you are"));
}

#[test]
fn clock_in_inside_the_geofence_then_clock_out_with_overtime_note() {
    let db = setup_test_db("full_cycle");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    pointage(&db, NEAR_SITE, "2099-01-05 09:00")
        .success()
        .stdout(contains("clock-in recorded for worker 1"));

    // the same endpoint becomes a clock-out while a record is open;
    // an explicit departure past the scheduled end yields an overtime note
    sp().args([
        "--db",
        &db,
        "--now",
        "2099-01-05 16:55",
        "pointage",
        "--tenant",
        "1",
        "--contract",
        "1",
        "--worker",
        "1",
        "--location",
        NEAR_SITE,
        "--departure",
        "2099-01-05 17:25",
    ])
    .assert()
    .success()
    .stdout(contains("clock-out recorded for worker 1"))
    .stdout(contains("Overtime performed: 25 minutes."));
}

#[test]
fn late_arrival_gets_a_delay_note_and_early_departure_its_own() {
    let db = setup_test_db("notes");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    pointage(&db, SITE, "2099-01-05 10:05")
        .success()
        .stdout(contains("Arrival with 1 hour and 5 minutes of delay."));

    pointage(&db, SITE, "2099-01-05 16:30")
        .success()
        .stdout(contains("Early departure of 30 minutes before scheduled end."));
}

#[test]
fn third_pointage_of_the_day_is_rejected() {
    let db = setup_test_db("double_pointage");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    pointage(&db, SITE, "2099-01-05 09:00").success();
    pointage(&db, SITE, "2099-01-05 16:50").success();

    pointage(&db, SITE, "2099-01-05 16:55")
        .failure()
        .stderr(contains("already recorded today"));
}

#[test]
fn pointage_without_an_active_contract_is_rejected() {
    let db = setup_test_db("no_active");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    pointage(&db, SITE, "2099-01-06 09:00")
        .failure()
        .stderr(contains("No active contract"));
}

#[test]
fn unassigned_worker_cannot_point() {
    let db = setup_test_db("unassigned");
    init_tenant_and_worker(&db);
    add_day_contract(&db, "2099-01-05", "2099-01-04 12:00");

    sp().args([
        "--db",
        &db,
        "worker",
        "--tenant",
        "1",
        "noa",
    ])
    .assert()
    .success();

    sp().args([
        "--db",
        &db,
        "--now",
        "2099-01-05 09:00",
        "pointage",
        "--tenant",
        "1",
        "--contract",
        "1",
        "--worker",
        "2",
        "--location",
        SITE,
    ])
    .assert()
    .failure()
    .stderr(contains("not assigned to contract 1"));
}
