//! Unit tests for `StatusRepo`.

use std::sync::Arc;

use chrono::NaiveDate;

use checkin_bot::models::{Employee, StatusEntry, StatusKind};
use checkin_bot::persistence::{db, status_repo::StatusRepo};
use checkin_bot::AppError;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, d).expect("valid date")
}

#[tokio::test]
async fn record_persists_all_fields() {
    let db = db::connect_memory().await.expect("db");
    let repo = StatusRepo::new(Arc::new(db));
    let ann = Employee::new("Ann", "U1");

    let saved = repo
        .record(day(7), &ann, StatusKind::RunningLate, "11:00", "dentist")
        .await
        .expect("record");

    let all = repo.list_all().await.expect("list");
    assert_eq!(all, vec![saved.clone()]);
    assert_eq!(saved.date, day(7));
    assert_eq!(saved.display_name, "Ann");
    assert_eq!(saved.kind, StatusKind::RunningLate);
    assert_eq!(saved.primary_detail, "11:00");
    assert_eq!(saved.secondary_detail, "dentist");
}

#[tokio::test]
async fn duplicates_are_appended_in_order() {
    let db = db::connect_memory().await.expect("db");
    let repo = StatusRepo::new(Arc::new(db));
    let ann = Employee::new("Ann", "U1");

    repo.record(day(7), &ann, StatusKind::InOffice, "09:00", "")
        .await
        .expect("first");
    repo.record(day(7), &ann, StatusKind::Remote, "", "went home")
        .await
        .expect("second");

    let kinds: Vec<StatusKind> = repo
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec![StatusKind::InOffice, StatusKind::Remote]);
}

#[tokio::test]
async fn list_for_identity_filters_rows() {
    let db = db::connect_memory().await.expect("db");
    let repo = StatusRepo::new(Arc::new(db));

    repo.record(day(7), &Employee::new("Ann", "U1"), StatusKind::DayOff, "", "")
        .await
        .expect("ann");
    repo.record(day(7), &Employee::new("Bob", "U2"), StatusKind::DayOff, "", "")
        .await
        .expect("bob");

    let rows = repo.list_for_identity("U2").await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].display_name, "Bob");
}

#[tokio::test]
async fn dates_are_stored_as_day_month_year() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = StatusRepo::new(Arc::clone(&db));
    repo.append(&StatusEntry {
        date: day(7),
        display_name: "Ann".into(),
        identity: "U1".into(),
        kind: StatusKind::Vacation,
        primary_detail: "07.09–12.09".into(),
        secondary_detail: String::new(),
    })
    .await
    .expect("append");

    let (date, kind): (String, String) =
        sqlx::query_as("SELECT date, kind FROM status_log")
            .fetch_one(db.as_ref())
            .await
            .expect("raw row");
    assert_eq!(date, "07.09.2025");
    assert_eq!(kind, "vacation");
}

#[tokio::test]
async fn malformed_date_row_is_reported() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    sqlx::query(
        "INSERT INTO status_log (date, display_name, identity, kind) VALUES ('2025-09-07', 'Ann', 'U1', 'remote')",
    )
    .execute(db.as_ref())
    .await
    .expect("raw insert");

    let repo = StatusRepo::new(db);
    let err = repo.list_all().await.expect_err("bad date");
    assert!(matches!(err, AppError::Db(_)));
    assert!(err.to_string().contains("2025-09-07"));
}

#[tokio::test]
async fn unknown_kind_is_rejected_by_schema() {
    let db = db::connect_memory().await.expect("db");
    let result = sqlx::query(
        "INSERT INTO status_log (date, display_name, identity, kind) VALUES ('07.09.2025', 'Ann', 'U1', 'sick')",
    )
    .execute(&db)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn identities_on_lists_each_identity_once() {
    let db = Arc::new(db::connect_memory().await.expect("db"));
    let repo = StatusRepo::new(Arc::clone(&db));
    let ann = Employee::new("Ann", "U1");

    repo.record(day(7), &ann, StatusKind::InOffice, "09:00", "")
        .await
        .expect("first");
    repo.record(day(7), &ann, StatusKind::Remote, "", "")
        .await
        .expect("second");
    repo.record(day(6), &Employee::new("Bob", "U2"), StatusKind::DayOff, "", "")
        .await
        .expect("other day");
    sqlx::query(
        "INSERT INTO status_log (date, display_name, identity, kind) VALUES ('2025-09-07', 'Cid', 'U3', 'remote')",
    )
    .execute(db.as_ref())
    .await
    .expect("raw insert");

    let identities = repo.identities_on(day(7)).await.expect("identities");
    assert_eq!(identities, vec!["U1"]);
}
