//! Unit tests for `DirectoryRepo`.

use std::sync::Arc;

use checkin_bot::models::Employee;
use checkin_bot::persistence::{db, directory_repo::DirectoryRepo};

async fn repo() -> DirectoryRepo {
    let db = db::connect_memory().await.expect("db");
    DirectoryRepo::new(Arc::new(db))
}

#[tokio::test]
async fn register_then_find() {
    let repo = repo().await;
    let inserted = repo
        .register(&Employee::new("Ann Lee", "U1"))
        .await
        .expect("register");
    assert!(inserted);

    let found = repo.find("U1").await.expect("find").expect("present");
    assert_eq!(found.display_name, "Ann Lee");
    assert_eq!(found.identity, "U1");
}

#[tokio::test]
async fn find_unknown_identity_returns_none() {
    let repo = repo().await;
    assert!(repo.find("U404").await.expect("find").is_none());
}

#[tokio::test]
async fn registration_is_idempotent_and_keeps_first_name() {
    let repo = repo().await;
    assert!(repo.register(&Employee::new("Ann", "U1")).await.expect("first"));
    assert!(!repo
        .register(&Employee::new("Annie", "U1"))
        .await
        .expect("second"));

    let all = repo.list_all().await.expect("list");
    assert_eq!(all, vec![Employee::new("Ann", "U1")]);
}

#[tokio::test]
async fn list_all_keeps_registration_order() {
    let repo = repo().await;
    for (name, id) in [("Zed", "U3"), ("Ann", "U1"), ("Bob", "U2")] {
        repo.register(&Employee::new(name, id)).await.expect("register");
    }

    let ids: Vec<String> = repo
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|e| e.identity)
        .collect();
    assert_eq!(ids, vec!["U3", "U1", "U2"]);
}

#[tokio::test]
async fn file_database_survives_reconnect() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("checkin.db");

    {
        let db = db::connect(&path).await.expect("connect");
        let repo = DirectoryRepo::new(Arc::new(db.clone()));
        repo.register(&Employee::new("Ann", "U1")).await.expect("register");
        db.close().await;
    }

    let db = db::connect(&path).await.expect("reconnect");
    let repo = DirectoryRepo::new(Arc::new(db));
    assert!(repo.find("U1").await.expect("find").is_some());
}

#[tokio::test]
async fn unusable_db_directory_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").expect("write blocker");

    let err = db::connect(blocker.join("checkin.db"))
        .await
        .expect_err("parent is a file");
    assert!(matches!(err, checkin_bot::AppError::Io(_)), "{err}");
}
