//! Integration tests for the check-in dialogue end to end.
//!
//! Each test drives `ConversationEngine::handle` turn by turn against an
//! in-memory store and asserts on replies, session state, and the rows
//! that land in the status log.

use checkin_bot::conversation::{DialogueState, Input};
use checkin_bot::models::StatusKind;
use checkin_bot::transport::{Menu, MenuChoice};

use super::test_helpers::{today, today_at, Harness};

const ASK_NAME: &str = "Hi! What's your name? It will be shown in the daily roster.";
const CHOOSE_STATUS: &str = "Pick your status for today:";

fn choice(kind: StatusKind) -> Input {
    Input::Choice(MenuChoice::Status(kind))
}

fn text(raw: &str) -> Input {
    Input::Text(raw.to_owned())
}

#[tokio::test]
async fn new_user_registers_and_checks_in_at_office() {
    let h = Harness::new(today_at(9, 15)).await;

    let reply = h.engine.handle("U1", Input::Start).await;
    assert_eq!(reply.text, ASK_NAME);
    assert_eq!(reply.menu, None);
    assert_eq!(
        h.sessions.state_of("U1").await,
        Some(DialogueState::AwaitIdentity)
    );

    let reply = h.engine.handle("U1", text("Ann Lee")).await;
    assert_eq!(reply.text, CHOOSE_STATUS);
    assert_eq!(reply.menu, Some(Menu::Status));

    let reply = h.engine.handle("U1", choice(StatusKind::InOffice)).await;
    assert_eq!(reply.text, "Recorded: in office since 09:15.");
    assert!(h.sessions.state_of("U1").await.is_none());

    let employee = h.directory.find("U1").await.expect("find").expect("registered");
    assert_eq!(employee.display_name, "Ann Lee");

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, today());
    assert_eq!(rows[0].display_name, "Ann Lee");
    assert_eq!(rows[0].kind, StatusKind::InOffice);
    assert_eq!(rows[0].primary_detail, "09:15");
    assert_eq!(rows[0].secondary_detail, "");
}

#[tokio::test]
async fn known_user_goes_straight_to_the_menu() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Bob", "U2").await;

    let reply = h.engine.handle("U2", Input::Start).await;
    assert_eq!(reply.text, CHOOSE_STATUS);
    assert_eq!(reply.menu, Some(Menu::Status));
    assert_eq!(
        h.sessions.state_of("U2").await,
        Some(DialogueState::ChoosingStatus)
    );
}

#[tokio::test]
async fn first_message_without_start_opens_the_dialogue() {
    let h = Harness::new(today_at(9, 0)).await;
    let reply = h.engine.handle("U9", text("hello")).await;
    assert_eq!(reply.text, ASK_NAME);
    assert!(h.directory.find("U9").await.expect("find").is_none());
}

#[tokio::test]
async fn remote_reason_lands_in_secondary_detail() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Bob", "U2").await;

    h.engine.handle("U2", Input::Start).await;
    let prompt = h.engine.handle("U2", choice(StatusKind::Remote)).await;
    assert_eq!(prompt.menu, None);
    assert_eq!(
        h.sessions.state_of("U2").await,
        Some(DialogueState::AwaitPrimaryDetail(StatusKind::Remote))
    );

    let reply = h.engine.handle("U2", text("waiting for a plumber")).await;
    assert_eq!(reply.text, "Recorded: working remotely.");

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows[0].kind, StatusKind::Remote);
    assert_eq!(rows[0].primary_detail, "");
    assert_eq!(rows[0].secondary_detail, "waiting for a plumber");
}

#[tokio::test]
async fn running_late_collects_time_then_reason() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Bob", "U2").await;

    h.engine.handle("U2", Input::Start).await;
    h.engine.handle("U2", choice(StatusKind::RunningLate)).await;
    let ask_reason = h.engine.handle("U2", text("11:00")).await;
    assert_eq!(ask_reason.text, "What's the reason for the delay?");
    assert_eq!(
        h.sessions.state_of("U2").await,
        Some(DialogueState::AwaitSecondaryDetail {
            kind: StatusKind::RunningLate,
            primary: "11:00".into(),
        })
    );
    assert!(h.status.list_all().await.expect("list").is_empty());

    let reply = h.engine.handle("U2", text("dentist")).await;
    assert_eq!(reply.text, "Recorded: running late, arriving 11:00.");

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].primary_detail, "11:00");
    assert_eq!(rows[0].secondary_detail, "dentist");
}

#[tokio::test]
async fn vacation_interval_is_stored_verbatim() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::Vacation)).await;
    let reply = h.engine.handle("U1", text("07.09–12.09")).await;
    assert_eq!(reply.text, "Recorded: vacation 07.09–12.09.");

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows[0].kind, StatusKind::Vacation);
    assert_eq!(rows[0].primary_detail, "07.09–12.09");
    assert_eq!(rows[0].secondary_detail, "");
}

#[tokio::test]
async fn typed_text_is_stored_without_trimming() {
    let h = Harness::new(today_at(9, 0)).await;
    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", text(" Ann ")).await;
    h.engine.handle("U1", choice(StatusKind::Vacation)).await;
    h.engine.handle("U1", text("  07.09–12.09 ")).await;

    let employee = h.directory.find("U1").await.expect("find").expect("registered");
    assert_eq!(employee.display_name, " Ann ");
    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows[0].display_name, " Ann ");
    assert_eq!(rows[0].primary_detail, "  07.09–12.09 ");
}

#[tokio::test]
async fn unparsable_vacation_text_is_still_recorded() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::Vacation)).await;
    h.engine.handle("U1", text("next two weeks")).await;

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].primary_detail, "next two weeks");
}

#[tokio::test]
async fn day_off_commits_without_details() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    let reply = h.engine.handle("U1", choice(StatusKind::DayOff)).await;
    assert_eq!(reply.text, "Recorded: day off.");

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows[0].kind, StatusKind::DayOff);
    assert!(rows[0].details().next().is_none());
}

#[tokio::test]
async fn typed_label_works_like_a_button() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", text("on a shoot")).await;
    h.engine.handle("U1", text("Acme catalogue")).await;

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows[0].kind, StatusKind::OnShoot);
    assert_eq!(rows[0].secondary_detail, "Acme catalogue");
}

#[tokio::test]
async fn unknown_choice_reprompts_without_writing() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    let reply = h.engine.handle("U1", text("coffee first")).await;
    assert_eq!(reply.text, "Please pick one of the options below.");
    assert_eq!(reply.menu, Some(Menu::Status));
    assert_eq!(
        h.sessions.state_of("U1").await,
        Some(DialogueState::ChoosingStatus)
    );
    assert!(h.status.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn empty_name_is_asked_again() {
    let h = Harness::new(today_at(9, 0)).await;

    h.engine.handle("U1", Input::Start).await;
    let reply = h.engine.handle("U1", text("   ")).await;
    assert_eq!(
        reply.text,
        "Please type your name as it should appear in the roster."
    );
    assert_eq!(
        h.sessions.state_of("U1").await,
        Some(DialogueState::AwaitIdentity)
    );
    assert!(h.directory.list_all().await.expect("list").is_empty());
}

#[tokio::test]
async fn cancel_abandons_the_dialogue() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::Remote)).await;
    let reply = h.engine.handle("U1", Input::Cancel).await;
    assert_eq!(reply.text, "Cancelled.");
    assert!(h.sessions.is_empty().await);
    assert!(h.status.list_all().await.expect("list").is_empty());

    let reply = h.engine.handle("U1", Input::Cancel).await;
    assert_eq!(reply.text, "Nothing to cancel. Send /checkin to start.");
}

#[tokio::test]
async fn start_mid_dialogue_restarts() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::RunningLate)).await;
    let reply = h.engine.handle("U1", Input::Start).await;
    assert_eq!(reply.text, CHOOSE_STATUS);
    assert_eq!(
        h.sessions.state_of("U1").await,
        Some(DialogueState::ChoosingStatus)
    );
}

#[tokio::test]
async fn roster_choice_shows_today_without_writing() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;
    h.register("Bob", "U2").await;
    h.declare(today(), "Bob", "U2", StatusKind::InOffice, "08:45")
        .await;

    h.engine.handle("U1", Input::Start).await;
    let reply = h
        .engine
        .handle("U1", Input::Choice(MenuChoice::Roster))
        .await;
    assert!(reply.text.contains("1. Bob — 🏢 In office (08:45)"), "{}", reply.text);
    assert!(h.sessions.is_empty().await);
    assert_eq!(h.status.list_all().await.expect("list").len(), 1);
}

#[tokio::test]
async fn recorded_status_appears_in_roster() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::DayOff)).await;

    let roster = checkin_bot::roster::today_roster(&h.status, today())
        .await
        .expect("roster");
    assert!(roster.contains("1. Ann — 🛌 Day off"), "{roster}");
}

#[tokio::test]
async fn stale_button_from_known_user_is_taken_as_the_pick() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    let reply = h.engine.handle("U1", choice(StatusKind::DayOff)).await;
    assert_eq!(reply.text, "Recorded: day off.");
    assert_eq!(h.status.list_all().await.expect("list").len(), 1);
}

#[tokio::test]
async fn second_check_in_the_same_day_is_appended() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;

    for kind in [StatusKind::InOffice, StatusKind::DayOff] {
        h.engine.handle("U1", Input::Start).await;
        h.engine.handle("U1", choice(kind)).await;
    }

    assert_eq!(h.status.list_all().await.expect("list").len(), 2);
}

#[tokio::test]
async fn dialogues_of_different_users_do_not_interfere() {
    let h = Harness::new(today_at(9, 0)).await;
    h.register("Ann", "U1").await;
    h.register("Bob", "U2").await;

    h.engine.handle("U1", Input::Start).await;
    h.engine.handle("U2", Input::Start).await;
    h.engine.handle("U1", choice(StatusKind::Remote)).await;
    h.engine.handle("U2", choice(StatusKind::DayOff)).await;
    h.engine.handle("U1", text("home office")).await;

    let rows = h.status.list_all().await.expect("list");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].identity, "U2");
    assert_eq!(rows[1].identity, "U1");
    assert_eq!(rows[1].secondary_detail, "home office");
}
