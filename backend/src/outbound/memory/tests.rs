//! Behaviour of the in-memory repositories.

use super::*;
use crate::domain::{CredentialStore, Email, Password, Role};
use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

fn new_user(name: &str, email: &str, role: Role) -> NewUser {
    let mut user = NewUser::new(
        Username::new(name).expect("username"),
        Email::new(email).expect("email"),
        role,
    );
    CredentialStore::low_cost()
        .set_password(&mut user, &Password::new("pw"))
        .expect("hash");
    user
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

#[rstest]
#[tokio::test]
async fn users_get_sequential_ids_and_unique_names(store: InMemoryStore) {
    let alice = UserRepository::insert(&store, &new_user("alice", "a@x.com", Role::Caregiver))
        .await
        .expect("alice");
    let bob = UserRepository::insert(&store, &new_user("bob", "b@x.com", Role::Admin))
        .await
        .expect("bob");
    assert_eq!(alice.id(), UserId::new(1));
    assert_eq!(bob.id(), UserId::new(2));

    let clash = UserRepository::insert(&store, &new_user("alice", "c@x.com", Role::Caregiver))
        .await
        .expect_err("duplicate username");
    assert!(matches!(clash, UserPersistenceError::DuplicateUsername { .. }));

    let clash = UserRepository::insert(&store, &new_user("carol", "a@x.com", Role::Caregiver))
        .await
        .expect_err("duplicate email");
    assert!(matches!(clash, UserPersistenceError::DuplicateEmail { .. }));

    assert_eq!(store.count_admins().await.expect("count"), 1);
    assert!(store.email_exists("b@x.com").await.expect("lookup"));
    assert_eq!(UserRepository::list(&store).await.expect("list").len(), 2);
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_reports_presence(store: InMemoryStore) {
    let alice = UserRepository::insert(&store, &new_user("alice", "a@x.com", Role::Caregiver))
        .await
        .expect("alice");
    assert!(UserRepository::delete(&store, alice.id()).await.expect("delete"));
    assert!(!UserRepository::delete(&store, alice.id()).await.expect("delete"));
    assert!(
        UserRepository::find_by_id(&store, alice.id())
            .await
            .expect("lookup")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn primary_patient_is_created_once(store: InMemoryStore) {
    let first = store
        .ensure_primary(&Patient::primary_default())
        .await
        .expect("patient");
    let second = store
        .ensure_primary(&Patient::new(PatientId::PRIMARY, "Someone Else", 90))
        .await
        .expect("patient");
    assert_eq!(first, second);
    assert_eq!(second.name(), "Default Patient");
}

#[rstest]
#[tokio::test]
async fn notes_list_newest_first_with_id_tiebreak(store: InMemoryStore) {
    for (content, minute) in [("first", 0), ("second", 5), ("third", 5)] {
        NoteRepository::insert(
            &store,
            &NewNote {
                patient_id: PatientId::PRIMARY,
                content: content.to_owned(),
                timestamp: at(minute),
            },
        )
        .await
        .expect("note");
    }

    let notes = NoteRepository::list_for_patient(&store, PatientId::PRIMARY)
        .await
        .expect("notes");
    let contents: Vec<&str> = notes.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, ["third", "second", "first"]);
}

#[rstest]
#[tokio::test]
async fn care_events_keep_insertion_order(store: InMemoryStore) {
    for title in ["Physio", "Bath"] {
        CareEventRepository::insert(
            &store,
            &NewCareEvent {
                patient_id: PatientId::PRIMARY,
                title: title.to_owned(),
                description: String::new(),
                start_time: at(10),
                end_time: at(20),
            },
        )
        .await
        .expect("event");
    }

    let events = CareEventRepository::list_for_patient(&store, PatientId::PRIMARY)
        .await
        .expect("events");
    let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Physio", "Bath"]);
}

#[rstest]
#[tokio::test]
async fn image_rows_round_trip_and_delete(store: InMemoryStore) {
    let image = ImageRepository::insert(
        &store,
        &NewImage {
            patient_id: PatientId::PRIMARY,
            filename: crate::domain::ImageFilename::from_stored("cat.png"),
            timestamp: at(1),
        },
    )
    .await
    .expect("image");

    let found = ImageRepository::find_by_id(&store, image.id)
        .await
        .expect("lookup");
    assert_eq!(found.as_ref(), Some(&image));
    assert!(ImageRepository::delete(&store, image.id).await.expect("delete"));
    assert!(
        ImageRepository::list_for_patient(&store, PatientId::PRIMARY)
            .await
            .expect("list")
            .is_empty()
    );
}
