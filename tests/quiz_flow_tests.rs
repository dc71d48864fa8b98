//! End-to-end quiz flows over a file-backed SQLite store
//!
//! Covers the behaviours the UI layer relies on:
//! - sequential answers update XP/stage and are persisted immediately
//! - mistakes are recorded once and corrected through review
//! - replay is read-only
//! - user name changes reset progress only after confirmation
//! - progress survives reopening the store

use std::path::Path;

use kuis_kosakata::session::Pacing;
use kuis_kosakata::storage::{keys, KeyValueStore, NameChange, SqliteStore};
use kuis_kosakata::{ProgressState, QuizApp, QuizError, Screen, SessionMode, VocabularyStore};
use tempfile::TempDir;

const VOCAB: &str = r#"[
    {"id": 1, "w": "Abandon", "o": ["Meninggalkan", "Menemukan"], "c": "Meninggalkan"},
    {"id": 2, "w": "Brave", "o": ["Takut", "Berani"], "c": "Berani"},
    {"id": 3, "w": "Careful", "o": ["Ceroboh", "Hati-hati"], "c": "Hati-hati"},
    {"id": 5, "w": "Eager", "o": ["Enggan", "Bersemangat"], "c": "Bersemangat"},
    {"id": 4, "w": "Delight", "o": ["Kegembiraan", "Kemarahan"], "c": "Kegembiraan"}
]"#;

fn open_app(path: &Path) -> QuizApp<SqliteStore> {
    let vocabulary = VocabularyStore::from_json(VOCAB).expect("vocabulary should parse");
    let store = SqliteStore::new(path).expect("store should open");
    QuizApp::new(vocabulary, store, Pacing::default())
}

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("progress.db");
    (dir, path)
}

#[test]
fn correct_answer_updates_and_persists() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);

    let outcome = app.submit_answer("Meninggalkan").unwrap();
    assert!(outcome.correct);
    assert_eq!(app.progress().total_xp(), 10);
    assert_eq!(app.progress().stage(), 2);

    let store = app.gateway().store();
    assert_eq!(store.get_item(keys::STAGE).unwrap().as_deref(), Some("2"));
    assert_eq!(store.get_item(keys::TOTAL_XP).unwrap().as_deref(), Some("10"));
    assert_eq!(app.gateway().load(), *app.progress());
}

#[test]
fn wrong_answers_record_mistake_at_most_once() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);

    for _ in 0..3 {
        let outcome = app.submit_answer("Menemukan").unwrap();
        assert!(!outcome.correct);
    }

    assert_eq!(app.progress().stage(), 1);
    assert_eq!(app.progress().total_xp(), 0);
    assert_eq!(app.mistakes().len(), 1);
    assert_eq!(app.gateway().load().mistakes().len(), 1);
}

#[test]
fn review_moves_exactly_the_head() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);

    app.submit_answer("Menemukan").unwrap();
    app.skip_current().unwrap();
    app.submit_answer("Takut").unwrap();
    assert_eq!(app.mistakes().len(), 2);

    app.start_review();
    assert_eq!(app.mode(), SessionMode::Review);

    let outcome = app.submit_answer("Berani").unwrap();
    // "Berani" answers the second entry, not the head: nothing changes
    assert!(!outcome.correct);
    assert_eq!(app.mistakes().len(), 2);
    assert!(app.history().is_empty());

    app.submit_answer("Meninggalkan").unwrap();
    assert_eq!(app.mistakes().len(), 1);
    assert_eq!(app.mistakes()[0].id, 2);
    assert_eq!(app.history().len(), 1);
    assert_eq!(app.history()[0].prompt, "Abandon");
    assert_eq!(app.history()[0].correct_answer, "Meninggalkan");
    assert_eq!(app.gateway().load(), *app.progress());
}

#[test]
fn review_on_empty_bank_exits_after_delay() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);

    let screen = app.start_review();
    assert!(matches!(screen, Screen::ReviewCleared { .. }));

    let screen = app.advance_display();
    assert_eq!(app.mode(), SessionMode::Sequential);
    assert_eq!(screen.question().unwrap().prompt, "Abandon");
}

#[test]
fn replay_is_read_only_and_store_ordered() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);
    app.submit_answer("Menemukan").unwrap();
    let before = app.progress().clone();

    assert!(matches!(app.start_replay(5, 3), Err(QuizError::InvalidRange(_))));
    assert!(matches!(app.start_replay(6, 9), Err(QuizError::EmptyRange { from: 6, to: 9 })));

    let mut prompts = Vec::new();
    let mut screen = app.start_replay(3, 5).unwrap();
    loop {
        let Some(view) = screen.question().cloned() else {
            break;
        };
        prompts.push(view.prompt.clone());
        let answer = app
            .vocabulary()
            .find_by_id(view.id)
            .map(|q| q.correct_answer.clone())
            .unwrap();
        app.submit_answer("salah").unwrap();
        app.submit_answer(&answer).unwrap();
        screen = app.advance_display();
    }

    assert_eq!(screen, Screen::ReplayComplete);
    assert_eq!(prompts, vec!["Careful", "Eager", "Delight"]);
    assert_eq!(*app.progress(), before);
    assert_eq!(app.gateway().load(), before);
}

#[test]
fn username_change_requires_confirmation() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);
    app.submit_answer("Meninggalkan").unwrap();
    app.advance_display();
    app.submit_answer("Takut").unwrap();
    let before = app.progress().clone();

    assert_eq!(app.change_username("Ayu", || false).unwrap(), NameChange::Declined);
    assert_eq!(*app.progress(), before);
    assert_eq!(app.gateway().load(), before);
    assert_eq!(app.summary().user_name, None);

    assert_eq!(app.change_username("Ayu", || true).unwrap(), NameChange::Reset);
    assert_eq!(*app.progress(), ProgressState::default());
    assert_eq!(app.gateway().load(), ProgressState::default());
    assert_eq!(app.summary().user_name.as_deref(), Some("Ayu"));
}

#[test]
fn delete_history_entry_is_by_id() {
    let (_dir, path) = temp_db();
    let mut app = open_app(&path);

    app.skip_current().unwrap();
    app.start_review();
    app.submit_answer("Meninggalkan").unwrap();
    let first_id = app.history()[0].id;

    // rewind the stored stage so the same word can be missed and corrected again
    app.gateway().store().set_item(keys::STAGE, "1").unwrap();
    drop(app);

    let mut app = open_app(&path);
    app.skip_current().unwrap();
    app.start_review();
    app.submit_answer("Meninggalkan").unwrap();

    assert_eq!(app.history().len(), 2);
    assert_eq!(app.history()[0].prompt, app.history()[1].prompt);
    assert_eq!(app.history()[0].correct_answer, app.history()[1].correct_answer);
    let second_id = app.history()[0].id;
    assert_ne!(first_id, second_id);

    assert!(app.delete_history_entry(first_id).unwrap());
    assert_eq!(app.history().len(), 1);
    assert_eq!(app.history()[0].id, second_id);
    assert!(!app.delete_history_entry(first_id).unwrap());
    assert_eq!(app.gateway().load().history().len(), 1);
}

#[test]
fn progress_survives_reopen() {
    let (_dir, path) = temp_db();
    let saved = {
        let mut app = open_app(&path);
        app.submit_answer("Meninggalkan").unwrap();
        app.advance_display();
        app.skip_current().unwrap();
        app.progress().clone()
    };

    let app = open_app(&path);
    assert_eq!(*app.progress(), saved);
    let summary = app.summary();
    assert_eq!(summary.stage, 3);
    assert_eq!(summary.total_xp, 10);
    assert_eq!(summary.mistake_count, 1);
    assert_eq!(app.current_display().question().unwrap().prompt, "Careful");
}

#[test]
fn corrupt_store_loads_defaults() {
    let (_dir, path) = temp_db();
    {
        let store = SqliteStore::new(&path).unwrap();
        store.set_item(keys::STAGE, "NaN").unwrap();
        store.set_item(keys::TOTAL_XP, "-5").unwrap();
        store.set_item(keys::MISTAKE_BANK, "[{\"id\":").unwrap();
        store.set_item(keys::HISTORY_BANK, "42").unwrap();
    }

    let app = open_app(&path);
    assert_eq!(*app.progress(), ProgressState::default());
}

#[tokio::test]
async fn vocabulary_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vocab_a.json");
    tokio::fs::write(&path, VOCAB).await.unwrap();

    let vocabulary = VocabularyStore::load(&path).await.unwrap();
    assert_eq!(vocabulary.len(), 5);
    assert_eq!(vocabulary.find_by_id(5).unwrap().prompt, "Eager");

    tokio::fs::write(&path, "[{\"id\": 1}]").await.unwrap();
    assert!(matches!(
        VocabularyStore::load(&path).await,
        Err(QuizError::DataUnavailable(_))
    ));
}
