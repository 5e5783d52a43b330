use chrono::{TimeZone, Utc};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use testme_core::{
    Card, CardRepository, CoreError, LearningSession, LearningSettings, LearningState, Quality, StorageProvider,
    StudyCalendar, TodayLearningStats,
};
use testme_json::JsonStore;
use uuid::Uuid;

fn open(dir: &std::path::Path) -> JsonStore {
    JsonStore::open_with(dir.join("store.json"), dir.join("backups"), 3).unwrap()
}

#[test]
fn fresh_store_reports_absent_keys() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    assert!(dir.path().join("store.json").exists());
    assert!(store.get_cards().unwrap().is_empty());
    assert_eq!(store.get_settings().unwrap(), None);
    assert_eq!(store.get_daily_stats().unwrap(), None);
    assert_eq!(store.get_last_session_date().unwrap(), None);
}

#[test]
fn values_survive_reopen() {
    let dir = tempdir().unwrap();
    let card = Card::new(Uuid::nil(), "hola", "hello");
    let settings = LearningSettings {
        daily_new_cards_limit: 3,
        ..LearningSettings::default()
    };
    let stats = TodayLearningStats {
        reviewed_cards: 2,
        correct_answers: 1,
        remaining_new: 4,
        remaining_reviews: 0,
    };
    let at = Utc.with_ymd_and_hms(2024, 7, 1, 9, 15, 0).unwrap();
    {
        let store = open(dir.path());
        store.insert(&card).unwrap();
        store.save_settings(&settings).unwrap();
        store.save_daily_stats(&stats).unwrap();
        store.save_last_session_date(at).unwrap();
    }

    let store = open(dir.path());
    assert_eq!(store.all_cards().unwrap(), vec![card]);
    assert_eq!(store.get_settings().unwrap(), Some(settings));
    assert_eq!(store.get_daily_stats().unwrap(), Some(stats));
    assert_eq!(store.get_last_session_date().unwrap(), Some(at));
}

#[test]
fn card_crud() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    let mut card = Card::new(Uuid::nil(), "a", "b");
    store.insert(&card).unwrap();
    assert_eq!(store.insert(&card), Err(CoreError::Conflict("card id already exists")));

    card.term = "changed".into();
    store.update(&card).unwrap();
    assert_eq!(store.all_cards().unwrap()[0].term, "changed");

    let stranger = Card::new(Uuid::nil(), "x", "y");
    assert_eq!(store.update(&stranger), Err(CoreError::NotFound("card")));
    store.remove(card.id).unwrap();
    assert_eq!(store.remove(card.id), Err(CoreError::NotFound("card")));
}

#[test]
fn corrupt_value_is_reported_per_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let image = r#"{
        "version": 1,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z",
        "entries": {
            "learningSettings": {"dailyNewCardsLimit": "lots"},
            "dailyLearningStats": {"reviewedCards": 1, "correctAnswers": 1, "remainingNew": 0, "remainingReviews": 0}
        }
    }"#;
    fs::write(&path, image).unwrap();

    let store = open(dir.path());
    assert_eq!(store.get_settings(), Err(CoreError::CorruptPersistedState("learningSettings")));
    assert_eq!(store.get_daily_stats().unwrap().unwrap().reviewed_cards, 1);

    // The session carries on with default settings.
    let store = Arc::new(store);
    let mut session = LearningSession::start(store.clone(), store.clone(), StudyCalendar::utc(), Utc::now());
    assert_eq!(session.settings(), &LearningSettings::default());
    assert!(session
        .take_warnings()
        .contains(&CoreError::CorruptPersistedState("learningSettings")));
}

#[test]
fn unreadable_file_is_moved_aside() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{ not json").unwrap();

    let store = open(dir.path());
    assert!(store.get_cards().unwrap().is_empty());
    let quarantined = fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().and_then(|s| s.to_str()) == Some("corrupt"));
    assert!(quarantined);
}

#[test]
fn backups_are_rotated() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    for i in 0..6 {
        store.insert(&Card::new(Uuid::nil(), format!("t{i}"), "d")).unwrap();
    }
    let backups = fs::read_dir(dir.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
        .count();
    assert!(backups <= 3);
}

#[test]
fn study_session_persists_answers() {
    let dir = tempdir().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
    {
        let store = open(dir.path());
        store.insert(&Card::new(Uuid::nil(), "uno", "one")).unwrap();
        let store = Arc::new(store);
        let mut session = LearningSession::start(store.clone(), store.clone(), StudyCalendar::utc(), now);
        session.answer(Quality::Good, now).unwrap();
        assert!(session.take_warnings().is_empty());
    }

    let store = open(dir.path());
    let cards = store.all_cards().unwrap();
    assert_eq!(cards[0].learning_state, LearningState::Learning);
    assert_eq!(store.get_daily_stats().unwrap().unwrap().reviewed_cards, 1);
    assert_eq!(store.get_last_session_date().unwrap(), Some(now));
}
