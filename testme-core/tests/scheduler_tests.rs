use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use testme_core::{
    compute_today, new_card_quota, Card, LearningSettings, LearningState, SessionQueue, TodayLearningStats,
};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 20, 12, 0, 0).unwrap()
}

fn due_card(term: &str, state: LearningState, next: DateTime<Utc>) -> Card {
    let mut c = Card::new(Uuid::nil(), term, "def");
    c.learning_state = state;
    c.repetition_count = 1;
    c.next_review_date = Some(next);
    c
}

#[test]
fn three_new_cards_ordered_by_text_length() {
    let cards = vec![
        Card::new(Uuid::nil(), "photosynthesis", "light to sugar"),
        Card::new(Uuid::nil(), "a", "b"),
        Card::new(Uuid::nil(), "gato", "cat"),
    ];
    let settings = LearningSettings::default();
    let stats = TodayLearningStats::default();
    assert_eq!(new_card_quota(&settings, &stats), 10);

    let plan = compute_today(&cards, &settings, &stats, now());
    assert!(plan.due_reviews.is_empty());
    let q = SessionQueue::build(&plan.due_reviews, &plan.new_cards);
    let terms: Vec<&str> = q.cards().iter().map(|c| c.term.as_str()).collect();
    assert_eq!(terms, ["a", "gato", "photosynthesis"]);
}

#[test]
fn equal_length_new_cards_keep_collection_order() {
    let cards = vec![
        Card::new(Uuid::nil(), "perro", "dog"),
        Card::new(Uuid::nil(), "sol", "sun"),
        Card::new(Uuid::nil(), "luna", "moon"),
        Card::new(Uuid::nil(), "mar", "sea"),
    ];
    let plan = compute_today(&cards, &LearningSettings::default(), &TodayLearningStats::default(), now());
    let terms: Vec<&str> = plan.new_cards.iter().map(|c| c.term.as_str()).collect();
    assert_eq!(terms, ["sol", "mar", "perro", "luna"]);
}

#[test]
fn due_reviews_sorted_filtered_and_capped() {
    let mut cards = Vec::new();
    for i in 0..30 {
        cards.push(due_card(&format!("r{i}"), LearningState::Reviewing, now() - Duration::hours(30 - i)));
    }
    cards.push(due_card("future", LearningState::Learning, now() + Duration::hours(1)));
    cards.push(due_card("mastered", LearningState::Mastered, now() - Duration::days(3)));
    cards.push(due_card("oldest", LearningState::Learning, now() - Duration::days(10)));

    let settings = LearningSettings::default();
    let plan = compute_today(&cards, &settings, &TodayLearningStats::default(), now());

    assert_eq!(plan.due_reviews.len(), settings.daily_review_cards_limit as usize);
    assert_eq!(plan.due_reviews[0].term, "oldest");
    assert!(plan
        .due_reviews
        .windows(2)
        .all(|w| w[0].next_review_date <= w[1].next_review_date));
    assert!(plan.due_reviews.iter().all(|c| c.term != "future" && c.term != "mastered"));
}

#[test]
fn new_cards_respect_quota() {
    let cards: Vec<Card> = (0..15).map(|i| Card::new(Uuid::nil(), format!("n{i:02}"), "x")).collect();
    let settings = LearningSettings {
        daily_new_cards_limit: 5,
        ..LearningSettings::default()
    };
    let stats = TodayLearningStats {
        reviewed_cards: 3,
        remaining_new: 1,
        ..TodayLearningStats::default()
    };
    let plan = compute_today(&cards, &settings, &stats, now());
    assert_eq!(plan.new_cards.len(), 3);

    let exhausted = TodayLearningStats {
        reviewed_cards: 9,
        ..TodayLearningStats::default()
    };
    assert!(compute_today(&cards, &settings, &exhausted, now()).new_cards.is_empty());
}

#[test]
fn queue_holds_every_card_once() {
    let reviews: Vec<Card> = (0..7)
        .map(|i| due_card(&format!("r{i}"), LearningState::Reviewing, now() - Duration::days(1)))
        .collect();
    let fresh: Vec<Card> = (0..4).map(|i| Card::new(Uuid::nil(), format!("n{i}"), "x")).collect();
    let q = SessionQueue::build(&reviews, &fresh);

    assert_eq!(q.len(), reviews.len() + fresh.len());
    let ids: HashSet<Uuid> = q.cards().iter().map(|c| c.id).collect();
    assert_eq!(ids.len(), q.len());
}

#[test]
fn reviews_only_queue_keeps_order() {
    let reviews: Vec<Card> = (0..5)
        .map(|i| due_card(&format!("r{i}"), LearningState::Learning, now() - Duration::days(5 - i)))
        .collect();
    let q = SessionQueue::build(&reviews, &[]);
    let got: Vec<Uuid> = q.cards().iter().map(|c| c.id).collect();
    let want: Vec<Uuid> = reviews.iter().map(|c| c.id).collect();
    assert_eq!(got, want);
}

#[test]
fn cursor_traversal_and_skip() {
    let fresh = vec![Card::new(Uuid::nil(), "a", "x")];
    let reviews = vec![
        due_card("later", LearningState::Learning, now() + Duration::hours(2)),
        due_card("now", LearningState::Learning, now() - Duration::minutes(1)),
    ];
    let mut q = SessionQueue::build(&reviews, &fresh);
    assert!(!q.is_finished());

    assert_eq!(q.skip_not_due(now()), 1);
    assert_eq!(q.peek_next().unwrap().term, "now");
    q.advance();
    assert_eq!(q.peek_next().unwrap().term, "a");
    q.advance();
    assert!(q.is_finished());
    assert!(q.peek_next().is_none());
    assert_eq!(q.skip_not_due(now()), 0);
}

#[test]
fn skipping_stops_when_nothing_is_due() {
    let reviews = vec![
        due_card("x", LearningState::Learning, now() + Duration::hours(1)),
        due_card("y", LearningState::Reviewing, now() + Duration::hours(2)),
    ];
    let mut q = SessionQueue::build(&reviews, &[]);
    assert!(!q.has_available(now()));
    assert_eq!(q.skip_not_due(now()), 2);
    assert!(q.is_finished());
}
