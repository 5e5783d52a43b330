use crate::filters::{filter_by_state, filter_due_reviews};
use crate::{Card, LearningSettings, LearningState, TodayLearningStats};
use chrono::{DateTime, Utc};

/// What today's study consists of.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodayPlan {
    pub due_reviews: Vec<Card>,
    pub new_cards: Vec<Card>,
}

/// New cards still allowed today.
///
/// `reviewed_cards` takes away everything already answered today, and
/// `remaining_new` adds back the cards an earlier run handed out that are
/// still pending.
pub fn new_card_quota(settings: &LearningSettings, stats: &TodayLearningStats) -> usize {
    let quota = settings.daily_new_cards_limit as i64 - stats.reviewed_cards as i64 + stats.remaining_new as i64;
    quota.max(0) as usize
}

/// Due Learning/Reviewing cards, earliest first, capped at the daily review limit.
pub fn select_due_reviews(cards: &[Card], limit: u32, now: DateTime<Utc>) -> Vec<Card> {
    let mut due = filter_due_reviews(cards, now);
    due.sort_by_key(|c| c.next_review_date);
    due.truncate(limit as usize);
    due
}

/// New cards, shortest term+definition first. The sort is stable so ties keep
/// collection order.
pub fn select_new_cards(cards: &[Card], quota: usize) -> Vec<Card> {
    let mut fresh = filter_by_state(cards, LearningState::New);
    fresh.sort_by_key(|c| c.text_len());
    fresh.truncate(quota);
    fresh
}

pub fn compute_today(
    cards: &[Card],
    settings: &LearningSettings,
    stats: &TodayLearningStats,
    now: DateTime<Utc>,
) -> TodayPlan {
    let due_reviews = select_due_reviews(cards, settings.daily_review_cards_limit, now);
    let quota = new_card_quota(settings, stats);
    let new_cards = select_new_cards(cards, quota);

    log::debug!(
        "scheduled {} due, {} new (quota {}) from {} cards",
        due_reviews.len(),
        new_cards.len(),
        quota,
        cards.len()
    );

    TodayPlan { due_reviews, new_cards }
}
