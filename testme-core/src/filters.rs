use crate::{Card, CategoryId, LearningState};
use chrono::{DateTime, Utc};

pub fn filter_by_text(cards: &[Card], query: &str) -> Vec<Card> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return cards.to_vec();
    }
    cards
        .iter()
        .filter(|c| c.term.to_lowercase().contains(&q) || c.definition.to_lowercase().contains(&q))
        .cloned()
        .collect()
}

pub fn filter_by_category(cards: &[Card], category: CategoryId) -> Vec<Card> {
    cards.iter().filter(|c| c.category_id == category).cloned().collect()
}

pub fn filter_by_state(cards: &[Card], want: LearningState) -> Vec<Card> {
    cards.iter().filter(|c| c.learning_state == want).cloned().collect()
}

/// Learning and Reviewing cards whose review date has passed. Mastered cards
/// wait for their long-horizon check and are never part of the daily review set.
pub fn filter_due_reviews(cards: &[Card], now: DateTime<Utc>) -> Vec<Card> {
    cards
        .iter()
        .filter(|c| matches!(c.learning_state, LearningState::Learning | LearningState::Reviewing))
        .filter(|c| c.next_review_date.map(|next| next <= now).unwrap_or(false))
        .cloned()
        .collect()
}
