//! Ordered study queue for one session.
//!
//! Reviews and new cards are interleaved in batches: up to three reviews, then
//! `max(1, new / reviews)` new cards, until both pools run dry. The queue owns
//! snapshots of the cards; answering writes through the repository, not here.

use crate::Card;
use chrono::{DateTime, Utc};

pub const REVIEWS_PER_BATCH: usize = 3;

#[derive(Clone, Debug, Default)]
pub struct SessionQueue {
    cards: Vec<Card>,
    cursor: usize,
}

pub fn interleave(due_reviews: &[Card], new_cards: &[Card]) -> Vec<Card> {
    if new_cards.is_empty() {
        return due_reviews.to_vec();
    }
    if due_reviews.is_empty() {
        return new_cards.to_vec();
    }

    let new_per_batch = (new_cards.len() / due_reviews.len()).max(1);
    let mut reviews = due_reviews.chunks(REVIEWS_PER_BATCH);
    let mut fresh = new_cards.chunks(new_per_batch);
    let mut mixed = Vec::with_capacity(due_reviews.len() + new_cards.len());
    loop {
        let r = reviews.next();
        let n = fresh.next();
        if r.is_none() && n.is_none() {
            break;
        }
        mixed.extend_from_slice(r.unwrap_or_default());
        mixed.extend_from_slice(n.unwrap_or_default());
    }
    mixed
}

impl SessionQueue {
    pub fn build(due_reviews: &[Card], new_cards: &[Card]) -> Self {
        Self {
            cards: interleave(due_reviews, new_cards),
            cursor: 0,
        }
    }

    pub fn peek_next(&self) -> Option<&Card> {
        self.cards.get(self.cursor)
    }

    pub fn advance(&mut self) {
        if self.cursor < self.cards.len() {
            self.cursor += 1;
        }
    }

    /// Moves past the current card without an answer.
    pub fn skip(&mut self) {
        self.advance();
    }

    /// Skips queued cards whose review date is still ahead of `now`. Stops at
    /// the first presentable card or when the queue is exhausted.
    pub fn skip_not_due(&mut self, now: DateTime<Utc>) -> usize {
        let mut skipped = 0;
        while let Some(card) = self.peek_next() {
            if card.is_due(now) {
                break;
            }
            self.skip();
            skipped += 1;
        }
        skipped
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.cards.len()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// True if any queued card, answered or not, can be shown at `now`.
    pub fn has_available(&self, now: DateTime<Utc>) -> bool {
        self.cards.iter().any(|c| c.is_due(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn deck(prefix: &str, n: usize) -> Vec<Card> {
        (0..n).map(|i| Card::new(Uuid::nil(), format!("{prefix}{i}"), "x")).collect()
    }

    fn terms(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.term.as_str()).collect()
    }

    #[test]
    fn batches_three_reviews_then_new() {
        let reviews = deck("r", 4);
        let fresh = deck("n", 3);
        // 3 / 4 rounds down to 0, so one new card per batch.
        let q = interleave(&reviews, &fresh);
        assert_eq!(terms(&q), ["r0", "r1", "r2", "n0", "r3", "n1", "n2"]);
    }

    #[test]
    fn scales_new_batch_with_ratio() {
        let reviews = deck("r", 2);
        let fresh = deck("n", 5);
        let q = interleave(&reviews, &fresh);
        assert_eq!(terms(&q), ["r0", "r1", "n0", "n1", "n2", "n3", "n4"]);
    }

    #[test]
    fn empty_queue_is_finished() {
        let mut q = SessionQueue::build(&[], &[]);
        assert!(q.is_finished());
        assert!(q.peek_next().is_none());
        q.advance();
        assert_eq!(q.position(), 0);
    }
}
