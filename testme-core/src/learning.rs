//! Per-card learning state machine.
//!
//! New → Learning on the first answer, then an SM-2 ladder: three correct answers
//! in a row make a card Reviewing, five make it Mastered. An Again answer sends
//! the card back to Learning and restarts the ladder but keeps its ease factor.

use chrono::{DateTime, Utc};

use crate::{Card, LearningState, Quality, StudyCalendar, EF_MIN};

pub const REVIEWING_AFTER: u32 = 3;
pub const MASTERED_AFTER: u32 = 5;
pub const MASTERED_RECHECK_MONTHS: u32 = 6;

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3.
pub fn next_ease_factor(ef: f64, quality: Quality) -> f64 {
    let d = (5 - quality.score()) as f64;
    (ef + (0.1 - d * (0.08 + d * 0.02))).max(EF_MIN)
}

/// Interval in days for the `reps`-th consecutive correct answer.
///
/// From the third repetition on, the previous interval is recovered from the
/// card's old `last_reviewed`/`next_review_date` pair and scaled by the new EF.
pub fn sm2_interval_days(
    reps: u32,
    old_last: Option<DateTime<Utc>>,
    old_next: Option<DateTime<Utc>>,
    ef: f64,
) -> i64 {
    let days = match reps {
        0 | 1 => 1,
        2 => 6,
        _ => match (old_last, old_next) {
            (Some(last), Some(next)) => {
                let previous = (next - last).num_seconds() as f64 / 86_400.0;
                (previous * ef).round() as i64
            }
            _ => ef.round() as i64,
        },
    };
    days.max(1)
}

pub fn apply_answer(mut card: Card, quality: Quality, now: DateTime<Utc>, calendar: &StudyCalendar) -> Card {
    if card.is_new() {
        // lastReviewed stays unset so the ladder starts without an anchor.
        card.learning_state = LearningState::Learning;
        card.next_review_date = Some(calendar.days_from_today(now, 1));
        return card;
    }

    let old_last = card.last_reviewed;
    let old_next = card.next_review_date;

    card.ease_factor = next_ease_factor(card.ease_factor, quality);
    card.last_reviewed = Some(now);

    if !quality.is_correct() {
        card.repetition_count = 0;
        card.learning_state = LearningState::Learning;
        card.is_learned = false;
        card.next_review_date = Some(calendar.days_from_today(now, 1));
        return card;
    }

    card.repetition_count += 1;
    let interval = sm2_interval_days(card.repetition_count, old_last, old_next, card.ease_factor);
    card.next_review_date = Some(calendar.days_from_today(now, interval));

    if card.repetition_count >= MASTERED_AFTER {
        card.learning_state = LearningState::Mastered;
        card.is_learned = true;
        card.next_review_date = Some(calendar.months_after(now, MASTERED_RECHECK_MONTHS));
    } else if card.repetition_count >= REVIEWING_AFTER {
        card.learning_state = LearningState::Reviewing;
    }

    log::debug!(
        "card {} -> {:?} reps={} ef={:.2} interval={}d",
        card.id,
        card.learning_state,
        card.repetition_count,
        card.ease_factor,
        interval
    );
    card
}

/// Manual "learned" toggle.
///
/// Unmarking a Mastered card regresses it to Reviewing one repetition lower
/// (never below 2) and brings it back tomorrow.
pub fn set_learned(mut card: Card, learned: bool, now: DateTime<Utc>, calendar: &StudyCalendar) -> Card {
    if learned {
        card.learning_state = LearningState::Mastered;
        card.is_learned = true;
        card.next_review_date = Some(calendar.months_after(now, MASTERED_RECHECK_MONTHS));
    } else if card.learning_state == LearningState::Mastered {
        card.learning_state = LearningState::Reviewing;
        card.is_learned = false;
        card.repetition_count = card.repetition_count.saturating_sub(1).max(2);
        card.next_review_date = Some(now + chrono::Duration::days(1));
    } else {
        card.is_learned = false;
    }
    card
}
