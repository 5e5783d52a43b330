use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

pub type CardId = Uuid;
pub type CategoryId = Uuid;

pub const EF_MIN: f64 = 1.3;
pub const EF_DEFAULT: f64 = 2.5;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    #[default]
    New,
    Learning,
    Reviewing,
    Mastered,
}

/// Answer quality on the SM-2 0..=5 scale. Only four points of the scale are offered.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    pub fn score(&self) -> i32 {
        match self {
            Quality::Again => 0,
            Quality::Hard => 3,
            Quality::Good => 4,
            Quality::Easy => 5,
        }
    }

    pub fn is_correct(&self) -> bool {
        self.score() >= 3
    }
}

impl TryFrom<i64> for Quality {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Quality::Again),
            3 => Ok(Quality::Hard),
            4 => Ok(Quality::Good),
            5 => Ok(Quality::Easy),
            other => Err(CoreError::InvalidQuality(other)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub term: String,
    pub definition: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub is_learned: bool,

    #[serde(default)]
    pub learning_state: LearningState,
    #[serde(default)]
    pub repetition_count: u32,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review_date: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    EF_DEFAULT
}

impl Card {
    pub fn new(category_id: CategoryId, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            term: term.into(),
            definition: definition.into(),
            category_id,
            is_learned: false,
            learning_state: LearningState::New,
            repetition_count: 0,
            ease_factor: EF_DEFAULT,
            last_reviewed: None,
            next_review_date: None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.learning_state == LearningState::New
    }

    /// New cards are always presentable; everything else waits for its review date.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_date {
            Some(next) => next <= now,
            None => true,
        }
    }

    /// Character count of term plus definition, used to put simple cards first.
    pub fn text_len(&self) -> usize {
        self.term.chars().count() + self.definition.chars().count()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningSettings {
    pub use_personalized_learning: bool,
    pub spaced_repetition_enabled: bool,
    pub daily_new_cards_limit: u32,
    pub daily_review_cards_limit: u32,
    pub show_start_learning_reminder: bool,
    pub reminder_time: Option<NaiveTime>,
}

impl Default for LearningSettings {
    fn default() -> Self {
        Self {
            use_personalized_learning: true,
            spaced_repetition_enabled: true,
            daily_new_cards_limit: 10,
            daily_review_cards_limit: 20,
            show_start_learning_reminder: false,
            reminder_time: NaiveTime::from_hms_opt(9, 0, 0),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodayLearningStats {
    pub reviewed_cards: u32,
    pub correct_answers: u32,
    pub remaining_new: u32,
    pub remaining_reviews: u32,
}

impl TodayLearningStats {
    pub fn total_remaining(&self) -> u32 {
        self.remaining_new + self.remaining_reviews
    }

    pub fn percent_correct(&self) -> f64 {
        if self.reviewed_cards == 0 {
            0.0
        } else {
            100.0 * self.correct_answers as f64 / self.reviewed_cards as f64
        }
    }
}
