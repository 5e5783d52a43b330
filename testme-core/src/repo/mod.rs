use crate::{Card, CardId, CoreError, LearningSettings, TodayLearningStats};
use chrono::{DateTime, Utc};

pub mod memory;

/// Keys of the persisted key-value image.
pub mod keys {
    pub const FLASHCARDS: &str = "flashcards";
    pub const LEARNING_SETTINGS: &str = "learningSettings";
    pub const DAILY_LEARNING_STATS: &str = "dailyLearningStats";
    pub const LAST_SESSION_DATE: &str = "lastLearningSessionDate";
}

/// Synchronous key-value persistence. `Ok(None)` means the key was never written.
pub trait StorageProvider: Send + Sync {
    fn get_cards(&self) -> Result<Vec<Card>, CoreError>;
    fn save_cards(&self, cards: &[Card]) -> Result<(), CoreError>;

    fn get_settings(&self) -> Result<Option<LearningSettings>, CoreError>;
    fn save_settings(&self, settings: &LearningSettings) -> Result<(), CoreError>;

    fn get_daily_stats(&self) -> Result<Option<TodayLearningStats>, CoreError>;
    fn save_daily_stats(&self, stats: &TodayLearningStats) -> Result<(), CoreError>;

    fn get_last_session_date(&self) -> Result<Option<DateTime<Utc>>, CoreError>;
    fn save_last_session_date(&self, at: DateTime<Utc>) -> Result<(), CoreError>;
}

/// Card CRUD as seen by the learning core and the surrounding app.
pub trait CardRepository: Send + Sync {
    fn all_cards(&self) -> Result<Vec<Card>, CoreError>;
    fn update(&self, card: &Card) -> Result<(), CoreError>;
    fn insert(&self, card: &Card) -> Result<(), CoreError>;
    fn remove(&self, id: CardId) -> Result<(), CoreError>;
}

/// Reads an optional persisted value, falling back to the default when it is
/// absent or unreadable. Failures are logged and pushed onto `warnings`.
pub fn load_or_default<T: Default>(
    loaded: Result<Option<T>, CoreError>,
    what: &str,
    warnings: &mut Vec<CoreError>,
) -> T {
    match loaded {
        Ok(v) => v.unwrap_or_default(),
        Err(e) => {
            log::warn!("could not load {what}, using defaults: {e}");
            warnings.push(e);
            T::default()
        }
    }
}

/// Logs and records a failed write; the caller keeps its in-memory value.
pub fn note_failure(result: Result<(), CoreError>, what: &str, warnings: &mut Vec<CoreError>) {
    if let Err(e) = result {
        log::warn!("could not persist {what}: {e}");
        warnings.push(e);
    }
}

/// Replace-by-id over a full card list, for stores that keep cards as one value.
pub fn replace_card(cards: &mut [Card], card: &Card) -> Result<(), CoreError> {
    let Some(slot) = cards.iter_mut().find(|c| c.id == card.id) else {
        return Err(CoreError::NotFound("card"));
    };
    *slot = card.clone();
    Ok(())
}
