use crate::repo::{replace_card, CardRepository, StorageProvider};
use crate::{Card, CardId, CoreError, LearningSettings, TodayLearningStats};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory store. `set_unavailable(true)` makes every call fail as if the
/// backing storage had gone away, which is how degraded paths are exercised.
#[derive(Default)]
pub struct MemoryStore {
    cards: RwLock<Vec<Card>>,
    settings: RwLock<Option<LearningSettings>>,
    daily_stats: RwLock<Option<TodayLearningStats>>,
    last_session: RwLock<Option<DateTime<Utc>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<Card>) -> Self {
        let store = Self::default();
        *store.cards.write() = cards;
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::PersistenceUnavailable("memory store offline".into()));
        }
        Ok(())
    }
}

impl StorageProvider for MemoryStore {
    fn get_cards(&self) -> Result<Vec<Card>, CoreError> {
        self.check()?;
        Ok(self.cards.read().clone())
    }

    fn save_cards(&self, cards: &[Card]) -> Result<(), CoreError> {
        self.check()?;
        *self.cards.write() = cards.to_vec();
        Ok(())
    }

    fn get_settings(&self) -> Result<Option<LearningSettings>, CoreError> {
        self.check()?;
        Ok(self.settings.read().clone())
    }

    fn save_settings(&self, settings: &LearningSettings) -> Result<(), CoreError> {
        self.check()?;
        *self.settings.write() = Some(settings.clone());
        Ok(())
    }

    fn get_daily_stats(&self) -> Result<Option<TodayLearningStats>, CoreError> {
        self.check()?;
        Ok(self.daily_stats.read().clone())
    }

    fn save_daily_stats(&self, stats: &TodayLearningStats) -> Result<(), CoreError> {
        self.check()?;
        *self.daily_stats.write() = Some(stats.clone());
        Ok(())
    }

    fn get_last_session_date(&self) -> Result<Option<DateTime<Utc>>, CoreError> {
        self.check()?;
        Ok(*self.last_session.read())
    }

    fn save_last_session_date(&self, at: DateTime<Utc>) -> Result<(), CoreError> {
        self.check()?;
        *self.last_session.write() = Some(at);
        Ok(())
    }
}

impl CardRepository for MemoryStore {
    fn all_cards(&self) -> Result<Vec<Card>, CoreError> {
        self.get_cards()
    }

    fn update(&self, card: &Card) -> Result<(), CoreError> {
        self.check()?;
        replace_card(&mut self.cards.write(), card)
    }

    fn insert(&self, card: &Card) -> Result<(), CoreError> {
        self.check()?;
        let mut cards = self.cards.write();
        if cards.iter().any(|c| c.id == card.id) {
            return Err(CoreError::Conflict("card id already exists"));
        }
        cards.push(card.clone());
        Ok(())
    }

    fn remove(&self, id: CardId) -> Result<(), CoreError> {
        self.check()?;
        let mut cards = self.cards.write();
        let before = cards.len();
        cards.retain(|c| c.id != id);
        if cards.len() == before {
            return Err(CoreError::NotFound("card"));
        }
        Ok(())
    }
}
