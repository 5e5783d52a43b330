use crate::learning::{apply_answer, set_learned};
use crate::repo::{load_or_default, note_failure, CardRepository, StorageProvider};
use crate::{
    compute_today, Card, CardId, CoreError, DailyStatsTracker, LearningSettings, Quality, SessionQueue,
    StudyCalendar, TodayLearningStats, TodayPlan,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// One study run: today's plan, the interleaved queue over it, and the daily
/// counters. Persistence problems never stop the run; they are collected and
/// handed out through [`LearningSession::take_warnings`].
pub struct LearningSession {
    storage: Arc<dyn StorageProvider>,
    cards: Arc<dyn CardRepository>,
    calendar: StudyCalendar,
    settings: LearningSettings,
    tracker: DailyStatsTracker,
    plan: TodayPlan,
    queue: SessionQueue,
    warnings: Vec<CoreError>,
}

impl LearningSession {
    pub fn start(
        storage: Arc<dyn StorageProvider>,
        cards: Arc<dyn CardRepository>,
        calendar: StudyCalendar,
        now: DateTime<Utc>,
    ) -> Self {
        let mut warnings = Vec::new();
        let settings = load_or_default(storage.get_settings(), "learning settings", &mut warnings);
        let tracker = DailyStatsTracker::load(storage.clone(), calendar, now);
        let mut session = Self {
            storage,
            cards,
            calendar,
            settings,
            tracker,
            plan: TodayPlan::default(),
            queue: SessionQueue::default(),
            warnings,
        };
        session.reset(now);
        session
    }

    /// Recomputes today's plan from the live card list and updates the counters.
    pub fn compute_today(&mut self, now: DateTime<Utc>) -> &TodayPlan {
        self.tracker.rollover(now);
        let all = match self.cards.all_cards() {
            Ok(all) => all,
            Err(e) => {
                log::warn!("could not read cards, keeping previous plan: {e}");
                self.warnings.push(e);
                return &self.plan;
            }
        };
        if all.is_empty() {
            self.warnings.push(CoreError::EmptyDeck);
        }
        self.plan = compute_today(&all, &self.settings, self.tracker.stats(), now);
        self.tracker.apply_plan(&self.plan, now);
        &self.plan
    }

    /// Recomputes the plan and rebuilds the queue from it, discarding the cursor.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.compute_today(now);
        self.queue = SessionQueue::build(&self.plan.due_reviews, &self.plan.new_cards);
        log::info!("study queue ready: {} cards", self.queue.len());
    }

    /// Saves new settings and reschedules with them. The current queue is kept
    /// until the next [`reset`](Self::reset).
    pub fn update_settings(&mut self, settings: LearningSettings, now: DateTime<Utc>) {
        let saved = self.storage.save_settings(&settings);
        note_failure(saved, "learning settings", &mut self.warnings);
        self.settings = settings;
        self.compute_today(now);
    }

    /// Next card that can be shown at `now`, skipping queued cards that are
    /// not yet due.
    pub fn next_card(&mut self, now: DateTime<Utc>) -> Option<&Card> {
        let skipped = self.queue.skip_not_due(now);
        if skipped > 0 {
            log::debug!("skipped {skipped} not-yet-due cards");
        }
        self.queue.peek_next()
    }

    /// Answers the next card due at `now`: updates it, writes it back, counts
    /// the answer and moves on. Returns the updated card.
    pub fn answer(&mut self, quality: Quality, now: DateTime<Utc>) -> Result<Card, CoreError> {
        let current = self.next_card(now).cloned().ok_or(CoreError::NotFound("queued card"))?;
        let updated = apply_answer(current, quality, now, &self.calendar);

        let saved = self.cards.update(&updated);
        note_failure(saved, "card", &mut self.warnings);
        self.tracker.record_answer(quality);
        self.queue.advance();
        Ok(updated)
    }

    /// Like [`answer`](Self::answer) but for a raw 0..=5 score from outside.
    pub fn answer_score(&mut self, score: i64, now: DateTime<Utc>) -> Result<Card, CoreError> {
        let quality = Quality::try_from(score)?;
        self.answer(quality, now)
    }

    pub fn skip(&mut self) {
        self.queue.skip();
    }

    /// Manual learned toggle for any card in the repository.
    pub fn set_learned(&mut self, id: CardId, learned: bool, now: DateTime<Utc>) -> Result<Card, CoreError> {
        let card = self
            .cards
            .all_cards()?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or(CoreError::NotFound("card"))?;
        let updated = set_learned(card, learned, now, &self.calendar);
        self.cards.update(&updated)?;
        Ok(updated)
    }

    pub fn is_finished(&self) -> bool {
        self.queue.is_finished()
    }

    pub fn has_available_cards(&self, now: DateTime<Utc>) -> bool {
        self.queue.has_available(now)
    }

    pub fn settings(&self) -> &LearningSettings {
        &self.settings
    }

    pub fn stats(&self) -> &TodayLearningStats {
        self.tracker.stats()
    }

    pub fn plan(&self) -> &TodayPlan {
        &self.plan
    }

    pub fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    pub fn take_warnings(&mut self) -> Vec<CoreError> {
        let mut out = std::mem::take(&mut self.warnings);
        out.extend(self.tracker.take_warnings());
        out
    }
}
