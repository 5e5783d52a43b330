//! Daily progress counters, scoped to one calendar day and persisted after
//! every change.

use crate::repo::{load_or_default, note_failure, StorageProvider};
use crate::{CoreError, Quality, StudyCalendar, TodayLearningStats, TodayPlan};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct DailyStatsTracker {
    storage: Arc<dyn StorageProvider>,
    calendar: StudyCalendar,
    stats: TodayLearningStats,
    last_session: Option<DateTime<Utc>>,
    warnings: Vec<CoreError>,
}

impl DailyStatsTracker {
    /// Reloads today's counters, or starts from zero when the last session was
    /// on another day or nothing readable was stored.
    pub fn load(storage: Arc<dyn StorageProvider>, calendar: StudyCalendar, now: DateTime<Utc>) -> Self {
        let mut warnings = Vec::new();
        let last_session = load_or_default(storage.get_last_session_date().map(Some), "last session date", &mut warnings);
        let stats = load_or_default(storage.get_daily_stats(), "daily stats", &mut warnings);
        let mut tracker = Self {
            storage,
            calendar,
            stats,
            last_session,
            warnings,
        };
        tracker.rollover(now);
        tracker
    }

    pub fn stats(&self) -> &TodayLearningStats {
        &self.stats
    }

    /// Zeroes the counters if the last session was not on `now`'s calendar day.
    /// Returns whether a reset happened.
    pub fn rollover(&mut self, now: DateTime<Utc>) -> bool {
        let same_day = self
            .last_session
            .map(|last| self.calendar.is_same_day(last, now))
            .unwrap_or(false);
        if same_day || self.stats == TodayLearningStats::default() {
            return false;
        }
        log::info!("new study day, resetting daily stats");
        self.stats = TodayLearningStats::default();
        true
    }

    pub fn record_answer(&mut self, quality: Quality) {
        self.stats.reviewed_cards += 1;
        if quality.is_correct() {
            self.stats.correct_answers += 1;
        }
        let saved = self.storage.save_daily_stats(&self.stats);
        note_failure(saved, "daily stats", &mut self.warnings);
    }

    /// Stores the sizes of a freshly computed plan and stamps the session date.
    pub fn apply_plan(&mut self, plan: &TodayPlan, now: DateTime<Utc>) {
        self.stats.remaining_new = plan.new_cards.len() as u32;
        self.stats.remaining_reviews = plan.due_reviews.len() as u32;
        self.last_session = Some(now);

        let saved = self.storage.save_last_session_date(now);
        note_failure(saved, "last session date", &mut self.warnings);
        let saved = self.storage.save_daily_stats(&self.stats);
        note_failure(saved, "daily stats", &mut self.warnings);
    }

    pub fn take_warnings(&mut self) -> Vec<CoreError> {
        std::mem::take(&mut self.warnings)
    }
}
