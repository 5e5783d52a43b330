//! Calendar-day arithmetic for scheduling.
//!
//! Timestamps are stored in UTC. Day boundaries ("start of today", "same day")
//! are taken in a fixed offset so that a learner in UTC+3 rolls over at their
//! own midnight, not at 00:00 UTC.

use chrono::{DateTime, Duration, FixedOffset, Local, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StudyCalendar {
    offset: FixedOffset,
}

impl Default for StudyCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl StudyCalendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Offset of the machine's local time zone as of now.
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = self.day_of(at).and_time(NaiveTime::MIN);
        let utc = midnight - Duration::seconds(self.offset.local_minus_utc() as i64);
        Utc.from_utc_datetime(&utc)
    }

    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.day_of(a) == self.day_of(b)
    }

    /// Midnight `days` calendar days after the day containing `now`.
    pub fn days_from_today(&self, now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        self.start_of_day(now) + Duration::days(days)
    }

    pub fn months_after(&self, at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
        at.checked_add_months(Months::new(months))
            .unwrap_or_else(|| at + Duration::days(30 * months as i64))
    }
}
