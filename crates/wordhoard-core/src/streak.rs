//! Daily streak tracking with weekly freeze protection.
//!
//! All arithmetic operates on local calendar dates, never UTC instants, so
//! a learner near a timezone boundary is not penalized for the server's
//! idea of midnight. Callers pass `today` explicitly (production code uses
//! `Local::now().date_naive()`); the functions themselves never read the
//! clock.
//!
//! A freeze preserves a streak across a single missed day. One freeze is
//! usable per calendar week, with weeks starting Monday -- a freeze spent
//! on a Sunday is available again the very next day.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Streak health derived from the last activity date and freeze usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreakStatus {
    /// Activity already recorded today.
    Active,
    /// A missed day is covered by a freeze.
    Frozen,
    /// One day missed and no freeze covering it; today's activity saves it.
    AtRisk,
    /// Two or more uncovered days missed; the next activity restarts at 1.
    Broken,
}

impl StreakStatus {
    /// Display label, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            StreakStatus::Active => "active",
            StreakStatus::Frozen => "frozen",
            StreakStatus::AtRisk => "at-risk",
            StreakStatus::Broken => "broken",
        }
    }
}

/// Per-user streak state. Dates serialize as plain `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity: Option<NaiveDate>,
    pub freeze_used_on: Option<NaiveDate>,
}

impl StreakRecord {
    /// Classify the streak as of `today`.
    pub fn status(&self, today: NaiveDate) -> StreakStatus {
        let Some(last) = self.last_activity else {
            return StreakStatus::Broken;
        };
        if last >= today {
            return StreakStatus::Active;
        }
        let gap = (today - last).num_days();
        let freeze_covers_gap = match self.freeze_used_on {
            Some(used) => {
                (gap == 1 && used == today) || (gap == 2 && used == today - Duration::days(1))
            }
            None => false,
        };
        if freeze_covers_gap {
            StreakStatus::Frozen
        } else if gap == 1 {
            StreakStatus::AtRisk
        } else {
            StreakStatus::Broken
        }
    }

    /// Record learning activity for `today`, returning the updated record.
    ///
    /// At most one increment per calendar day: recording twice on the same
    /// date is a no-op. A one-day gap continues the streak; a two-day gap
    /// continues it only when a freeze was spent on the missed day
    /// (yesterday); anything else restarts at 1.
    pub fn record_activity(&self, today: NaiveDate) -> StreakRecord {
        if self.last_activity == Some(today) {
            return self.clone();
        }
        let gap = self.last_activity.map(|last| (today - last).num_days());
        let current_streak = match gap {
            Some(1) => self.current_streak + 1,
            Some(2) if self.freeze_used_on == Some(today - Duration::days(1)) => {
                self.current_streak + 1
            }
            _ => 1,
        };
        StreakRecord {
            current_streak,
            longest_streak: self.longest_streak.max(current_streak),
            last_activity: Some(today),
            freeze_used_on: self.freeze_used_on,
        }
    }

    /// Whether a freeze can still be spent in the calendar week of `today`.
    pub fn freeze_available(&self, today: NaiveDate) -> bool {
        match self.freeze_used_on {
            Some(used) => used < week_start(today),
            None => true,
        }
    }

    /// Spend this week's freeze on `today`.
    ///
    /// Returns `None` when the week's freeze was already used, so repeated
    /// attempts within one week leave the record unchanged.
    pub fn use_freeze(&self, today: NaiveDate) -> Option<StreakRecord> {
        if !self.freeze_available(today) {
            return None;
        }
        Some(StreakRecord {
            freeze_used_on: Some(today),
            ..self.clone()
        })
    }
}

/// Monday of the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// First day the freeze becomes usable again: the Monday after the week in
/// which it was spent.
pub fn next_freeze_date(freeze_used_on: NaiveDate) -> NaiveDate {
    week_start(freeze_used_on) + Duration::days(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // 2024-01-01 is a Monday; the tests below lean on that week.
    fn record(
        current: u32,
        longest: u32,
        last: Option<NaiveDate>,
        freeze: Option<NaiveDate>,
    ) -> StreakRecord {
        StreakRecord {
            current_streak: current,
            longest_streak: longest,
            last_activity: last,
            freeze_used_on: freeze,
        }
    }

    #[test]
    fn test_status_active_when_recorded_today() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(today), None);
        assert_eq!(r.status(today), StreakStatus::Active);
    }

    #[test]
    fn test_status_at_risk_after_one_missed_day() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(d(2024, 1, 9)), None);
        assert_eq!(r.status(today), StreakStatus::AtRisk);
    }

    #[test]
    fn test_status_frozen_when_freeze_used_today() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(d(2024, 1, 9)), Some(today));
        assert_eq!(r.status(today), StreakStatus::Frozen);
    }

    #[test]
    fn test_status_frozen_when_freeze_bridged_yesterday() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(d(2024, 1, 8)), Some(d(2024, 1, 9)));
        assert_eq!(r.status(today), StreakStatus::Frozen);
    }

    #[test]
    fn test_status_freeze_must_match_gap_exactly() {
        let today = d(2024, 1, 10);
        // Freeze spent yesterday with only a one-day gap does not freeze.
        let r = record(3, 5, Some(d(2024, 1, 9)), Some(d(2024, 1, 9)));
        assert_eq!(r.status(today), StreakStatus::AtRisk);
        // A three-day gap is broken even with a recent freeze.
        let r = record(3, 5, Some(d(2024, 1, 7)), Some(d(2024, 1, 9)));
        assert_eq!(r.status(today), StreakStatus::Broken);
    }

    #[test]
    fn test_status_broken_after_two_missed_days() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(d(2024, 1, 8)), None);
        assert_eq!(r.status(today), StreakStatus::Broken);
    }

    #[test]
    fn test_status_broken_with_no_history() {
        let r = StreakRecord::default();
        assert_eq!(r.status(d(2024, 1, 10)), StreakStatus::Broken);
    }

    #[test]
    fn test_record_activity_same_day_is_noop() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(today), None);
        let updated = r.record_activity(today);
        assert_eq!(updated, r);
    }

    #[test]
    fn test_record_activity_consecutive_day_increments() {
        let today = d(2024, 1, 10);
        let r = record(3, 5, Some(d(2024, 1, 9)), None);
        let updated = r.record_activity(today);
        assert_eq!(updated.current_streak, 4);
        assert_eq!(updated.longest_streak, 5);
        assert_eq!(updated.last_activity, Some(today));
    }

    #[test]
    fn test_record_activity_freeze_bridges_two_day_gap() {
        let today = d(2024, 1, 10);
        let r = record(6, 6, Some(d(2024, 1, 8)), Some(d(2024, 1, 9)));
        let updated = r.record_activity(today);
        assert_eq!(updated.current_streak, 7);
        assert_eq!(updated.longest_streak, 7);
    }

    #[test]
    fn test_record_activity_two_day_gap_without_freeze_resets() {
        let today = d(2024, 1, 10);
        let r = record(6, 9, Some(d(2024, 1, 8)), None);
        let updated = r.record_activity(today);
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 9);
    }

    #[test]
    fn test_record_activity_stale_freeze_does_not_bridge() {
        let today = d(2024, 1, 10);
        // Freeze spent two days before today covers the wrong day.
        let r = record(6, 6, Some(d(2024, 1, 8)), Some(d(2024, 1, 8)));
        let updated = r.record_activity(today);
        assert_eq!(updated.current_streak, 1);
    }

    #[test]
    fn test_record_activity_first_ever() {
        let today = d(2024, 1, 10);
        let updated = StreakRecord::default().record_activity(today);
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 1);
        assert_eq!(updated.last_activity, Some(today));
    }

    #[test]
    fn test_longest_never_below_current() {
        let mut r = StreakRecord::default();
        let mut day = d(2024, 1, 1);
        for _ in 0..10 {
            r = r.record_activity(day);
            assert!(r.longest_streak >= r.current_streak);
            day += Duration::days(1);
        }
        assert_eq!(r.current_streak, 10);
        assert_eq!(r.longest_streak, 10);
    }

    #[test]
    fn test_freeze_available_when_never_used() {
        let r = StreakRecord::default();
        assert!(r.freeze_available(d(2024, 1, 10)));
    }

    #[test]
    fn test_freeze_unavailable_within_same_week() {
        // Freeze spent Monday 2024-01-01; Sunday the 7th is the same week.
        let r = record(3, 3, None, Some(d(2024, 1, 1)));
        assert!(!r.freeze_available(d(2024, 1, 7)));
        assert!(!r.freeze_available(d(2024, 1, 1)));
    }

    #[test]
    fn test_freeze_used_sunday_available_next_monday() {
        // Sunday 2024-01-07 -> available again Monday 2024-01-08.
        let r = record(3, 3, None, Some(d(2024, 1, 7)));
        assert!(!r.freeze_available(d(2024, 1, 7)));
        assert!(r.freeze_available(d(2024, 1, 8)));
    }

    #[test]
    fn test_use_freeze_is_idempotent_within_week() {
        let tuesday = d(2024, 1, 2);
        let wednesday = d(2024, 1, 3);
        let r = StreakRecord::default().use_freeze(tuesday).unwrap();
        assert_eq!(r.freeze_used_on, Some(tuesday));
        assert!(r.use_freeze(wednesday).is_none());

        let next_tuesday = d(2024, 1, 9);
        let r = r.use_freeze(next_tuesday).unwrap();
        assert_eq!(r.freeze_used_on, Some(next_tuesday));
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(d(2024, 1, 1)), d(2024, 1, 1)); // Monday
        assert_eq!(week_start(d(2024, 1, 3)), d(2024, 1, 1)); // Wednesday
        assert_eq!(week_start(d(2024, 1, 7)), d(2024, 1, 1)); // Sunday
        assert_eq!(week_start(d(2024, 1, 8)), d(2024, 1, 8)); // next Monday
    }

    #[test]
    fn test_next_freeze_date_is_following_monday() {
        assert_eq!(next_freeze_date(d(2024, 1, 3)), d(2024, 1, 8));
        assert_eq!(next_freeze_date(d(2024, 1, 7)), d(2024, 1, 8));
        assert_eq!(next_freeze_date(d(2024, 1, 8)), d(2024, 1, 15));
    }

    #[test]
    fn test_dates_serialize_as_plain_strings() {
        let r = record(2, 4, Some(d(2024, 1, 10)), None);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["last_activity"], "2024-01-10");
        let back: StreakRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
