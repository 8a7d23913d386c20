//! SM-2 spaced-repetition scheduling.
//!
//! Pure functions computing the next review for a vocabulary item from a
//! recall rating and the item's current progress. No I/O; callers supply
//! the clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lower bound for the ease factor.
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Ease factor assigned to an item with no review history.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
/// Interval multiplier applied on top of the SM-2 result for an easy rating.
pub const EASY_BONUS: f64 = 1.3;
/// Interval after the first successful review, in days.
pub const FIRST_INTERVAL_DAYS: u32 = 1;
/// Interval after the second successful review, in days.
pub const SECOND_INTERVAL_DAYS: u32 = 6;
/// Upper bound on any scheduled interval, in days (one hundred years).
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Recall quality reported by the learner for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// Numeric form used on the wire and by the CLI (0-3).
    pub fn value(&self) -> u8 {
        match self {
            Rating::Again => 0,
            Rating::Hard => 1,
            Rating::Good => 2,
            Rating::Easy => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }

    /// SM-2 quality value: `rating + 2`, giving 2-5.
    fn quality(&self) -> f64 {
        f64::from(self.value()) + 2.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rating {
    type Err = String;

    /// Accepts the rating name or its numeric form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "again" | "0" => Ok(Rating::Again),
            "hard" | "1" => Ok(Rating::Hard),
            "good" | "2" => Ok(Rating::Good),
            "easy" | "3" => Ok(Rating::Easy),
            other => Err(format!(
                "unknown rating '{other}', expected again, hard, good, or easy"
            )),
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rating::Again),
            1 => Ok(Rating::Hard),
            2 => Ok(Rating::Good),
            3 => Ok(Rating::Easy),
            other => Err(format!("rating must be 0-3, got {other}")),
        }
    }
}

/// Scheduling state for one user x vocabulary item pair.
///
/// `repetitions == 0` means the item was never successfully reviewed;
/// a failing rating resets the interval to 1 day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewProgress {
    pub ease_factor: f64,
    pub interval_days: u32,
    pub repetitions: u32,
    pub next_due: DateTime<Utc>,
}

impl ReviewProgress {
    /// Progress for an item with no prior history: ease 2.5, interval 1,
    /// zero repetitions, due immediately.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            ease_factor: DEFAULT_EASE_FACTOR,
            interval_days: FIRST_INTERVAL_DAYS,
            repetitions: 0,
            next_due: now,
        }
    }
}

/// Compute the post-review progress for an item.
///
/// Implements SM-2 with a four-value rating scale mapped to quality 2-5.
/// The interval growth for the third and later repetitions multiplies by
/// the ease factor as it was *before* this review; the ease-factor update
/// happens afterwards. Intervals are capped at [`MAX_INTERVAL_DAYS`] so a
/// long run of easy ratings keeps a representable due date. Total over its
/// input domain and never panics.
pub fn calculate_next_review(
    rating: Rating,
    current: &ReviewProgress,
    now: DateTime<Utc>,
) -> ReviewProgress {
    let q = rating.quality();

    let (interval_days, repetitions) = if q < 3.0 {
        // Failed recall: schedule for tomorrow and restart the repetition count.
        (FIRST_INTERVAL_DAYS, 0)
    } else {
        let repetitions = current.repetitions.saturating_add(1);
        let mut interval = match repetitions {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => clamp_interval(f64::from(current.interval_days) * current.ease_factor),
        };
        if rating == Rating::Easy {
            interval = clamp_interval(f64::from(interval) * EASY_BONUS);
        }
        (interval, repetitions)
    };

    let ease_factor = next_ease_factor(current.ease_factor, q);

    ReviewProgress {
        ease_factor,
        interval_days,
        repetitions,
        next_due: now
            .checked_add_signed(Duration::days(i64::from(interval_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

/// Round a computed interval and clamp it to the schedulable range.
fn clamp_interval(days: f64) -> u32 {
    (days.round() as u32).clamp(FIRST_INTERVAL_DAYS, MAX_INTERVAL_DAYS)
}

/// Standard SM-2 ease adjustment, rounded to 2 decimals and floored at 1.3.
fn next_ease_factor(ease_factor: f64, q: f64) -> f64 {
    let adjusted = ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02));
    round2(adjusted).max(MIN_EASE_FACTOR)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn progress(ease_factor: f64, interval_days: u32, repetitions: u32) -> ReviewProgress {
        ReviewProgress {
            ease_factor,
            interval_days,
            repetitions,
            next_due: Utc::now(),
        }
    }

    #[test]
    fn test_again_resets_interval_and_repetitions() {
        let now = Utc::now();
        let current = progress(2.5, 15, 3);
        let result = calculate_next_review(Rating::Again, &current, now);

        assert_eq!(result.interval_days, 1);
        assert_eq!(result.repetitions, 0);
        assert!(result.ease_factor < current.ease_factor);
        assert_eq!(result.ease_factor, 2.18); // 2.5 - 0.32
        assert_eq!(result.next_due, now + Duration::days(1));
    }

    #[test]
    fn test_again_respects_ease_floor() {
        let now = Utc::now();
        let current = progress(1.3, 1, 0);
        let result = calculate_next_review(Rating::Again, &current, now);
        assert_eq!(result.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_good_sequence_from_fresh_item() {
        let now = Utc::now();
        let fresh = ReviewProgress::fresh(now);

        let first = calculate_next_review(Rating::Good, &fresh, now);
        assert_eq!(first.interval_days, 1);
        assert_eq!(first.repetitions, 1);
        assert_eq!(first.ease_factor, 2.5); // good leaves ease unchanged

        let second = calculate_next_review(Rating::Good, &first, now);
        assert_eq!(second.interval_days, 6);
        assert_eq!(second.repetitions, 2);

        let third = calculate_next_review(Rating::Good, &second, now);
        assert_eq!(third.interval_days, 15); // round(6 * 2.5)
        assert_eq!(third.repetitions, 3);
    }

    #[test]
    fn test_third_interval_uses_pre_update_ease() {
        let now = Utc::now();
        // Hard lowers the ease to 2.36, but the interval must still grow by 2.5.
        let current = progress(2.5, 6, 2);
        let result = calculate_next_review(Rating::Hard, &current, now);

        assert_eq!(result.interval_days, 15); // round(6 * 2.5), not round(6 * 2.36)
        assert_eq!(result.ease_factor, 2.36);
    }

    #[test]
    fn test_easy_applies_interval_bonus() {
        let now = Utc::now();
        let current = progress(2.5, 6, 2);
        let result = calculate_next_review(Rating::Easy, &current, now);

        assert_eq!(result.interval_days, 20); // round(round(6 * 2.5) * 1.3)
        assert_eq!(result.ease_factor, 2.6);
    }

    #[test]
    fn test_easy_bonus_on_early_repetitions() {
        let now = Utc::now();
        let fresh = ReviewProgress::fresh(now);

        let first = calculate_next_review(Rating::Easy, &fresh, now);
        assert_eq!(first.interval_days, 1); // round(1 * 1.3)

        let second = calculate_next_review(Rating::Easy, &first, now);
        assert_eq!(second.interval_days, 8); // round(6 * 1.3)
    }

    #[test]
    fn test_easy_ease_exceeds_good_ease() {
        let now = Utc::now();
        for ease in [1.3, 1.7, 2.5, 3.1] {
            let current = progress(ease, 6, 2);
            let good = calculate_next_review(Rating::Good, &current, now);
            let easy = calculate_next_review(Rating::Easy, &current, now);
            assert!(
                easy.ease_factor > good.ease_factor,
                "easy {} should beat good {} from ease {}",
                easy.ease_factor,
                good.ease_factor,
                ease
            );
        }
    }

    #[test]
    fn test_hard_lowers_ease() {
        let now = Utc::now();
        let current = progress(2.5, 6, 2);
        let result = calculate_next_review(Rating::Hard, &current, now);
        assert_eq!(result.ease_factor, 2.36); // 2.5 - 0.14
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn test_fresh_progress_defaults() {
        let now = Utc::now();
        let fresh = ReviewProgress::fresh(now);
        assert_eq!(fresh.ease_factor, 2.5);
        assert_eq!(fresh.interval_days, 1);
        assert_eq!(fresh.repetitions, 0);
        assert_eq!(fresh.next_due, now);
    }

    #[test]
    fn test_long_easy_run_caps_interval() {
        let now = Utc::now();
        let mut current = ReviewProgress::fresh(now);
        for _ in 0..60 {
            let next = calculate_next_review(Rating::Easy, &current, now);
            assert!(next.interval_days >= 1);
            assert!(next.interval_days <= MAX_INTERVAL_DAYS);
            current = next;
        }
        assert_eq!(current.interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(
            current.next_due,
            now + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );
    }

    #[test]
    fn test_stored_interval_at_u32_max_is_clamped() {
        let now = Utc::now();
        let current = progress(2.5, u32::MAX, 12);
        let result = calculate_next_review(Rating::Good, &current, now);
        assert_eq!(result.interval_days, MAX_INTERVAL_DAYS);
        assert_eq!(
            result.next_due,
            now + Duration::days(i64::from(MAX_INTERVAL_DAYS))
        );
    }

    #[test]
    fn test_rating_numeric_round_trip() {
        for value in 0..=3u8 {
            let rating = Rating::try_from(value).unwrap();
            assert_eq!(rating.value(), value);
        }
        assert!(Rating::try_from(4).is_err());
    }

    #[test]
    fn test_rating_parses_names_and_digits() {
        assert_eq!("again".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!("easy".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!("2".parse::<Rating>().unwrap(), Rating::Good);
        assert!("perfect".parse::<Rating>().is_err());
        assert_eq!(Rating::Hard.to_string(), "hard");
    }

    proptest! {
        #[test]
        fn prop_scheduler_stays_within_bounds(
            ease in 1.3f64..4.0,
            interval in 0u32..=u32::MAX,
            reps in 0u32..=u32::MAX,
            rating in 0u8..4,
        ) {
            let rating = Rating::try_from(rating).unwrap();
            let now = Utc::now();
            let current = progress(ease, interval, reps);
            let result = calculate_next_review(rating, &current, now);

            prop_assert!(result.ease_factor >= MIN_EASE_FACTOR);
            prop_assert!(result.interval_days >= 1);
            prop_assert!(result.interval_days <= MAX_INTERVAL_DAYS);
            prop_assert_eq!(
                result.next_due,
                now + Duration::days(i64::from(result.interval_days))
            );
            if rating == Rating::Again {
                prop_assert_eq!(result.repetitions, 0);
                prop_assert_eq!(result.interval_days, 1);
            } else {
                prop_assert_eq!(result.repetitions, reps.saturating_add(1));
            }
        }
    }
}
