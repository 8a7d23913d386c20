//! Mastery state derivation for dashboards and eligibility checks.

use serde::{Deserialize, Serialize};

use super::scheduler::ReviewProgress;

/// Interval length, in days, at which an item counts as mastered.
pub const MASTERED_INTERVAL_DAYS: u32 = 7;
/// Highest repetition count still considered "learning".
pub const LEARNING_MAX_REPETITIONS: u32 = 2;

/// Four-state mastery label derived from review progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningState {
    New,
    Learning,
    Review,
    Mastered,
}

impl LearningState {
    /// Classify an item from its progress, if any.
    ///
    /// The interval check outranks the repetition count: a long interval
    /// indicates durable retention regardless of how few repetitions
    /// produced it.
    pub fn classify(progress: Option<&ReviewProgress>) -> Self {
        let Some(progress) = progress else {
            return LearningState::New;
        };
        if progress.repetitions == 0 {
            LearningState::New
        } else if progress.interval_days >= MASTERED_INTERVAL_DAYS {
            LearningState::Mastered
        } else if progress.repetitions <= LEARNING_MAX_REPETITIONS {
            LearningState::Learning
        } else {
            LearningState::Review
        }
    }

    /// Dashboard label.
    pub fn label(&self) -> &'static str {
        match self {
            LearningState::New => "new",
            LearningState::Learning => "learning",
            LearningState::Review => "review",
            LearningState::Mastered => "mastered",
        }
    }
}

/// Classify an item from its stored progress, if any.
pub fn classify(progress: Option<&ReviewProgress>) -> LearningState {
    LearningState::classify(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn progress(interval_days: u32, repetitions: u32) -> ReviewProgress {
        ReviewProgress {
            ease_factor: 2.5,
            interval_days,
            repetitions,
            next_due: Utc::now(),
        }
    }

    #[test]
    fn test_no_progress_is_new() {
        assert_eq!(LearningState::classify(None), LearningState::New);
    }

    #[test]
    fn test_zero_repetitions_is_new() {
        // A 30-day interval without a successful review still counts as new.
        let p = progress(30, 0);
        assert_eq!(LearningState::classify(Some(&p)), LearningState::New);
    }

    #[test]
    fn test_interval_dominates_repetitions() {
        let p = progress(7, 1);
        assert_eq!(LearningState::classify(Some(&p)), LearningState::Mastered);
    }

    #[test]
    fn test_high_repetitions_alone_is_not_mastery() {
        let p = progress(6, 10);
        assert_eq!(LearningState::classify(Some(&p)), LearningState::Review);
    }

    #[test]
    fn test_low_repetitions_short_interval_is_learning() {
        let p = progress(1, 1);
        assert_eq!(LearningState::classify(Some(&p)), LearningState::Learning);
        let p = progress(6, 2);
        assert_eq!(LearningState::classify(Some(&p)), LearningState::Learning);
    }

    #[test]
    fn test_serde_labels_are_snake_case() {
        let json = serde_json::to_string(&LearningState::Mastered).unwrap();
        assert_eq!(json, "\"mastered\"");
        assert_eq!(LearningState::Mastered.label(), "mastered");
    }
}
