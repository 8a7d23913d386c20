mod mastery;
mod scheduler;

pub use mastery::{classify, LearningState, LEARNING_MAX_REPETITIONS, MASTERED_INTERVAL_DAYS};
pub use scheduler::{
    calculate_next_review, Rating, ReviewProgress, DEFAULT_EASE_FACTOR, EASY_BONUS,
    FIRST_INTERVAL_DAYS, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR, SECOND_INTERVAL_DAYS,
};
