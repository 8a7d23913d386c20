//! Lesson completion: seeds new words and queues the completion for sync.

use chrono::{Local, Utc};
use clap::Subcommand;
use wordhoard_core::settings::Settings;
use wordhoard_core::storage::{Lookup, ProgressDb};
use wordhoard_core::sync::{LessonCompletion, Mutation, SyncQueue};
use wordhoard_core::{Result, ReviewProgress};

use super::{streak, sync};

#[derive(Subcommand)]
pub enum LessonAction {
    /// Mark a lesson finished and seed its words for review
    Complete {
        /// Lesson identifier
        lesson_id: String,
        /// Word identifiers introduced by the lesson, comma separated
        #[arg(long, value_delimiter = ',')]
        words: Vec<String>,
    },
}

pub async fn run(action: LessonAction) -> Result<()> {
    match action {
        LessonAction::Complete { lesson_id, words } => complete(&lesson_id, &words).await,
    }
}

async fn complete(lesson_id: &str, words: &[String]) -> Result<()> {
    let settings = Settings::load_or_default()?;
    let db = ProgressDb::open_default()?;
    let now = Utc::now();

    // Words the learner already studied keep their schedule; only genuinely
    // new ones start fresh.
    let mut seeded = 0usize;
    for word_id in words {
        match db.get_progress(&settings.user_id, word_id) {
            Lookup::Found(_) => {}
            Lookup::NotFound => {
                db.put_progress(&settings.user_id, word_id, &ReviewProgress::fresh(now))?;
                seeded += 1;
            }
            Lookup::Unavailable(e) => return Err(e.into()),
        }
    }

    let record = streak::record_daily_activity(&db, &settings.user_id, Local::now().date_naive())?;

    let mut queue = SyncQueue::open_default()?;
    queue.enqueue(&Mutation::LessonCompletion(LessonCompletion {
        user_id: settings.user_id.clone(),
        lesson_id: lesson_id.to_string(),
        completed_at: now,
    }))?;
    drop(queue);

    println!("Lesson {lesson_id} complete: {seeded} new word(s) queued for review.");
    println!("Streak: {} day(s)", record.current_streak);

    sync::flush_queue(&settings).await;
    Ok(())
}
