//! Review subcommands: the due queue and recall grading.

use chrono::{Local, Utc};
use clap::Subcommand;
use serde_json::json;
use wordhoard_core::settings::Settings;
use wordhoard_core::storage::{Lookup, ProgressDb};
use wordhoard_core::sync::{Mutation, ReviewRating, SyncQueue};
use wordhoard_core::{calculate_next_review, classify, Rating, Result, ReviewProgress};

use super::{streak, sync};

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Words due for review, most overdue first
    Due {
        /// Maximum number of words to list
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Grade one word's recall and reschedule it
    Rate {
        /// Word identifier
        word_id: String,
        /// Recall quality: again, hard, good, or easy (or 0-3)
        rating: String,
    },
}

pub async fn run(action: ReviewAction) -> Result<()> {
    match action {
        ReviewAction::Due { limit, json } => show_due(limit, json),
        ReviewAction::Rate { word_id, rating } => rate(&word_id, &rating).await,
    }
}

fn show_due(limit: usize, json: bool) -> Result<()> {
    let settings = Settings::load_or_default()?;
    let db = ProgressDb::open_default()?;
    let due = db.due_words(&settings.user_id, Utc::now(), limit)?;

    if json {
        let entries: Vec<_> = due
            .iter()
            .map(|(word_id, progress)| {
                json!({
                    "word_id": word_id,
                    "state": classify(Some(progress)).label(),
                    "interval_days": progress.interval_days,
                    "next_due": progress.next_due,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if due.is_empty() {
        println!("Nothing due.");
        return Ok(());
    }
    println!("{} word(s) due:", due.len());
    for (word_id, progress) in &due {
        println!(
            "  {} [{}] due {}",
            word_id,
            classify(Some(progress)).label(),
            progress.next_due.format("%Y-%m-%d %H:%M"),
        );
    }
    Ok(())
}

async fn rate(word_id: &str, rating: &str) -> Result<()> {
    let rating: Rating = rating.parse()?;
    let settings = Settings::load_or_default()?;
    let db = ProgressDb::open_default()?;
    let now = Utc::now();

    let current = match db.get_progress(&settings.user_id, word_id) {
        Lookup::Found(progress) => progress,
        Lookup::NotFound => ReviewProgress::fresh(now),
        Lookup::Unavailable(e) => return Err(e.into()),
    };
    let next = calculate_next_review(rating, &current, now);
    db.put_progress(&settings.user_id, word_id, &next)?;

    let record = streak::record_daily_activity(&db, &settings.user_id, Local::now().date_naive())?;

    let mut queue = SyncQueue::open_default()?;
    queue.enqueue(&Mutation::ReviewRating(ReviewRating {
        user_id: settings.user_id.clone(),
        word_id: word_id.to_string(),
        rating,
        rated_at: now,
    }))?;
    drop(queue);

    println!(
        "{word_id}: {rating} -> interval {} day(s), ease {:.2}, next review {} [{}]",
        next.interval_days,
        next.ease_factor,
        next.next_due.format("%Y-%m-%d"),
        classify(Some(&next)).label(),
    );
    println!("Streak: {} day(s)", record.current_streak);

    sync::flush_queue(&settings).await;
    Ok(())
}
