//! Streak subcommands and the shared daily-activity bookkeeping.

use chrono::{Duration, Local, NaiveDate};
use clap::Subcommand;
use serde_json::json;
use wordhoard_core::settings::Settings;
use wordhoard_core::storage::{Lookup, ProgressDb};
use wordhoard_core::streak::next_freeze_date;
use wordhoard_core::{Result, StreakRecord};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak and freeze availability
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Spend this week's freeze to cover today
    Freeze,
}

pub fn run(action: StreakAction) -> Result<()> {
    match action {
        StreakAction::Show { json } => show(json),
        StreakAction::Freeze => freeze(),
    }
}

fn show(json: bool) -> Result<()> {
    let settings = Settings::load_or_default()?;
    let db = ProgressDb::open_default()?;
    let record = load_record(&db, &settings.user_id)?;
    let today = Local::now().date_naive();
    let status = record.status(today);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "current_streak": record.current_streak,
                "longest_streak": record.longest_streak,
                "status": status,
                "last_activity": record.last_activity,
                "freeze_available": record.freeze_available(today),
            }))?
        );
        return Ok(());
    }

    println!("Current streak: {} day(s)", record.current_streak);
    println!("Longest streak: {} day(s)", record.longest_streak);
    println!("Status: {}", status.label());
    if record.freeze_available(today) {
        println!("Freeze: available");
    } else if let Some(used) = record.freeze_used_on {
        println!(
            "Freeze: used {}, next available {}",
            used,
            next_freeze_date(used)
        );
    }
    Ok(())
}

fn freeze() -> Result<()> {
    let settings = Settings::load_or_default()?;
    let db = ProgressDb::open_default()?;
    let record = load_record(&db, &settings.user_id)?;
    let today = Local::now().date_naive();

    match record.use_freeze(today) {
        Some(updated) => {
            db.put_streak(&settings.user_id, &updated)?;
            println!("Freeze applied for {today}.");
            Ok(())
        }
        None => {
            let mut msg = String::from("freeze already used this week");
            if let Some(used) = record.freeze_used_on {
                msg.push_str(&format!("; next available {}", next_freeze_date(used)));
            }
            Err(msg.into())
        }
    }
}

/// Record today's learning activity, spending a freeze first when that is
/// the only way to keep the streak connected.
///
/// A two-day gap is bridgeable only if a freeze covers the missed day, so
/// when that day is uncovered and this week's freeze is still unspent, it
/// goes to the missed day before the activity is recorded.
pub(crate) fn record_daily_activity(
    db: &ProgressDb,
    user_id: &str,
    today: NaiveDate,
) -> Result<StreakRecord> {
    let record = load_record(db, user_id)?;

    let yesterday = today - Duration::days(1);
    let record = if record.last_activity == Some(today - Duration::days(2))
        && record.freeze_used_on != Some(yesterday)
    {
        match record.use_freeze(yesterday) {
            Some(frozen) => {
                println!("Spent this week's freeze on {yesterday} to keep the streak alive.");
                frozen
            }
            None => record,
        }
    } else {
        record
    };

    let updated = record.record_activity(today);
    db.put_streak(user_id, &updated)?;
    Ok(updated)
}

fn load_record(db: &ProgressDb, user_id: &str) -> Result<StreakRecord> {
    match db.get_streak(user_id) {
        Lookup::Found(record) => Ok(record),
        Lookup::NotFound => Ok(StreakRecord::default()),
        Lookup::Unavailable(e) => Err(e.into()),
    }
}
