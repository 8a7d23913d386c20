//! Settings subcommands: local preferences plus the remote sync of the
//! learning-related ones.

use clap::Subcommand;
use wordhoard_core::settings::{Settings, SettingsPatch};
use wordhoard_core::sync::{Mutation, SettingsUpdate, SyncQueue};
use wordhoard_core::Result;

use super::sync;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Update one or more settings
    Set {
        /// Words to review per day
        #[arg(long)]
        daily_goal: Option<u32>,
        /// New words introduced per day
        #[arg(long)]
        new_word_limit: Option<u32>,
        /// Enable or disable the daily reminder
        #[arg(long)]
        reminders: Option<bool>,
        /// Local hour for the daily reminder
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=23))]
        reminder_hour: Option<u32>,
        /// Remote API base URL; pass an empty string to clear it
        #[arg(long)]
        api_url: Option<String>,
    },
}

pub async fn run(action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { json } => show(json),
        SettingsAction::Set {
            daily_goal,
            new_word_limit,
            reminders,
            reminder_hour,
            api_url,
        } => {
            let patch = SettingsPatch {
                daily_goal,
                new_word_limit,
                reminders_enabled: reminders,
                reminder_hour,
            };
            set(patch, api_url).await
        }
    }
}

fn show(json: bool) -> Result<()> {
    let settings = Settings::load_or_default()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }
    println!("User:           {}", settings.user_id);
    println!("Daily goal:     {} word(s)", settings.daily_goal);
    println!("New word limit: {} word(s)", settings.new_word_limit);
    println!(
        "Reminders:      {}",
        if settings.reminders_enabled {
            format!("on at {:02}:00", settings.reminder_hour)
        } else {
            "off".to_string()
        }
    );
    match &settings.api_url {
        Some(url) => println!("Endpoint:       {url}"),
        None => println!("Endpoint:       not configured"),
    }
    Ok(())
}

async fn set(patch: SettingsPatch, api_url: Option<String>) -> Result<()> {
    if patch.is_empty() && api_url.is_none() {
        return Err("nothing to change; pass at least one setting flag".into());
    }

    let mut settings = Settings::load_or_default()?;
    patch.apply(&mut settings);

    // The endpoint is a device-local concern and never part of the synced
    // patch; an empty string clears it.
    if let Some(url) = api_url {
        settings.api_url = if url.is_empty() { None } else { Some(url) };
    }
    settings.save()?;
    println!("Settings saved.");

    if !patch.is_empty() {
        let mut queue = SyncQueue::open_default()?;
        queue.enqueue(&Mutation::SettingsUpdate(SettingsUpdate {
            user_id: settings.user_id.clone(),
            patch,
        }))?;
        drop(queue);
        sync::flush_queue(&settings).await;
    }
    Ok(())
}
