//! Sync subcommands: explicit pushes, queue status, and failed-item retry.
//!
//! Every mutating command already queues its change durably; these commands
//! only control when the queue talks to the remote.

use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;
use wordhoard_core::settings::Settings;
use wordhoard_core::sync::{HttpBackend, SyncOrchestrator, SyncQueue};
use wordhoard_core::Result;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Push queued changes to the remote now
    Now,
    /// Queue depth and endpoint configuration
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pending and failed items
    Queue,
    /// Move failed items back into the queue for another attempt
    Retry,
}

pub async fn run(action: SyncAction) -> Result<()> {
    match action {
        SyncAction::Now => sync_now().await,
        SyncAction::Status { json } => show_status(json),
        SyncAction::Queue => show_queue(),
        SyncAction::Retry => retry(),
    }
}

async fn sync_now() -> Result<()> {
    let settings = Settings::load_or_default()?;
    let queue = SyncQueue::open_default()?;
    let Some(api_url) = settings.api_url.as_deref() else {
        println!(
            "No sync endpoint configured ({} item(s) queued).",
            queue.pending_count()
        );
        println!("Set one with: wordhoard-cli settings set --api-url <url>");
        return Ok(());
    };

    let orchestrator = SyncOrchestrator::new(queue, Arc::new(HttpBackend::new(api_url)));
    match orchestrator.sync_now().await {
        Some(report) => {
            println!(
                "Synced {}, failed {}, quarantined {}.",
                report.synced, report.failed, report.quarantined
            );
            if report.failed > 0 {
                println!("Failed item(s) will retry on the next sync.");
            }
            if report.quarantined > 0 {
                println!("Quarantined item(s) need 'wordhoard-cli sync retry'.");
            }
        }
        None => println!("A sync pass is already running."),
    }
    Ok(())
}

fn show_status(json: bool) -> Result<()> {
    let settings = Settings::load_or_default()?;
    let queue = SyncQueue::open_default()?;
    let pending = queue.pending_count();
    let failed = queue.failed().len();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "pending": pending,
                "failed": failed,
                "endpoint": settings.api_url,
            }))?
        );
        return Ok(());
    }
    println!("Pending: {pending}");
    println!("Failed:  {failed}");
    match &settings.api_url {
        Some(url) => println!("Endpoint: {url}"),
        None => println!("Endpoint: not configured"),
    }
    Ok(())
}

fn show_queue() -> Result<()> {
    let queue = SyncQueue::open_default()?;
    let pending = queue.pending();
    let failed = queue.failed();

    if pending.is_empty() && failed.is_empty() {
        println!("Queue is empty.");
        return Ok(());
    }
    if !pending.is_empty() {
        println!("Pending ({}):", pending.len());
        for item in &pending {
            println!(
                "  {} {} created {} retries {}",
                item.id,
                item.kind,
                item.created_at.format("%Y-%m-%d %H:%M"),
                item.retry_count
            );
        }
    }
    if !failed.is_empty() {
        println!("Failed ({}):", failed.len());
        for item in &failed {
            println!(
                "  {} {} created {} retries {}",
                item.id,
                item.kind,
                item.created_at.format("%Y-%m-%d %H:%M"),
                item.retry_count
            );
        }
    }
    Ok(())
}

fn retry() -> Result<()> {
    let mut queue = SyncQueue::open_default()?;
    let moved = queue.retry_failed();
    if moved == 0 {
        println!("No failed items to retry.");
    } else {
        println!("Requeued {moved} item(s). Run 'wordhoard-cli sync now' to push them.");
    }
    Ok(())
}

/// Push queued mutations after a command, when an endpoint is configured.
///
/// A sync failure never fails the command that queued the change; the queue
/// holds the mutation for the next attempt.
pub(crate) async fn flush_queue(settings: &Settings) {
    let Some(api_url) = settings.api_url.as_deref() else {
        return;
    };
    let queue = match SyncQueue::open_default() {
        Ok(queue) => queue,
        Err(e) => {
            eprintln!("warning: sync skipped: {e}");
            return;
        }
    };

    let orchestrator = SyncOrchestrator::new(queue, Arc::new(HttpBackend::new(api_url)));
    if let Some(report) = orchestrator.sync_now().await {
        if report.synced > 0 {
            println!("Synced {} change(s).", report.synced);
        }
        if report.failed > 0 {
            println!("{} change(s) will retry on the next sync.", report.failed);
        }
        if report.quarantined > 0 {
            println!(
                "{} change(s) set aside after repeated failures; run 'wordhoard-cli sync retry'.",
                report.quarantined
            );
        }
    }
}
