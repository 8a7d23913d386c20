use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "wordhoard-cli", version, about = "WordHoard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review due words and grade recall
    Review {
        #[command(subcommand)]
        action: commands::review::ReviewAction,
    },
    /// Lesson completion
    Lesson {
        #[command(subcommand)]
        action: commands::lesson::LessonAction,
    },
    /// Daily streak and freezes
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Settings management
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Sync queue control
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Review { action } => commands::review::run(action).await,
        Commands::Lesson { action } => commands::lesson::run(action).await,
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Settings { action } => commands::settings::run(action).await,
        Commands::Sync { action } => commands::sync::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
