use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod device;

#[derive(Parser)]
#[command(name = "dawnchorus", version, about = "Dawn Chorus alarm CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the notification events for an alarm without delivering them
    Preview(commands::alarm::PreviewArgs),
    /// Schedule an alarm's chorus window on a platform
    Schedule(commands::alarm::PlatformArgs),
    /// Snooze an alarm: new window after the configured snooze interval
    Snooze(commands::alarm::PlatformArgs),
    /// Cancel an alarm's pending notifications
    Clear(commands::alarm::PlatformArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Preview(args) => commands::alarm::preview(args),
        Commands::Schedule(args) => commands::alarm::schedule(args),
        Commands::Snooze(args) => commands::alarm::snooze(args),
        Commands::Clear(args) => commands::alarm::clear(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
