use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "knockwood-cli", version, about = "Knockwood CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a ritual completion
    Touch {
        /// Ritual id (see `rituals list`)
        ritual_id: String,
        /// Mood rating 1-5
        #[arg(long)]
        mood: Option<u8>,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// Progress summary
    Status,
    /// Daily challenges
    Challenges {
        #[command(subcommand)]
        action: commands::challenges::ChallengesAction,
    },
    /// Achievements
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// Seasonal events
    Events {
        #[command(subcommand)]
        action: commands::events::EventsAction,
    },
    /// Mood analytics
    Mood {
        #[command(subcommand)]
        action: commands::mood::MoodAction,
    },
    /// Ritual catalog management
    Rituals {
        #[command(subcommand)]
        action: commands::rituals::RitualsAction,
    },
    /// Share progress
    Share {
        #[command(subcommand)]
        action: commands::share::ShareAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Touch {
            ritual_id,
            mood,
            note,
        } => commands::touch::run(&ritual_id, mood, note),
        Commands::Status => commands::status::run(),
        Commands::Challenges { action } => commands::challenges::run(action),
        Commands::Achievements { action } => commands::achievements::run(action),
        Commands::Events { action } => commands::events::run(action),
        Commands::Mood { action } => commands::mood::run(action),
        Commands::Rituals { action } => commands::rituals::run(action),
        Commands::Share { action } => commands::share::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
