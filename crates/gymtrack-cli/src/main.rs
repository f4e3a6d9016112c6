use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gymtrack", version, about = "gymtrack CLI")]
struct Cli {
    /// User document (defaults to storage.document_path or ~/.config/gymtrack/user.json)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's dashboard
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Step counting
    Steps {
        #[command(subcommand)]
        action: commands::steps::StepsAction,
    },
    /// Gym entries and badges
    Gym {
        #[command(subcommand)]
        action: commands::gym::GymAction,
    },
    /// Weight progress and goals
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Body mass index
    Bmi {
        /// Weight (kg)
        weight: String,
        /// Height (cm)
        height: String,
    },
    /// Membership days
    Membership {
        #[command(subcommand)]
        action: commands::membership::MembershipAction,
    },
    /// Workout plan and timer
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Keep refreshing the dashboard and rolling over days
    Watch {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long)]
        seconds: Option<u64>,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("GYMTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let file = cli.file;
    let result = match cli.command {
        Commands::Status { json } => commands::status::run(file, json),
        Commands::Steps { action } => commands::steps::run(file, action),
        Commands::Gym { action } => commands::gym::run(file, action),
        Commands::Progress { action } => commands::progress::run(file, action),
        Commands::Bmi { weight, height } => commands::status::bmi(&weight, &height),
        Commands::Membership { action } => commands::membership::run(file, action),
        Commands::Workout { action } => commands::workout::run(file, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch { seconds } => commands::watch::run(file, seconds),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
