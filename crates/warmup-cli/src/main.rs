use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "warmup-cli", version, about = "Warmup for Runners CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse warmup routines
    Routine {
        #[command(subcommand)]
        action: commands::routine::RoutineAction,
    },
    /// Run a warmup
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Read the widget status file
    Widget {
        #[command(subcommand)]
        action: commands::widget::WidgetAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Handle a warmupapp:// deep link
    Open(commands::open::OpenArgs),
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env("WARMUP_LOG")
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Routine { action } => commands::routine::run(action),
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Widget { action } => commands::widget::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Open(args) => commands::open::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
