use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use plantcare::cli;

/// plantcare - watering schedules for house plants
#[derive(Parser)]
#[command(name = "plantcare")]
#[command(about = "Watering calendar and reminders for your plants", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month of watering days
    Calendar {
        /// JSON file with the plant records
        #[arg(long)]
        plants: PathBuf,

        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Month number 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u8>,

        /// Day to treat as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
    /// List overdue plants, plants due today and plants due soon
    Tasks {
        /// JSON file with the plant records
        #[arg(long)]
        plants: PathBuf,

        /// Day to treat as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,

        /// Days ahead counted as due soon (overrides config file)
        #[arg(long)]
        window: Option<u32>,
    },
    /// Record a watering and rewrite the plant file
    Water {
        /// JSON file with the plant records
        #[arg(long)]
        plants: PathBuf,

        /// Plant to mark as watered
        #[arg(long)]
        id: String,

        /// Day of the watering, defaults to today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = plantcare::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize observability (tracing + logging)
    plantcare::observability::init_observability(
        "plantcare",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Calendar {
            plants,
            year,
            month,
            today,
        } => cli::calendar::show(config, &plants, year, month, today),
        Commands::Tasks {
            plants,
            today,
            window,
        } => cli::tasks::list(config, &plants, today, window),
        Commands::Water { plants, id, date } => cli::water::run(config, &plants, &id, date),
    }
}
