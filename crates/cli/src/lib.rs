pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "homerent",
    about = "HomeRent operator CLI",
    long_about = "Operate the HomeRent catalog database, inspect configuration, and price rentals offline.",
    after_help = "Examples:\n  homerent doctor --json\n  homerent seed\n  homerent recommend --budget 50\n  homerent quote --price 15 --days 2"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog (idempotent)")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, database connectivity, and catalog readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Rank available catalog appliances against a rental budget")]
    Recommend {
        #[arg(long, help = "Budget per rental day, e.g. 50")]
        budget: String,
        #[arg(long, help = "Maximum number of recommendations (defaults to catalog config)")]
        limit: Option<usize>,
    },
    #[command(about = "Compute rental totals including the insurance deposit")]
    Quote {
        #[arg(long, help = "Price per rental day")]
        price: String,
        #[arg(long, default_value = "1", help = "Rental length in days")]
        days: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Recommend { budget, limit } => commands::recommend::run(&budget, limit),
        Command::Quote { price, days } => commands::quote::run(&price, &days),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
