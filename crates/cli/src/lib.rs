pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "stockwise",
    about = "Stockwise business-intelligence chat CLI",
    long_about = "Query inventory, sales, finance, vendor, and ticket data in natural \
                  language, plus operator commands for migrations, seeding, and diagnostics.",
    after_help = "Examples:\n  stockwise ask \"What items are low in stock?\"\n  stockwise chat\n  stockwise stats\n  stockwise doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Answer a single natural-language query and exit")]
    Ask {
        #[arg(help = "The question to answer")]
        query: String,
        #[arg(long, help = "Session id for conversation continuity")]
        session: Option<String>,
    },
    #[command(about = "Interactive console with rolling conversation context")]
    Chat {
        #[arg(long, help = "Session id for conversation continuity")]
        session: Option<String>,
    },
    #[command(about = "One-shot summary of inventory, sales, finance, and tickets")]
    Stats,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo dataset and verify the seed contract")]
    Seed,
    #[command(about = "Validate config, database connectivity, and advisory readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with secrets redacted")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { query, session } => commands::ask::run(&query, session.as_deref()),
        Command::Chat { session } => commands::chat::run(session.as_deref()),
        Command::Stats => commands::stats::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    ExitCode::from(result.exit_code)
}
