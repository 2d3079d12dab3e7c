pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "salit",
    about = "Salit operator CLI",
    long_about = "Operate salit migrations, analytics runs, recommendation queries, and readiness checks.",
    after_help = "Examples:\n  salit migrate\n  salit analyze --user user-1\n  salit recommend פסטה\n  salit doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Run the purchase analytics batch for one user")]
    Analyze {
        #[arg(long, help = "User identity to analyze")]
        user: String,
    },
    #[command(about = "Query companion recommendations for an item")]
    Recommend {
        #[arg(help = "Anchor item name")]
        item: String,
    },
    #[command(about = "Validate config, database connectivity, and recommender state readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Analyze { user } => commands::analyze::run(&user),
        Command::Recommend { item } => commands::recommend::run(&item),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
