pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "hembi",
    about = "Hembi operator CLI",
    long_about = "Exercise the dialogue engine offline and inspect effective configuration.",
    after_help = "Examples:\n  hembi chat\n  hembi chat --party 5215550001\n  hembi config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with an in-process dialogue engine from the terminal")]
    Chat {
        #[arg(long, default_value = "local-operator", help = "Simulated party id")]
        party: String,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { party } => commands::chat::run(&party),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
