pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "intent-relay",
    about = "Intent relay operator CLI",
    long_about = "Inspect relay configuration, check provider readiness, and run one-off intent detections.",
    after_help = "Examples:\n  intent-relay doctor --json\n  intent-relay config\n  intent-relay detect --message \"two kilos of apples\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, credential readiness, and the default session id")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Send one message to the NLU provider and print the flattened detection")]
    Detect {
        #[arg(long, short, help = "Free text to classify")]
        message: String,
        #[arg(long, help = "Conversational session id (defaults to nlu.default_session_id)")]
        session_id: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Detect { message, session_id } => {
            commands::detect::run(&message, session_id.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
