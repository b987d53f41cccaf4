use std::process::ExitCode;

fn main() -> ExitCode {
    intent_relay_cli::run()
}
