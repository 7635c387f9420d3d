mod cli;
mod dispatch;
mod output;
mod stdout_io;
mod telemetry;

use std::process::ExitCode;

use cardwise_client::ClientError;
use clap::{Parser, error::ErrorKind};
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "cardwise - pick the best card reward rule for a purchase

Usage:
  cardwise <command>

Start here:
  cardwise rules
  cardwise recommend \"Blue Bottle Coffee\" 6.50
  cardwise --help
";

const TOP_LEVEL_HELP: &str = "cardwise - pick the best card reward rule for a purchase

USAGE: cardwise <command>

Before a purchase:
  cardwise recommend <merchant> <amount>                  Best rule for this purchase, with ranking
  cardwise recommend <merchant> <amount> --region foreign Only rules valid in that region
  cardwise hint <merchant>                                Which merchant keywords match

After the purchase:
  cardwise record                                         Count the newest recommendation
  cardwise record <rec-id>                                Count a specific recommendation

Monthly ledger:
  cardwise usage [--month YYYY-MM]                        Used and remaining caps per rule
  cardwise history [--month YYYY-MM]                      Recorded purchases
  cardwise reset --month YYYY-MM                          Clear one month and start over

Catalog:
  cardwise rules                                          Validate and list rules.json
  cardwise rules --help                                   File formats and search paths

Every command accepts --json, plus --rules <path> and --merchant-map <path>.
Set CARDWISE_HOME to move the ledger, CARDWISE_LOG=debug for diagnostics.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    if let Err(error) = telemetry::init() {
        eprintln!("warning: logging disabled: {error}");
    }

    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }

    let cli = match cli::Cli::try_parse() {
        Ok(value) => value,
        Err(err) => return handle_parse_error(&err, &raw_args),
    };
    let mode = output::mode_for_command(&cli.command);
    tracing::debug!(command = cli.command.name(), "dispatching");

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if error.is_internal() {
                tracing::error!(code = %error.code, "{}", error.message);
            }
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn handle_parse_error(err: &clap::Error, raw_args: &[String]) -> Result<ExitCode, ExitCode> {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let text = if is_top_level_help_request(raw_args) {
                TOP_LEVEL_HELP.to_string()
            } else {
                err.to_string()
            };
            if write_stdout_text(&text).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayVersion => {
            if write_stdout_text(&err.to_string()).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        kind => {
            let command_hint = if matches!(
                kind,
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::ArgumentConflict
            ) {
                command_path_from_args(raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error = parse_error_with_command_hint(&clean_message, command_hint);
            let mode = output::mode_from_raw_args(raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(ExitCode::from(1))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Drops clap's trailing Usage line and "For more information" hint.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

/// First positional argument, when it names a known subcommand.
fn command_path_from_args(raw_args: &[String]) -> Option<&'static str> {
    let mut args = raw_args.iter().skip(1).map(String::as_str);
    while let Some(value) = args.next() {
        if matches!(value, "--rules" | "--merchant-map") {
            args.next();
            continue;
        }
        if value.starts_with('-') {
            continue;
        }
        return match value {
            "recommend" => Some("recommend"),
            "record" => Some("record"),
            "history" => Some("history"),
            "usage" => Some("usage"),
            "reset" => Some("reset"),
            "rules" => Some("rules"),
            "hint" => Some("hint"),
            _ => None,
        };
    }
    None
}

fn parse_error_with_command_hint(clean_message: &str, command_hint: Option<&str>) -> ClientError {
    if command_hint == Some("reset") && clean_message.contains("--month") {
        return ClientError::invalid_argument_with_recovery(
            clean_message,
            vec![
                "Name the month to clear: `cardwise reset --month 2026-10`.".to_string(),
                "Run `cardwise usage --month <YYYY-MM>` first to see what will be removed."
                    .to_string(),
            ],
        );
    }

    if command_hint == Some("recommend") && clean_message.contains("amount") {
        return ClientError::invalid_argument_with_recovery(
            clean_message,
            vec![
                "Pass the purchase amount as a positive number: `cardwise recommend \"Cafe\" 4.50`."
                    .to_string(),
                "Quote merchant names that contain spaces.".to_string(),
            ],
        );
    }

    ClientError::invalid_argument_for_command(clean_message, command_hint)
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}
