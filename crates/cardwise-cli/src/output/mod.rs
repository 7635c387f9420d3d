mod catalog_text;
mod error_text;
mod format;
mod json;
mod ledger_text;
mod mode;
mod recommend_text;

use std::io;

use cardwise_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command, mode_from_raw_args};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "recommend" => recommend_text::render_recommend(&success.data),
        "record" => ledger_text::render_record(&success.data),
        "history" => ledger_text::render_history(&success.data),
        "usage" => ledger_text::render_usage(&success.data),
        "reset" => ledger_text::render_reset(&success.data),
        "rules" => catalog_text::render_rules(&success.data),
        "hint" => catalog_text::render_hint(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
