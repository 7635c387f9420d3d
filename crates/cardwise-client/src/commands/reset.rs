use crate::ClientResult;
use crate::commands::common::{open_ledger, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::ResetData;
use crate::ledger::month::parse_month;
use crate::ledger::reset::reset_month;

#[derive(Debug, Default)]
pub struct ResetOptions<'a> {
    pub month: &'a str,
    pub config: ConfigOverrides<'a>,
}

pub fn run(month: &str) -> ClientResult<SuccessEnvelope> {
    run_with_options(ResetOptions {
        month,
        ..ResetOptions::default()
    })
}

/// Starts a month over. The month is always explicit so a reset never lands
/// on an unintended period.
pub fn run_with_options(options: ResetOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let month = parse_month(options.month, "reset")?;
    let config = resolve_config(&options.config)?;
    let mut ledger = open_ledger(&config)?;
    let counts = reset_month(&mut ledger.connection, &ledger.setup.db_path, &month)?;

    success(
        "reset",
        ResetData {
            month,
            usage_rows_deleted: counts.usage_rows,
            transactions_deleted: counts.transactions,
            recommendations_deleted: counts.recommendations,
        },
    )
}
