use crate::ClientResult;
use crate::commands::common::{open_ledger, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::HistoryData;
use crate::ledger::history::month_history;
use crate::ledger::month::resolve_month;

#[derive(Debug, Default)]
pub struct HistoryOptions<'a> {
    /// `YYYY-MM`; the current month when `None`.
    pub month: Option<&'a str>,
    pub config: ConfigOverrides<'a>,
}

pub fn run(month: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(HistoryOptions {
        month,
        ..HistoryOptions::default()
    })
}

pub fn run_with_options(options: HistoryOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let month = resolve_month(options.month, "history")?;
    let config = resolve_config(&options.config)?;
    let ledger = open_ledger(&config)?;
    let history = month_history(&ledger.connection, &ledger.setup.db_path, &month)?;

    let data = HistoryData {
        month: history.month,
        transaction_count: history.rows.len(),
        total_amount: history.total_amount,
        total_reward: history.total_reward,
        rows: history.rows,
    };
    success("history", data)
}
