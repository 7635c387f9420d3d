use crate::ClientResult;
use crate::commands::common::{load, open_ledger, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{RecordData, RuleRef, UsageTotals};
use crate::ledger::recommendations::record;

#[derive(Debug, Default)]
pub struct RecordOptions<'a> {
    /// Recommendation to commit; the newest pending one when `None`.
    pub rec_id: Option<&'a str>,
    pub config: ConfigOverrides<'a>,
}

pub fn run(rec_id: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(RecordOptions {
        rec_id,
        ..RecordOptions::default()
    })
}

pub fn run_with_options(options: RecordOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let config = resolve_config(&options.config)?;
    let loaded = load(&config)?;
    let mut ledger = open_ledger(&config)?;
    let rec_id = options.rec_id.map(str::trim).filter(|value| !value.is_empty());
    let purchase = record(
        &mut ledger.connection,
        &ledger.setup.db_path,
        rec_id,
        &loaded.catalog.rules,
    )?;

    let stored = purchase.recommendation;
    let data = RecordData {
        rec_id: stored.rec_id,
        txn_id: purchase.txn_id,
        month: stored.month,
        posted_on: stored.posted_on,
        merchant: stored.merchant,
        amount: stored.amount,
        rule: RuleRef {
            rule_id: stored.rule_id,
            card: stored.card,
            rule_name: stored.rule_name,
        },
        est_reward: purchase.reward,
        quoted_reward: stored.est_reward,
        recorded_at: purchase.recorded_at,
        usage_after: UsageTotals {
            used_spend: purchase.usage_after.used_spend,
            used_reward: purchase.usage_after.used_reward,
        },
    };
    success("record", data)
}
