use crate::ClientResult;
use crate::commands::common::{load, open_ledger, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{UsageData, UsageRow};
use crate::engine::{Rule, UsageRecord, UsageSnapshot};
use crate::ledger::month::resolve_month;
use crate::ledger::round_currency;
use crate::ledger::usage::load_usage;

#[derive(Debug, Default)]
pub struct UsageOptions<'a> {
    /// `YYYY-MM`; the current month when `None`.
    pub month: Option<&'a str>,
    pub config: ConfigOverrides<'a>,
}

pub fn run(month: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(UsageOptions {
        month,
        ..UsageOptions::default()
    })
}

pub fn run_with_options(options: UsageOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let month = resolve_month(options.month, "usage")?;
    let config = resolve_config(&options.config)?;
    let loaded = load(&config)?;
    let ledger = open_ledger(&config)?;
    let usage = load_usage(&ledger.connection, &ledger.setup.db_path, &month)?;

    let data = usage_report(&month, &loaded.catalog.rules, &usage);
    success("usage", data)
}

/// One row per catalog rule in catalog order. Remaining values never go
/// below zero even when recorded usage overran a cap.
pub(crate) fn usage_report(month: &str, rules: &[Rule], usage: &UsageSnapshot) -> UsageData {
    let rows = rules
        .iter()
        .map(|rule| {
            let UsageRecord {
                used_spend,
                used_reward,
            } = usage.usage_for(&rule.rule_id);
            let remain_spend = round_currency((rule.cap_spend - used_spend).max(0.0));
            let remain_reward = round_currency((rule.cap_reward - used_reward).max(0.0));
            UsageRow {
                rule_id: rule.rule_id.clone(),
                card: rule.card.clone(),
                rule_name: rule.rule_name.clone(),
                cap_spend: rule.cap_spend,
                cap_reward: rule.cap_reward,
                used_spend,
                used_reward,
                remain_spend,
                remain_reward,
                exhausted: remain_spend <= 0.0 || remain_reward <= 0.0,
            }
        })
        .collect();

    let orphaned_rule_ids = usage
        .rule_ids()
        .filter(|rule_id| !rules.iter().any(|rule| rule.rule_id == *rule_id))
        .map(str::to_string)
        .collect();

    UsageData {
        month: month.to_string(),
        rows,
        orphaned_rule_ids,
    }
}
