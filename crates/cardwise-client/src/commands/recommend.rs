use crate::commands::common::{load, open_ledger, resolve_config, rule_ref};
use crate::config::{ClientConfig, ConfigOverrides};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    NextStep, NoteData, RankedCandidate, RecommendData, RecommendationRow,
};
use crate::engine::{HintSet, NoUsableRule, choose, rank_candidates};
use crate::ledger::month::{format_iso_date, month_key, parse_purchase_date, today};
use crate::ledger::recommendations::{NewRecommendation, save_pending};
use crate::ledger::round_currency;
use crate::ledger::usage::load_usage;
use crate::{ClientError, ClientResult};

const COMMAND: &str = "recommend";

#[derive(Debug, Default)]
pub struct RecommendOptions<'a> {
    pub merchant: &'a str,
    pub amount: f64,
    pub region: Option<&'a str>,
    /// Purchase date as `YYYY-MM-DD`; defaults to today.
    pub date: Option<&'a str>,
    pub config: ConfigOverrides<'a>,
}

pub fn run(merchant: &str, amount: f64, region: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(RecommendOptions {
        merchant,
        amount,
        region,
        ..RecommendOptions::default()
    })
}

/// Picks the best rule for one purchase and stores it as a pending
/// recommendation. Usage is not changed until the purchase is recorded.
pub fn run_with_options(options: RecommendOptions<'_>) -> ClientResult<SuccessEnvelope> {
    if !options.amount.is_finite() || options.amount <= 0.0 {
        return Err(ClientError::invalid_argument_for_command(
            "Invalid `amount`: use a positive number such as 42.50.",
            Some(COMMAND),
        ));
    }
    let posted_on = match options.date {
        Some(value) => parse_purchase_date(value, COMMAND)?,
        None => today(),
    };
    let month = month_key(&posted_on);
    let merchant = options.merchant.trim();

    let config = resolve_config(&options.config)?;
    let loaded = load(&config)?;
    let hints = loaded.catalog.hint_resolver().resolve(merchant);
    let (region, region_source) = resolve_region(options.region, &hints, &config);

    let ledger = open_ledger(&config)?;
    let usage = load_usage(&ledger.connection, &ledger.setup.db_path, &month)?;

    let ranking = rank_candidates(
        &loaded.catalog.rules,
        region.as_deref().unwrap_or_default(),
        options.amount,
        &hints,
        &usage,
    )
    .map_err(|reason| ClientError::no_usable_rule(&reason))?;
    let result = choose(&ranking).ok_or_else(|| {
        ClientError::no_usable_rule(&NoUsableRule::NoRegionMatch {
            region: region.clone().unwrap_or_default(),
        })
    })?;

    let note_message = result.note.as_ref().map(ToString::to_string);
    let posted_on = format_iso_date(&posted_on);
    let rec_id = save_pending(
        &ledger.connection,
        &ledger.setup.db_path,
        &NewRecommendation {
            month: &month,
            posted_on: &posted_on,
            merchant,
            region: region.as_deref(),
            amount: options.amount,
            rule_id: &result.rule.rule_id,
            card: &result.rule.card,
            rule_name: &result.rule.rule_name,
            est_reward: result.est_reward,
            eff_spend: result.eff_spend,
            remain_reward: result.remain_reward,
            remain_spend: result.remain_spend,
            note_code: result.note.as_ref().map(|note| note.code()),
            note: note_message.as_deref(),
        },
    )?;

    let ranking = ranking
        .iter()
        .enumerate()
        .map(|(index, candidate)| RankedCandidate {
            rank: index + 1,
            rule_id: candidate.rule.rule_id.clone(),
            card: candidate.rule.card.clone(),
            rule_name: candidate.rule.rule_name.clone(),
            priority: candidate.rule.priority,
            hinted: candidate.hinted,
            eligible: candidate.eligible,
            exhausted: candidate.exhausted,
            est_reward: round_currency(candidate.est_reward),
            eff_spend: round_currency(candidate.eff_spend),
        })
        .collect();

    let data = RecommendData {
        next_step: NextStep {
            label: "Record this purchase once it is made".to_string(),
            command: format!("cardwise record {rec_id}"),
        },
        rec_id,
        month,
        posted_on,
        merchant: merchant.to_string(),
        amount: round_currency(options.amount),
        region,
        region_source: region_source.to_string(),
        recommendation: RecommendationRow {
            rule: rule_ref(result.rule),
            est_reward: round_currency(result.est_reward),
            eff_spend: round_currency(result.eff_spend),
            remain_reward: round_currency(result.remain_reward),
            remain_spend: round_currency(result.remain_spend),
            exhausted: result.exhausted,
        },
        note: result.note.as_ref().map(|note| NoteData {
            code: note.code().to_string(),
            message: note.to_string(),
        }),
        hinted_rule_ids: hints.rule_ids.iter().cloned().collect(),
        ranking,
        warnings: loaded.warnings,
    };
    success(COMMAND, data)
}

/// Explicit region, then the merchant hint's region, then the configured
/// fallback. `None` means every rule is considered.
fn resolve_region(
    explicit: Option<&str>,
    hints: &HintSet,
    config: &ClientConfig,
) -> (Option<String>, &'static str) {
    if let Some(region) = explicit.map(str::trim).filter(|value| !value.is_empty()) {
        return (Some(region.to_string()), "explicit");
    }
    if let Some(region) = &hints.default_region {
        return (Some(region.clone()), "hint");
    }
    if let Some(region) = &config.default_region {
        return (Some(region.clone()), "default");
    }
    (None, "none")
}
