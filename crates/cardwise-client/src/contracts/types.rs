use serde::Serialize;

use crate::catalog::CatalogWarning;
use crate::ledger::history::TransactionRow;

#[derive(Debug, Clone, Serialize)]
pub struct NextStep {
    pub label: String,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteData {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleRef {
    pub rule_id: String,
    pub card: String,
    pub rule_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationRow {
    pub rule: RuleRef,
    pub est_reward: f64,
    pub eff_spend: f64,
    pub remain_reward: f64,
    pub remain_spend: f64,
    pub exhausted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub rule_id: String,
    pub card: String,
    pub rule_name: String,
    pub priority: i64,
    pub hinted: bool,
    pub eligible: bool,
    pub exhausted: bool,
    pub est_reward: f64,
    pub eff_spend: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HintData {
    pub merchant: String,
    pub normalized: String,
    pub rule_ids: Vec<String>,
    pub default_region: Option<String>,
    pub keyword_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendData {
    pub rec_id: String,
    pub month: String,
    pub posted_on: String,
    pub merchant: String,
    pub amount: f64,
    pub region: Option<String>,
    /// `explicit`, `hint`, `default` or `none`.
    pub region_source: String,
    pub recommendation: RecommendationRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<NoteData>,
    pub hinted_rule_ids: Vec<String>,
    pub ranking: Vec<RankedCandidate>,
    pub warnings: Vec<CatalogWarning>,
    pub next_step: NextStep,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageTotals {
    pub used_spend: f64,
    pub used_reward: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordData {
    pub rec_id: String,
    pub txn_id: String,
    pub month: String,
    pub posted_on: String,
    pub merchant: String,
    pub amount: f64,
    pub rule: RuleRef,
    /// Reward counted toward the month, never more than the cap still allowed.
    pub est_reward: f64,
    /// Reward shown when the recommendation was made.
    pub quoted_reward: f64,
    pub recorded_at: String,
    pub usage_after: UsageTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryData {
    pub month: String,
    pub transaction_count: usize,
    pub total_amount: f64,
    pub total_reward: f64,
    pub rows: Vec<TransactionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageRow {
    pub rule_id: String,
    pub card: String,
    pub rule_name: String,
    pub cap_spend: f64,
    pub cap_reward: f64,
    pub used_spend: f64,
    pub used_reward: f64,
    pub remain_spend: f64,
    pub remain_reward: f64,
    pub exhausted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageData {
    pub month: String,
    pub rows: Vec<UsageRow>,
    /// Ledger usage for rule ids no longer in the catalog.
    pub orphaned_rule_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetData {
    pub month: String,
    pub usage_rows_deleted: i64,
    pub transactions_deleted: i64,
    pub recommendations_deleted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RulesData {
    pub rules_path: String,
    pub merchant_map_path: String,
    pub rule_count: usize,
    pub keyword_count: usize,
    pub rules: Vec<crate::engine::Rule>,
    pub warnings: Vec<CatalogWarning>,
}
