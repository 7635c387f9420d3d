use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// One reward formula tied to a card or channel.
///
/// Numeric fields that are missing or `null` in configuration deserialize as
/// zero, which the selection formulas treat as "grants nothing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub card: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub rule_name: String,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub regions: Vec<String>,
    #[serde(default, deserialize_with = "bool_or_false")]
    pub requires_map: bool,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub rate: f64,
    #[serde(default, deserialize_with = "integer_or_zero")]
    pub priority: i64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub cap_spend: f64,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub cap_reward: f64,
}

impl Rule {
    /// An empty region on either side means no restriction.
    pub fn applies_to_region(&self, region: &str) -> bool {
        region.is_empty()
            || self.regions.is_empty()
            || self.regions.iter().any(|value| value == region)
    }

    /// Eligible spend and reward for `amount` on top of `used`, each bounded
    /// by what is left under the caps and never negative.
    pub fn marginal_value(&self, amount: f64, used: &UsageRecord) -> (f64, f64) {
        let eff_spend = amount.min(self.cap_spend - used.used_spend).max(0.0);
        let est_reward = (eff_spend * self.rate)
            .min(self.cap_reward - used.used_reward)
            .max(0.0);
        (eff_spend, est_reward)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub used_spend: f64,
    pub used_reward: f64,
}

/// Month-to-date usage keyed by `rule_id`. A missing rule reads as zero usage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSnapshot {
    records: BTreeMap<String, UsageRecord>,
}

impl UsageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rule_id: &str, record: UsageRecord) {
        self.records.insert(rule_id.to_string(), record);
    }

    pub fn usage_for(&self, rule_id: &str) -> UsageRecord {
        self.records.get(rule_id).copied().unwrap_or_default()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, UsageRecord)> for UsageSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, UsageRecord)>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HintSet {
    pub rule_ids: BTreeSet<String>,
    pub default_region: Option<String>,
}

impl HintSet {
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rule_ids.contains(rule_id)
    }

    pub fn is_empty(&self) -> bool {
        self.rule_ids.is_empty() && self.default_region.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionNote {
    /// The highest-ranked rule, judged without caps or channel gating, was
    /// exhausted or ineligible and a usable rule was returned instead.
    Fallback {
        skipped_rule_id: String,
        skipped_card: String,
        skipped_rule_name: String,
        /// The skipped rule is a channel rule and no merchant keyword named it.
        needs_keyword: bool,
    },
    NoChannelMatched,
    AllExhausted,
}

impl SelectionNote {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Fallback { .. } => "fallback",
            Self::NoChannelMatched => "no_channel_matched",
            Self::AllExhausted => "all_exhausted",
        }
    }
}

impl fmt::Display for SelectionNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback {
                skipped_card,
                skipped_rule_name,
                needs_keyword,
                ..
            } => {
                let reason = if *needs_keyword {
                    "needs a matching merchant keyword"
                } else {
                    "is capped out this month"
                };
                write!(
                    f,
                    "The top-ranked rule `{skipped_card} / {skipped_rule_name}` {reason}; recommending the next best rule instead."
                )
            }
            Self::NoChannelMatched => f.write_str(
                "No specific channel matched this merchant; using a general-purpose rule.",
            ),
            Self::AllExhausted => f.write_str(
                "Every eligible rule is capped out this month; showing the highest-ranked rule, whose reward may be zero.",
            ),
        }
    }
}

/// Winning rule plus the economics of applying this purchase to it.
///
/// `remain_reward` and `remain_spend` are projections after this purchase and
/// are never negative. Nothing is committed to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult<'a> {
    pub rule: &'a Rule,
    pub est_reward: f64,
    pub eff_spend: f64,
    pub remain_reward: f64,
    pub remain_spend: f64,
    pub exhausted: bool,
    pub note: Option<SelectionNote>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoUsableRule {
    #[error("the rule catalog is empty")]
    EmptyCatalog,
    #[error("no rule applies to region `{region}`")]
    NoRegionMatch { region: String },
    #[error("amount {amount} is not a positive number")]
    DegenerateAmount { amount: f64 },
}

impl NoUsableRule {
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyCatalog => "empty_catalog",
            Self::NoRegionMatch { .. } => "no_region_match",
            Self::DegenerateAmount { .. } => "degenerate_amount",
        }
    }
}

pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn bool_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn integer_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}
