use std::cmp::Ordering;

use tracing::debug;

use crate::engine::types::{
    EvaluationResult, HintSet, NoUsableRule, Rule, SelectionNote, UsageSnapshot,
};

/// Marginal economics of one region-eligible rule for one purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub rule: &'a Rule,
    pub catalog_index: usize,
    /// Capacity before this purchase; may be negative when usage overran a cap.
    pub remain_reward: f64,
    pub remain_spend: f64,
    pub eff_spend: f64,
    pub est_reward: f64,
    pub hinted: bool,
    pub eligible: bool,
    pub exhausted: bool,
}

impl<'a> Candidate<'a> {
    pub fn evaluate(
        rule: &'a Rule,
        catalog_index: usize,
        amount: f64,
        hints: &HintSet,
        usage: &UsageSnapshot,
    ) -> Self {
        let used = usage.usage_for(&rule.rule_id);
        let remain_reward = rule.cap_reward - used.used_reward;
        let remain_spend = rule.cap_spend - used.used_spend;
        let hinted = hints.contains(&rule.rule_id);
        let eligible = !rule.requires_map || hinted;

        let (eff_spend, est_reward) = if eligible {
            rule.marginal_value(amount, &used)
        } else {
            (0.0, 0.0)
        };

        let exhausted = eff_spend <= 0.0 || remain_reward <= 0.0 || est_reward <= 0.0;

        Self {
            rule,
            catalog_index,
            remain_reward,
            remain_spend,
            eff_spend,
            est_reward,
            hinted,
            eligible,
            exhausted,
        }
    }

    pub fn rank_key(&self) -> RankKey {
        RankKey {
            eligible: self.eligible,
            usable: !self.exhausted,
            hinted: self.hinted,
            priority: self.rule.priority,
            est_reward: self.est_reward,
        }
    }

    /// Ranking as if caps and channel gating did not exist.
    fn ideal_key(&self) -> RankKey {
        RankKey {
            eligible: true,
            usable: true,
            ..self.rank_key()
        }
    }
}

/// Lexicographic ranking key; a greater key is a better candidate.
///
/// Fields compare in declaration order, so eligibility dominates exhaustion,
/// which dominates the hint, which dominates priority and then reward.
#[derive(Debug, Clone, Copy)]
pub struct RankKey {
    pub eligible: bool,
    pub usable: bool,
    pub hinted: bool,
    pub priority: i64,
    pub est_reward: f64,
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.eligible
            .cmp(&other.eligible)
            .then(self.usable.cmp(&other.usable))
            .then(self.hinted.cmp(&other.hinted))
            .then(self.priority.cmp(&other.priority))
            .then(self.est_reward.total_cmp(&other.est_reward))
    }
}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

/// Filters the catalog by region and returns candidates best-first.
///
/// Equal keys keep catalog order.
pub fn rank_candidates<'a>(
    rules: &'a [Rule],
    region: &str,
    amount: f64,
    hints: &HintSet,
    usage: &UsageSnapshot,
) -> Result<Vec<Candidate<'a>>, NoUsableRule> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(NoUsableRule::DegenerateAmount { amount });
    }
    if rules.is_empty() {
        return Err(NoUsableRule::EmptyCatalog);
    }

    let mut ranking = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.applies_to_region(region))
        .map(|(index, rule)| Candidate::evaluate(rule, index, amount, hints, usage))
        .collect::<Vec<Candidate<'a>>>();

    if ranking.is_empty() {
        return Err(NoUsableRule::NoRegionMatch {
            region: region.to_string(),
        });
    }

    ranking.sort_by(|left, right| right.rank_key().cmp(&left.rank_key()));
    Ok(ranking)
}

/// Picks the winner from a best-first ranking and explains any fallback.
///
/// Returns `None` only for an empty ranking.
pub fn choose<'a>(ranking: &[Candidate<'a>]) -> Option<EvaluationResult<'a>> {
    let chosen = ranking.first()?;
    let ideal = ideal_candidate(ranking)?;

    let note = if !chosen.exhausted && ideal.catalog_index != chosen.catalog_index {
        Some(SelectionNote::Fallback {
            skipped_rule_id: ideal.rule.rule_id.clone(),
            skipped_card: ideal.rule.card.clone(),
            skipped_rule_name: ideal.rule.rule_name.clone(),
            needs_keyword: !ideal.eligible,
        })
    } else if !ranking.iter().any(|candidate| candidate.hinted)
        && ranking.iter().any(|candidate| candidate.rule.requires_map)
    {
        Some(SelectionNote::NoChannelMatched)
    } else if chosen.exhausted {
        Some(SelectionNote::AllExhausted)
    } else {
        None
    };

    debug!(
        rule_id = %chosen.rule.rule_id,
        est_reward = chosen.est_reward,
        eff_spend = chosen.eff_spend,
        candidates = ranking.len(),
        note = note.as_ref().map(SelectionNote::code),
        "selected reward rule"
    );

    Some(EvaluationResult {
        rule: chosen.rule,
        est_reward: chosen.est_reward,
        eff_spend: chosen.eff_spend,
        remain_reward: (chosen.remain_reward - chosen.est_reward).max(0.0),
        remain_spend: (chosen.remain_spend - chosen.eff_spend).max(0.0),
        exhausted: chosen.exhausted,
        note,
    })
}

/// Recommends one rule for the whole purchase amount.
///
/// Pure: the catalog and usage snapshot are only read.
pub fn select<'a>(
    rules: &'a [Rule],
    region: &str,
    amount: f64,
    hints: &HintSet,
    usage: &UsageSnapshot,
) -> Result<EvaluationResult<'a>, NoUsableRule> {
    let ranking = rank_candidates(rules, region, amount, hints, usage)?;
    choose(&ranking).ok_or_else(|| NoUsableRule::NoRegionMatch {
        region: region.to_string(),
    })
}

fn ideal_candidate<'r, 'a>(ranking: &'r [Candidate<'a>]) -> Option<&'r Candidate<'a>> {
    let mut best: Option<&Candidate<'a>> = None;
    for candidate in ranking {
        best = match best {
            None => Some(candidate),
            Some(current) => {
                let order = candidate
                    .ideal_key()
                    .cmp(&current.ideal_key())
                    .then(current.catalog_index.cmp(&candidate.catalog_index));
                if order == Ordering::Greater {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }
    best
}
