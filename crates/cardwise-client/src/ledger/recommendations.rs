use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::{info, warn};
use ulid::Ulid;

use crate::engine::{Rule, UsageRecord};
use crate::ledger::usage::{add_usage, load_usage};
use crate::ledger::{now_timestamp, round_currency};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

/// A recommendation about to be persisted as `pending`.
#[derive(Debug, Clone)]
pub struct NewRecommendation<'a> {
    pub month: &'a str,
    pub posted_on: &'a str,
    pub merchant: &'a str,
    pub region: Option<&'a str>,
    pub amount: f64,
    pub rule_id: &'a str,
    pub card: &'a str,
    pub rule_name: &'a str,
    pub est_reward: f64,
    pub eff_spend: f64,
    pub remain_reward: f64,
    pub remain_spend: f64,
    pub note_code: Option<&'a str>,
    pub note: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecommendation {
    pub rec_id: String,
    pub status: String,
    pub created_at: String,
    pub month: String,
    pub posted_on: String,
    pub merchant: String,
    pub region: Option<String>,
    pub amount: f64,
    pub rule_id: String,
    pub card: String,
    pub rule_name: String,
    pub est_reward: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPurchase {
    pub txn_id: String,
    pub recommendation: StoredRecommendation,
    /// Reward actually counted; below `recommendation.est_reward` when other
    /// purchases used up the rule's cap after the recommendation was made.
    pub reward: f64,
    pub recorded_at: String,
    pub usage_after: UsageRecord,
}

pub fn save_pending(
    connection: &Connection,
    db_path: &Path,
    recommendation: &NewRecommendation<'_>,
) -> ClientResult<String> {
    let rec_id = format!("rec_{}", Ulid::new());
    connection
        .execute(
            "INSERT INTO internal_recommendations (
                rec_id, status, created_at, recorded_at, month, posted_on, merchant, region,
                amount, rule_id, card, rule_name, est_reward, eff_spend, remain_reward,
                remain_spend, note_code, note
             ) VALUES (
                ?1, 'pending', ?2, NULL, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
             )",
            params![
                &rec_id,
                now_timestamp(),
                recommendation.month,
                recommendation.posted_on,
                recommendation.merchant,
                recommendation.region,
                round_currency(recommendation.amount),
                recommendation.rule_id,
                recommendation.card,
                recommendation.rule_name,
                round_currency(recommendation.est_reward),
                round_currency(recommendation.eff_spend),
                round_currency(recommendation.remain_reward),
                round_currency(recommendation.remain_spend),
                recommendation.note_code,
                recommendation.note,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(rec_id)
}

/// Commits a pending recommendation as a purchase and adds it to the month's
/// usage. Without an id the newest pending recommendation is committed.
///
/// A recommendation is committed at most once; a second attempt fails and
/// leaves usage untouched. The quoted reward is re-checked against the usage
/// current at commit time, so the rule's reward cap is never exceeded.
pub fn record(
    connection: &mut Connection,
    db_path: &Path,
    rec_id: Option<&str>,
    rules: &[Rule],
) -> ClientResult<RecordedPurchase> {
    let timestamp = now_timestamp();
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let stored = match rec_id {
        Some(id) => transaction
            .query_row(
                &format!("{SELECT_RECOMMENDATION} WHERE rec_id = ?1 LIMIT 1"),
                params![id],
                stored_from_row,
            )
            .optional()
            .map_err(|error| map_sqlite_error(db_path, &error))?
            .ok_or_else(|| ClientError::recommendation_not_found(id))?,
        None => transaction
            .query_row(
                &format!(
                    "{SELECT_RECOMMENDATION} WHERE status = 'pending'
                     ORDER BY created_at DESC, rowid DESC LIMIT 1"
                ),
                [],
                stored_from_row,
            )
            .optional()
            .map_err(|error| map_sqlite_error(db_path, &error))?
            .ok_or_else(ClientError::no_pending_recommendation)?,
    };

    if stored.status == "recorded" {
        return Err(ClientError::recommendation_already_recorded(&stored.rec_id));
    }
    if stored.status != "pending" {
        return Err(ClientError::ledger_corrupt(db_path));
    }

    let used = load_usage(&transaction, db_path, &stored.month)?.usage_for(&stored.rule_id);
    let reward = committed_reward(&stored, rules, &used);
    if reward < stored.est_reward {
        warn!(
            rec_id = %stored.rec_id,
            quoted = stored.est_reward,
            committed = reward,
            "reward reduced to what the cap still allows"
        );
    }

    let txn_id = format!("txn_{}", Ulid::new());
    transaction
        .execute(
            "INSERT INTO internal_transactions (
                txn_id, rec_id, month, posted_on, merchant, region, amount,
                rule_id, card, rule_name, est_reward, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &txn_id,
                &stored.rec_id,
                &stored.month,
                &stored.posted_on,
                &stored.merchant,
                &stored.region,
                stored.amount,
                &stored.rule_id,
                &stored.card,
                &stored.rule_name,
                reward,
                &timestamp,
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    // Usage grows by the full purchase amount, not the capped eligible spend.
    let usage_after = add_usage(
        &transaction,
        db_path,
        &stored.month,
        &stored.rule_id,
        stored.amount,
        reward,
        &timestamp,
    )?;

    transaction
        .execute(
            "UPDATE internal_recommendations
             SET status = 'recorded', recorded_at = ?2
             WHERE rec_id = ?1 AND status = 'pending'",
            params![&stored.rec_id, &timestamp],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    info!(
        rec_id = %stored.rec_id,
        rule_id = %stored.rule_id,
        month = %stored.month,
        amount = stored.amount,
        "recorded purchase"
    );

    Ok(RecordedPurchase {
        txn_id,
        reward,
        recorded_at: timestamp,
        usage_after,
        recommendation: StoredRecommendation {
            status: "recorded".to_string(),
            ..stored
        },
    })
}

/// Quoted reward, lowered to what the rule can still pay given `used`.
/// A rule that left the catalog keeps its quote.
fn committed_reward(stored: &StoredRecommendation, rules: &[Rule], used: &UsageRecord) -> f64 {
    match rules.iter().find(|rule| rule.rule_id == stored.rule_id) {
        Some(rule) => {
            let (_, available) = rule.marginal_value(stored.amount, used);
            round_currency(stored.est_reward.min(available))
        }
        None => stored.est_reward,
    }
}

pub fn find_recommendation(
    connection: &Connection,
    db_path: &Path,
    rec_id: &str,
) -> ClientResult<Option<StoredRecommendation>> {
    connection
        .query_row(
            &format!("{SELECT_RECOMMENDATION} WHERE rec_id = ?1 LIMIT 1"),
            params![rec_id],
            stored_from_row,
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

const SELECT_RECOMMENDATION: &str = "SELECT rec_id, status, created_at, month, posted_on, merchant,
        region, amount, rule_id, card, rule_name, est_reward
     FROM internal_recommendations";

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecommendation> {
    Ok(StoredRecommendation {
        rec_id: row.get(0)?,
        status: row.get(1)?,
        created_at: row.get(2)?,
        month: row.get(3)?,
        posted_on: row.get(4)?,
        merchant: row.get(5)?,
        region: row.get(6)?,
        amount: row.get(7)?,
        rule_id: row.get(8)?,
        card: row.get(9)?,
        rule_name: row.get(10)?,
        est_reward: row.get(11)?,
    })
}
