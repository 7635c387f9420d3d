use std::path::Path;

use rusqlite::{Connection, params};
use serde::Serialize;

use crate::ClientResult;
use crate::ledger::round_currency;
use crate::state::map_sqlite_error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub txn_id: String,
    pub rec_id: String,
    pub posted_on: String,
    pub merchant: String,
    pub region: Option<String>,
    pub amount: f64,
    pub rule_id: String,
    pub card: String,
    pub rule_name: String,
    pub est_reward: f64,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthHistory {
    pub month: String,
    pub rows: Vec<TransactionRow>,
    pub total_amount: f64,
    pub total_reward: f64,
}

/// Recorded purchases for `month`, newest first.
pub fn month_history(
    connection: &Connection,
    db_path: &Path,
    month: &str,
) -> ClientResult<MonthHistory> {
    let mut statement = connection
        .prepare(
            "SELECT txn_id, rec_id, posted_on, merchant, region, amount, rule_id, card,
                    rule_name, est_reward, created_at
             FROM internal_transactions
             WHERE month = ?1
             ORDER BY created_at DESC, rowid DESC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map(params![month], |row| {
            Ok(TransactionRow {
                txn_id: row.get(0)?,
                rec_id: row.get(1)?,
                posted_on: row.get(2)?,
                merchant: row.get(3)?,
                region: row.get(4)?,
                amount: row.get(5)?,
                rule_id: row.get(6)?,
                card: row.get(7)?,
                rule_name: row.get(8)?,
                est_reward: row.get(9)?,
                recorded_at: row.get(10)?,
            })
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }

    let total_amount = round_currency(rows.iter().map(|row| row.amount).sum());
    let total_reward = round_currency(rows.iter().map(|row| row.est_reward).sum());

    Ok(MonthHistory {
        month: month.to_string(),
        rows,
        total_amount,
        total_reward,
    })
}
