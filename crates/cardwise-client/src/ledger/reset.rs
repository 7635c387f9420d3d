use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, params};
use tracing::info;

use crate::ClientResult;
use crate::state::map_sqlite_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCounts {
    pub usage_rows: i64,
    pub transactions: i64,
    pub recommendations: i64,
}

/// Clears one month's usage, transactions and recommendations. Other months
/// are untouched.
pub fn reset_month(
    connection: &mut Connection,
    db_path: &Path,
    month: &str,
) -> ClientResult<ResetCounts> {
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let transactions = transaction
        .execute(
            "DELETE FROM internal_transactions WHERE month = ?1",
            params![month],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))? as i64;
    let recommendations = transaction
        .execute(
            "DELETE FROM internal_recommendations WHERE month = ?1",
            params![month],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))? as i64;
    let usage_rows = transaction
        .execute("DELETE FROM internal_usage WHERE month = ?1", params![month])
        .map_err(|error| map_sqlite_error(db_path, &error))? as i64;

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    info!(month, usage_rows, transactions, recommendations, "reset month");

    Ok(ResetCounts {
        usage_rows,
        transactions,
        recommendations,
    })
}
