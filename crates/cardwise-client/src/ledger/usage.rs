use std::path::Path;

use rusqlite::{Connection, params};

use crate::ClientResult;
use crate::engine::{UsageRecord, UsageSnapshot};
use crate::state::map_sqlite_error;

/// Reads the month's usage totals. Rules with no row are absent and read as
/// zero through [`UsageSnapshot::usage_for`].
pub fn load_usage(
    connection: &Connection,
    db_path: &Path,
    month: &str,
) -> ClientResult<UsageSnapshot> {
    let mut statement = connection
        .prepare(
            "SELECT rule_id, used_spend, used_reward
             FROM internal_usage
             WHERE month = ?1
             ORDER BY rule_id ASC",
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let rows_iter = statement
        .query_map(params![month], |row| {
            Ok((
                row.get::<_, String>(0)?,
                UsageRecord {
                    used_spend: row.get(1)?,
                    used_reward: row.get(2)?,
                },
            ))
        })
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut snapshot = UsageSnapshot::new();
    for row in rows_iter {
        let (rule_id, record) = row.map_err(|error| map_sqlite_error(db_path, &error))?;
        snapshot.insert(&rule_id, record);
    }

    Ok(snapshot)
}

pub(crate) fn add_usage(
    transaction: &rusqlite::Transaction<'_>,
    db_path: &Path,
    month: &str,
    rule_id: &str,
    spend: f64,
    reward: f64,
    timestamp: &str,
) -> ClientResult<UsageRecord> {
    transaction
        .execute(
            "INSERT INTO internal_usage (month, rule_id, used_spend, used_reward, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (month, rule_id) DO UPDATE SET
                used_spend = ROUND(used_spend + excluded.used_spend, 2),
                used_reward = ROUND(used_reward + excluded.used_reward, 2),
                updated_at = excluded.updated_at",
            params![month, rule_id, spend, reward, timestamp],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    transaction
        .query_row(
            "SELECT used_spend, used_reward FROM internal_usage WHERE month = ?1 AND rule_id = ?2",
            params![month, rule_id],
            |row| {
                Ok(UsageRecord {
                    used_spend: row.get(0)?,
                    used_reward: row.get(1)?,
                })
            },
        )
        .map_err(|error| map_sqlite_error(db_path, &error))
}
