use std::collections::HashMap;

use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

const BOOTSTRAP_SQL: &str = include_str!("migrations/0001_bootstrap.sql");

const SAFE_REPAIR_START: &str = "-- cardwise:safe_repair:start:";
const SAFE_REPAIR_END: &str = "-- cardwise:safe_repair:end:";

pub const REQUIRED_INDEX_NAMES: [&str; 2] = [
    "idx_internal_transactions_month_created_at",
    "idx_internal_recommendations_status_created_at",
];

pub const REQUIRED_META_KEYS: [(&str, &str); 2] = [
    ("schema_version", "v1"),
    ("ledger_contract_version", "v1"),
];

/// `PRAGMA user_version` after every migration above has been applied.
pub const EXPECTED_USER_VERSION: i64 = 1;

pub fn run_pending(conn: &mut Connection) -> rusqlite_migration::Result<()> {
    let migrations = Migrations::new(vec![M::up(BOOTSTRAP_SQL)]);
    migrations.to_latest(conn)
}

/// Canonical SQL for an object that setup may recreate without data loss.
pub fn safe_repair_statement(statement_name: &str) -> Option<String> {
    parse_safe_repair_statements().remove(statement_name)
}

fn parse_safe_repair_statements() -> HashMap<String, String> {
    let mut blocks: HashMap<String, String> = HashMap::new();
    let mut active: Option<(String, String)> = None;

    for line in BOOTSTRAP_SQL.lines() {
        let trimmed = line.trim();

        if let Some(name) = trimmed.strip_prefix(SAFE_REPAIR_START) {
            active = Some((name.to_string(), String::new()));
            continue;
        }

        if let Some(name) = trimmed.strip_prefix(SAFE_REPAIR_END) {
            if let Some((active_name, sql)) = active.take()
                && active_name == name
            {
                blocks.insert(active_name, sql.trim().to_string());
            }
            continue;
        }

        if let Some((_, sql)) = active.as_mut() {
            sql.push_str(line);
            sql.push('\n');
        }
    }

    blocks
}
