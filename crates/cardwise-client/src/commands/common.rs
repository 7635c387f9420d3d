use rusqlite::Connection;

use crate::ClientResult;
use crate::catalog::{LoadedCatalog, load_catalog};
use crate::config::{ClientConfig, ConfigOverrides};
use crate::contracts::types::RuleRef;
use crate::engine::Rule;
use crate::setup::{SetupContext, ensure_initialized};
use crate::state::open_connection;

pub(crate) struct Ledger {
    pub(crate) setup: SetupContext,
    pub(crate) connection: Connection,
}

pub(crate) fn resolve_config(overrides: &ConfigOverrides<'_>) -> ClientResult<ClientConfig> {
    ClientConfig::resolve(overrides)
}

pub(crate) fn load(config: &ClientConfig) -> ClientResult<LoadedCatalog> {
    load_catalog(config)
}

pub(crate) fn open_ledger(config: &ClientConfig) -> ClientResult<Ledger> {
    let setup = ensure_initialized(config)?;
    let connection = open_connection(&setup.db_path)?;
    Ok(Ledger { setup, connection })
}

pub(crate) fn rule_ref(rule: &Rule) -> RuleRef {
    RuleRef {
        rule_id: rule.rule_id.clone(),
        card: rule.card.clone(),
        rule_name: rule.rule_name.clone(),
    }
}
