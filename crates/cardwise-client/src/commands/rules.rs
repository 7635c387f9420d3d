use crate::ClientResult;
use crate::commands::common::{load, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::RulesData;

#[derive(Debug, Default)]
pub struct RulesOptions<'a> {
    pub config: ConfigOverrides<'a>,
}

pub fn run() -> ClientResult<SuccessEnvelope> {
    run_with_options(RulesOptions::default())
}

/// Lists the validated catalog. Does not touch the ledger.
pub fn run_with_options(options: RulesOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let config = resolve_config(&options.config)?;
    let loaded = load(&config)?;
    let keyword_count = loaded.catalog.hint_resolver().keyword_count();

    let data = RulesData {
        rules_path: config.rules_path.display().to_string(),
        merchant_map_path: config.merchant_map_path.display().to_string(),
        rule_count: loaded.catalog.rules.len(),
        keyword_count,
        rules: loaded.catalog.rules,
        warnings: loaded.warnings,
    };
    success("rules", data)
}
