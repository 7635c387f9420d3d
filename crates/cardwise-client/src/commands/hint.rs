use crate::ClientResult;
use crate::commands::common::{load, resolve_config};
use crate::config::ConfigOverrides;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::HintData;
use crate::engine::normalize_description;

#[derive(Debug, Default)]
pub struct HintOptions<'a> {
    pub merchant: &'a str,
    pub config: ConfigOverrides<'a>,
}

pub fn run(merchant: &str) -> ClientResult<SuccessEnvelope> {
    run_with_options(HintOptions {
        merchant,
        ..HintOptions::default()
    })
}

pub fn run_with_options(options: HintOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let config = resolve_config(&options.config)?;
    let loaded = load(&config)?;
    let resolver = loaded.catalog.hint_resolver();
    let hints = resolver.resolve(options.merchant);

    let data = HintData {
        merchant: options.merchant.to_string(),
        normalized: normalize_description(options.merchant),
        rule_ids: hints.rule_ids.into_iter().collect(),
        default_region: hints.default_region,
        keyword_count: resolver.keyword_count(),
    };
    success("hint", data)
}
