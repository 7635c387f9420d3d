pub(crate) mod load;
pub(crate) mod validate;

use serde::Serialize;

use crate::ClientResult;
use crate::config::ClientConfig;
use crate::engine::{MerchantHintResolver, MerchantKeyword, Rule};

pub use load::{parse_merchant_map, parse_rules};

/// Rule catalog plus the ordered merchant keyword map, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub rules: Vec<Rule>,
    pub merchant_map: Vec<MerchantKeyword>,
}

impl Catalog {
    pub fn hint_resolver(&self) -> MerchantHintResolver {
        MerchantHintResolver::new(&self.merchant_map)
    }

    pub fn rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.rule_id == rule_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogWarning {
    pub code: String,
    pub message: String,
}

impl CatalogWarning {
    pub(crate) fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub warnings: Vec<CatalogWarning>,
}

pub fn load_catalog(config: &ClientConfig) -> ClientResult<LoadedCatalog> {
    let rules = load::read_rules(&config.rules_path)?;
    let merchant_map =
        load::read_merchant_map(&config.merchant_map_path, config.merchant_map_required)?;
    validate::validate(&config.rules_path, rules, merchant_map)
}
