use std::collections::BTreeSet;
use std::path::Path;

use tracing::warn;

use crate::catalog::{Catalog, CatalogWarning, LoadedCatalog};
use crate::engine::{MerchantKeyword, Rule};
use crate::{ClientError, ClientResult};

/// Rejects catalogs that break `rule_id` uniqueness and clamps numeric fields
/// that would otherwise feed negative or non-finite values into selection.
pub(crate) fn validate(
    rules_path: &Path,
    rules: Vec<Rule>,
    merchant_map: Vec<MerchantKeyword>,
) -> ClientResult<LoadedCatalog> {
    let mut warnings = Vec::new();
    let mut seen = BTreeSet::new();
    let mut clean_rules = Vec::with_capacity(rules.len());

    for mut rule in rules {
        let rule_id = rule.rule_id.trim().to_string();
        if rule_id.is_empty() {
            return Err(ClientError::catalog_invalid(
                rules_path,
                "every rule needs a non-empty `rule_id`",
            ));
        }
        if !seen.insert(rule_id.clone()) {
            return Err(ClientError::catalog_invalid(
                rules_path,
                &format!("`rule_id` `{rule_id}` appears more than once"),
            ));
        }
        rule.rule_id = rule_id;

        clamp_field(&mut rule.rate, "rate", &rule.rule_id, &mut warnings);
        clamp_field(&mut rule.cap_spend, "cap_spend", &rule.rule_id, &mut warnings);
        clamp_field(&mut rule.cap_reward, "cap_reward", &rule.rule_id, &mut warnings);
        clean_rules.push(rule);
    }

    for (index, entry) in merchant_map.iter().enumerate() {
        let row = index + 1;
        if entry.keyword.trim().is_empty() {
            warnings.push(CatalogWarning::new(
                "empty_keyword",
                format!("Merchant map row {row} has an empty keyword and never matches."),
            ));
        }
        let rule_id = entry.rule_id.trim();
        if !rule_id.is_empty() && !seen.contains(rule_id) {
            warnings.push(CatalogWarning::new(
                "unknown_rule_reference",
                format!(
                    "Merchant map row {row} (`{}`) points at unknown rule `{rule_id}`.",
                    entry.keyword
                ),
            ));
        }
    }

    for warning in &warnings {
        warn!(code = %warning.code, "{}", warning.message);
    }

    Ok(LoadedCatalog {
        catalog: Catalog {
            rules: clean_rules,
            merchant_map,
        },
        warnings,
    })
}

fn clamp_field(value: &mut f64, field: &str, rule_id: &str, warnings: &mut Vec<CatalogWarning>) {
    if value.is_finite() && *value >= 0.0 {
        return;
    }
    warnings.push(CatalogWarning::new(
        "negative_value_clamped",
        format!("Rule `{rule_id}` has invalid `{field}` ({value}); treating it as 0."),
    ));
    *value = 0.0;
}
