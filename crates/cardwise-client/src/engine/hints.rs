use serde::{Deserialize, Serialize};

use crate::engine::types::{HintSet, string_or_empty};

/// One row of the merchant keyword map. Row order is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantKeyword {
    #[serde(deserialize_with = "string_or_empty")]
    pub keyword: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub default_region: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub rule_id: String,
}

#[derive(Debug, Clone)]
struct NormalizedKeyword {
    needle: String,
    default_region: Option<String>,
    rule_id: Option<String>,
}

/// Resolves free-text merchant descriptions against the keyword map.
#[derive(Debug, Clone, Default)]
pub struct MerchantHintResolver {
    entries: Vec<NormalizedKeyword>,
}

impl MerchantHintResolver {
    pub fn new(map: &[MerchantKeyword]) -> Self {
        let entries = map
            .iter()
            .filter_map(|row| {
                let needle = normalize_description(&row.keyword);
                if needle.is_empty() {
                    return None;
                }
                Some(NormalizedKeyword {
                    needle,
                    default_region: non_empty(&row.default_region),
                    rule_id: non_empty(&row.rule_id),
                })
            })
            .collect();
        Self { entries }
    }

    /// Every matching row contributes its `rule_id`; only the first matching
    /// row decides the default region.
    pub fn resolve(&self, description: &str) -> HintSet {
        let haystack = normalize_description(description);
        let mut hints = HintSet::default();
        if haystack.is_empty() {
            return hints;
        }

        let mut first_match = true;
        for entry in &self.entries {
            if !haystack.contains(&entry.needle) {
                continue;
            }
            if first_match {
                hints.default_region = entry.default_region.clone();
                first_match = false;
            }
            if let Some(rule_id) = &entry.rule_id {
                hints.rule_ids.insert(rule_id.clone());
            }
        }

        hints
    }

    pub fn keyword_count(&self) -> usize {
        self.entries.len()
    }
}

pub fn normalize_description(value: &str) -> String {
    value.trim().to_lowercase()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{MerchantHintResolver, MerchantKeyword, normalize_description};

    fn keyword(keyword: &str, region: &str, rule_id: &str) -> MerchantKeyword {
        MerchantKeyword {
            keyword: keyword.to_string(),
            default_region: region.to_string(),
            rule_id: rule_id.to_string(),
        }
    }

    #[test]
    fn normalization_trims_and_case_folds() {
        assert_eq!(normalize_description("  Amazon JP  "), "amazon jp");
    }

    #[test]
    fn first_match_decides_region_and_every_match_adds_a_hint() {
        let resolver = MerchantHintResolver::new(&[
            keyword("amazon jp", "foreign", "cube_overseas"),
            keyword("amazon", "domestic", "online_shopping"),
            keyword("uber", "domestic", "transport"),
        ]);

        let hints = resolver.resolve("AMAZON JP marketplace");
        assert_eq!(hints.default_region.as_deref(), Some("foreign"));
        assert!(hints.contains("cube_overseas"));
        assert!(hints.contains("online_shopping"));
        assert!(!hints.contains("transport"));
    }

    #[test]
    fn configured_order_wins_over_keyword_length() {
        let resolver = MerchantHintResolver::new(&[
            keyword("amazon", "domestic", "online_shopping"),
            keyword("amazon jp", "foreign", "cube_overseas"),
        ]);

        let hints = resolver.resolve("amazon jp");
        assert_eq!(hints.default_region.as_deref(), Some("domestic"));
        assert_eq!(hints.rule_ids.len(), 2);
    }

    #[test]
    fn first_match_without_region_leaves_region_unset() {
        let resolver = MerchantHintResolver::new(&[
            keyword("line pay", "", "line_pay"),
            keyword("pay", "domestic", "mobile_pay"),
        ]);

        let hints = resolver.resolve("LINE Pay taxi");
        assert_eq!(hints.default_region, None);
        assert!(hints.contains("line_pay"));
        assert!(hints.contains("mobile_pay"));
    }

    #[test]
    fn blank_keywords_never_match() {
        let resolver = MerchantHintResolver::new(&[keyword("   ", "domestic", "everything")]);
        assert_eq!(resolver.keyword_count(), 0);
        assert!(resolver.resolve("anything").is_empty());
    }

    #[test]
    fn empty_or_unmatched_description_yields_empty_hints() {
        let resolver = MerchantHintResolver::new(&[keyword("uber", "domestic", "transport")]);
        assert!(resolver.resolve("").is_empty());
        assert!(resolver.resolve("   ").is_empty());
        assert!(resolver.resolve("corner bakery").is_empty());
    }

    #[test]
    fn rows_without_rule_id_only_contribute_region() {
        let resolver = MerchantHintResolver::new(&[keyword("tokyo", "foreign", "")]);
        let hints = resolver.resolve("Tokyo Station kiosk");
        assert_eq!(hints.default_region.as_deref(), Some("foreign"));
        assert!(hints.rule_ids.is_empty());
    }
}
