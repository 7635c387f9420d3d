use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::engine::{MerchantKeyword, Rule};
use crate::{ClientError, ClientResult};

const MERCHANT_MAP_HEADERS: [&str; 3] = ["keyword", "default_region", "rule_id"];

pub(crate) fn read_rules(path: &Path) -> ClientResult<Vec<Rule>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(ClientError::catalog_not_found(path, "rules"));
        }
        Err(error) => return Err(ClientError::catalog_invalid(path, &error.to_string())),
    };
    let rules =
        parse_rules(&content).map_err(|detail| ClientError::catalog_invalid(path, &detail))?;
    debug!(path = %path.display(), rules = rules.len(), "loaded rule catalog");
    Ok(rules)
}

pub(crate) fn read_merchant_map(
    path: &Path,
    required: bool,
) -> ClientResult<Vec<MerchantKeyword>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no merchant map found; hints disabled");
            return Ok(Vec::new());
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            return Err(ClientError::catalog_not_found(path, "merchant-map"));
        }
        Err(error) => return Err(ClientError::catalog_invalid(path, &error.to_string())),
    };
    let entries = parse_merchant_map(&content)
        .map_err(|detail| ClientError::catalog_invalid(path, &detail))?;
    debug!(path = %path.display(), keywords = entries.len(), "loaded merchant map");
    Ok(entries)
}

/// Parses a JSON array of rule objects.
pub fn parse_rules(content: &str) -> Result<Vec<Rule>, String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err("the rules file is empty; expected a JSON array of rules".to_string());
    }

    let parsed = serde_json::from_str::<Value>(trimmed)
        .map_err(|error| format!("invalid JSON ({error})"))?;
    let Some(items) = parsed.as_array() else {
        return Err("rules must be a top-level JSON array".to_string());
    };

    let mut rules = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let rule = serde_json::from_value::<Rule>(item.clone())
            .map_err(|error| format!("rule #{} is malformed ({error})", index + 1))?;
        rules.push(rule);
    }
    Ok(rules)
}

/// Parses the merchant map from a JSON array or a CSV with a
/// `keyword,default_region,rule_id` header. Row order is preserved.
pub fn parse_merchant_map(content: &str) -> Result<Vec<MerchantKeyword>, String> {
    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<MerchantKeyword>>(trimmed)
            .map_err(|error| format!("invalid merchant map JSON ({error})"));
    }

    parse_merchant_map_csv(trimmed)
}

fn parse_merchant_map_csv(content: &str) -> Result<Vec<MerchantKeyword>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| "CSV header row is missing or unreadable".to_string())?
        .iter()
        .map(str::to_string)
        .collect::<Vec<String>>();
    if !headers.iter().any(|header| header == "keyword") {
        return Err(format!(
            "merchant map must be a JSON array or CSV with headers {}",
            MERCHANT_MAP_HEADERS.join(",")
        ));
    }
    if let Some(unknown) = headers
        .iter()
        .find(|header| !MERCHANT_MAP_HEADERS.contains(&header.as_str()))
    {
        return Err(format!("unknown merchant map column `{unknown}`"));
    }

    let mut entries = Vec::new();
    for (index, row) in reader.deserialize::<MerchantKeyword>().enumerate() {
        let entry =
            row.map_err(|error| format!("CSV row {} is malformed ({error})", index + 2))?;
        entries.push(entry);
    }
    Ok(entries)
}
