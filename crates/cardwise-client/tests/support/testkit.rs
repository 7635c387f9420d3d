use std::fs;
use std::path::{Path, PathBuf};

use cardwise_client::ClientResult;
use cardwise_client::commands::{history, recommend, record, reset, usage};
use cardwise_client::config::ConfigOverrides;
use serde_json::{Value, json};
use tempfile::{Builder, TempDir};

/// Temporary ledger home with its own rules and merchant map files.
pub struct Workspace {
    _dir: TempDir,
    pub home: PathBuf,
    pub rules_path: PathBuf,
    pub merchant_map_path: PathBuf,
}

impl Workspace {
    pub fn new(rules: &Value, merchant_map: &Value) -> std::io::Result<Self> {
        let dir = Builder::new().prefix("cardwise-test").tempdir()?;
        let home = dir.path().join("home");
        fs::create_dir_all(&home)?;
        let rules_path = write_json(dir.path(), "rules.json", rules)?;
        let merchant_map_path = write_json(dir.path(), "merchantmap.json", merchant_map)?;
        Ok(Self {
            _dir: dir,
            home,
            rules_path,
            merchant_map_path,
        })
    }

    pub fn overrides(&self) -> ConfigOverrides<'_> {
        ConfigOverrides {
            home: Some(&self.home),
            rules_path: Some(&self.rules_path),
            merchant_map_path: Some(&self.merchant_map_path),
            default_region: None,
        }
    }

    pub fn recommend(
        &self,
        merchant: &str,
        amount: f64,
        region: Option<&str>,
        date: Option<&str>,
    ) -> ClientResult<Value> {
        recommend::run_with_options(recommend::RecommendOptions {
            merchant,
            amount,
            region,
            date,
            config: self.overrides(),
        })
        .map(|envelope| envelope.data)
    }

    pub fn record(&self, rec_id: Option<&str>) -> ClientResult<Value> {
        record::run_with_options(record::RecordOptions {
            rec_id,
            config: self.overrides(),
        })
        .map(|envelope| envelope.data)
    }

    /// Recommends and immediately records, returning the recommendation.
    pub fn spend(&self, merchant: &str, amount: f64, region: Option<&str>, date: &str) -> Value {
        let recommended = self.recommend(merchant, amount, region, Some(date));
        assert!(recommended.is_ok());
        let data = recommended.unwrap_or(Value::Null);
        let rec_id = data["rec_id"].as_str().unwrap_or_default().to_string();
        assert!(self.record(Some(&rec_id)).is_ok());
        data
    }

    pub fn usage(&self, month: &str) -> ClientResult<Value> {
        usage::run_with_options(usage::UsageOptions {
            month: Some(month),
            config: self.overrides(),
        })
        .map(|envelope| envelope.data)
    }

    pub fn history(&self, month: &str) -> ClientResult<Value> {
        history::run_with_options(history::HistoryOptions {
            month: Some(month),
            config: self.overrides(),
        })
        .map(|envelope| envelope.data)
    }

    pub fn reset(&self, month: &str) -> ClientResult<Value> {
        reset::run_with_options(reset::ResetOptions {
            month,
            config: self.overrides(),
        })
        .map(|envelope| envelope.data)
    }
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, value.to_string())?;
    Ok(path)
}

pub fn rule_x() -> Value {
    json!({
        "rule_id": "x_dining",
        "card": "Sapphire",
        "rule_name": "Domestic 5%",
        "regions": ["domestic"],
        "rate": 0.05,
        "priority": 10,
        "cap_spend": 10000,
        "cap_reward": 500
    })
}

pub fn rule_y() -> Value {
    json!({
        "rule_id": "y_base",
        "card": "Flat",
        "rule_name": "Everything 1%",
        "regions": ["domestic", "foreign"],
        "rate": 0.01,
        "priority": 1,
        "cap_spend": 5000,
        "cap_reward": 200
    })
}

pub fn rule_z() -> Value {
    json!({
        "rule_id": "z_coffee",
        "card": "Barista",
        "rule_name": "Coffee 10%",
        "regions": [],
        "requires_map": true,
        "rate": 0.10,
        "priority": 50,
        "cap_spend": 1000,
        "cap_reward": 100
    })
}

pub fn coffee_map() -> Value {
    json!([
        { "keyword": "coffee", "default_region": "domestic", "rule_id": "z_coffee" },
        { "keyword": "paris", "default_region": "foreign", "rule_id": "" }
    ])
}
