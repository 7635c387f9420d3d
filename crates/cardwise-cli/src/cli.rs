use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(pub String);

impl IsoDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month(pub String);

impl Month {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn parse_iso_date(value: &str) -> Result<IsoDate, String> {
    if !has_digit_shape(value, &[4, 7], 10) {
        return Err("date must use YYYY-MM-DD format".to_string());
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err("date must use valid calendar values".to_string());
    }
    Ok(IsoDate(value.to_string()))
}

pub fn parse_month(value: &str) -> Result<Month, String> {
    if !has_digit_shape(value, &[4], 7) {
        return Err("month must use YYYY-MM format".to_string());
    }
    if NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_err() {
        return Err("month must be between 01 and 12".to_string());
    }
    Ok(Month(value.to_string()))
}

pub fn parse_amount(value: &str) -> Result<f64, String> {
    let amount = value
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| "amount must be a number such as 42.50".to_string())?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err("amount must be greater than zero".to_string());
    }
    Ok(amount)
}

fn has_digit_shape(value: &str, dashes: &[usize], len: usize) -> bool {
    value.len() == len
        && value.bytes().enumerate().all(|(index, byte)| {
            if dashes.contains(&index) {
                byte == b'-'
            } else {
                byte.is_ascii_digit()
            }
        })
}

pub const RECOMMEND_AFTER_HELP: &str = "\
How a rule is picked:
  Rules outside the purchase region are dropped. The rest are ranked by:
    1. channel rules (requires_map) need a merchant keyword that names them
    2. rules with spend or reward cap left beat capped-out rules
    3. rules hinted by the merchant map beat unhinted rules
    4. higher priority, then higher estimated reward
  Nothing is added to monthly usage until you run `cardwise record`.

Region:
  --region wins, then the first matching merchant keyword's region,
  then CARDWISE_DEFAULT_REGION. Without any, every rule is considered.

What to do next:
  1. Make the purchase with the recommended card.
  2. Run `cardwise record` (or `cardwise record <rec-id>`) to count it.
";

pub const RULES_AFTER_HELP: &str = "\
Catalog files:
  Rules:         --rules, CARDWISE_RULES, or <home>/rules.json
  Merchant map:  --merchant-map, CARDWISE_MERCHANT_MAP, or <home>/merchantmap.json
  Home:          CARDWISE_HOME, or ~/.cardwise

Rules file (JSON array):
  [
    {
      \"rule_id\": \"sapphire_dining\",
      \"card\": \"Sapphire\",
      \"rule_name\": \"Dining 5%\",
      \"regions\": [\"domestic\"],
      \"requires_map\": false,
      \"rate\": 0.05,
      \"priority\": 10,
      \"cap_spend\": 10000,
      \"cap_reward\": 500
    }
  ]
  Missing numbers count as zero, missing regions as \"any region\".
  Every rule_id must be unique.

Merchant map (JSON array or CSV with header keyword,default_region,rule_id):
  [
    { \"keyword\": \"starbucks\", \"default_region\": \"domestic\", \"rule_id\": \"barista_coffee\" }
  ]
  Keywords match case-insensitively anywhere in the merchant text.
  Row order matters: the first matching row sets the region.
";

#[derive(Debug, Parser)]
#[command(
    name = "cardwise",
    version,
    about = "pick the best card reward rule for a purchase",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Rules catalog file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub rules: Option<PathBuf>,
    /// Merchant keyword map (JSON or CSV)
    #[arg(long, global = true, value_name = "PATH")]
    pub merchant_map: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recommend the best rule for one purchase
    #[command(after_long_help = RECOMMEND_AFTER_HELP)]
    Recommend {
        /// Merchant description as it appears on the receipt
        merchant: String,
        /// Purchase amount (e.g. 42.50)
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        amount: f64,
        /// Region tag such as domestic or foreign
        #[arg(long)]
        region: Option<String>,
        /// Purchase date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_iso_date)]
        date: Option<IsoDate>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Count a recommended purchase toward this month's caps
    Record {
        /// Recommendation id (rec_...), defaults to the newest pending one
        rec_id: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List recorded purchases for a month
    History {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show used and remaining caps per rule for a month
    Usage {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(long, value_parser = parse_month)]
        month: Option<Month>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Clear usage, purchases and pending recommendations for one month
    Reset {
        /// Month to clear (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: Month,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// List catalog rules and catalog warnings
    #[command(after_long_help = RULES_AFTER_HELP)]
    Rules {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
    /// Show which merchant keywords match a description
    Hint {
        /// Merchant description to test
        merchant: String,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub const fn json(&self) -> bool {
        match self {
            Self::Recommend { json, .. }
            | Self::Record { json, .. }
            | Self::History { json, .. }
            | Self::Usage { json, .. }
            | Self::Reset { json, .. }
            | Self::Rules { json }
            | Self::Hint { json, .. } => *json,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Recommend { .. } => "recommend",
            Self::Record { .. } => "record",
            Self::History { .. } => "history",
            Self::Usage { .. } => "usage",
            Self::Reset { .. } => "reset",
            Self::Rules { .. } => "rules",
            Self::Hint { .. } => "hint",
        }
    }
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
