use std::path::{Path, PathBuf};

use crate::ClientResult;
use crate::state::resolve_ledger_home;

pub const HOME_ENV: &str = "CARDWISE_HOME";
pub const RULES_ENV: &str = "CARDWISE_RULES";
pub const MERCHANT_MAP_ENV: &str = "CARDWISE_MERCHANT_MAP";
pub const DEFAULT_REGION_ENV: &str = "CARDWISE_DEFAULT_REGION";

const RULES_FILE_NAME: &str = "rules.json";
const MERCHANT_MAP_FILE_NAME: &str = "merchantmap.json";

/// Values supplied explicitly by the caller. Anything left `None` falls back
/// to the environment and then to files inside the ledger home.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides<'a> {
    pub home: Option<&'a Path>,
    pub rules_path: Option<&'a Path>,
    pub merchant_map_path: Option<&'a Path>,
    pub default_region: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub home: PathBuf,
    pub rules_path: PathBuf,
    pub merchant_map_path: PathBuf,
    /// A merchant map the user pointed at must exist; the implicit one may not.
    pub merchant_map_required: bool,
    pub default_region: Option<String>,
}

impl ClientConfig {
    pub fn resolve(overrides: &ConfigOverrides<'_>) -> ClientResult<Self> {
        let home = resolve_ledger_home(overrides.home)?;

        let rules_path = overrides
            .rules_path
            .map(Path::to_path_buf)
            .or_else(|| env_path(RULES_ENV))
            .unwrap_or_else(|| home.join(RULES_FILE_NAME));

        let explicit_map = overrides
            .merchant_map_path
            .map(Path::to_path_buf)
            .or_else(|| env_path(MERCHANT_MAP_ENV));
        let merchant_map_required = explicit_map.is_some();
        let merchant_map_path = explicit_map.unwrap_or_else(|| home.join(MERCHANT_MAP_FILE_NAME));

        let default_region = overrides
            .default_region
            .map(str::to_string)
            .or_else(|| std::env::var(DEFAULT_REGION_ENV).ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            home,
            rules_path,
            merchant_map_path,
            merchant_map_required,
            default_region,
        })
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
