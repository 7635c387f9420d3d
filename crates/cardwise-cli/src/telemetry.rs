use std::fmt;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{FromEnvError, ParseError};

pub const LOG_ENV: &str = "CARDWISE_LOG";
const DEFAULT_FILTER: &str = "warn";

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: FromEnvError },
    DefaultFilter(ParseError),
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvFilter { value, .. } => {
                write!(f, "invalid {LOG_ENV} filter '{value}'")
            }
            Self::DefaultFilter(err) => write!(f, "invalid default log filter: {err}"),
            Self::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EnvFilter { source, .. } => Some(source),
            Self::DefaultFilter(source) => Some(source),
            Self::Subscriber(err) => Some(&**err),
        }
    }
}

/// Logs go to stderr so stdout stays reserved for command output.
pub fn init() -> Result<(), TelemetryError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn env_filter() -> Result<EnvFilter, TelemetryError> {
    match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => EnvFilter::try_from_env(LOG_ENV)
            .map_err(|source| TelemetryError::EnvFilter { value, source }),
        _ => EnvFilter::try_new(DEFAULT_FILTER).map_err(TelemetryError::DefaultFilter),
    }
}
