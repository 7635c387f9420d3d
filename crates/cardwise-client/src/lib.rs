//! Card reward rule selection with a monthly usage ledger.
//!
//! [`engine`] is pure: it ranks catalog rules for one purchase against a
//! usage snapshot. [`commands`] wires it to catalog files and the SQLite
//! ledger and returns JSON-ready envelopes.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod setup;
pub mod state;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
