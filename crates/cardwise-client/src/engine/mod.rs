//! Stateless rule selection: merchant hints plus cap-aware ranking.
//!
//! Nothing in this module performs I/O. Callers own the catalog and the usage
//! snapshot and pass them in on every call.

pub mod hints;
pub mod select;
pub mod types;

pub use hints::{MerchantHintResolver, MerchantKeyword, normalize_description};
pub use select::{Candidate, RankKey, choose, rank_candidates, select};
pub use types::{
    EvaluationResult, HintSet, NoUsableRule, Rule, SelectionNote, UsageRecord, UsageSnapshot,
};
