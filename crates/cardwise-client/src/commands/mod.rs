pub(crate) mod common;
pub mod hint;
pub mod history;
pub mod recommend;
pub mod record;
pub mod reset;
pub mod rules;
pub mod usage;
