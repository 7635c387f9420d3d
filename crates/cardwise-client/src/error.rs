use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::engine::NoUsableRule;

pub(crate) const RULES_HELP_COMMAND: &str = "cardwise rules --help";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `cardwise {cmd} --help` for usage."),
            None => "Run `cardwise --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn catalog_not_found(path: &Path, kind: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "catalog_not_found",
            &format!("Could not read the {kind} file at `{location}`."),
            vec![
                format!("Create `{location}` or pass another path with `--{kind}`."),
                format!("Run `{RULES_HELP_COMMAND}` to review the catalog format."),
            ],
        )
        .with_data(json!({
            "path": location,
            "kind": kind,
        }))
    }

    pub fn catalog_invalid(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "catalog_invalid",
            &format!("Catalog file `{location}` is invalid: {detail}"),
            vec![
                "Fix the listed problem in the catalog file.".to_string(),
                format!("Run `{RULES_HELP_COMMAND}` to review the catalog format."),
            ],
        )
        .with_data(json!({
            "path": location,
        }))
    }

    pub fn no_usable_rule(reason: &NoUsableRule) -> Self {
        let mut error = Self::new(
            "no_usable_rule",
            &format!("No usable reward rule: {reason}."),
            vec![
                "Check the region passed with `--region`, or omit it to consider every rule."
                    .to_string(),
                "Run `cardwise rules` to see which regions the catalog covers.".to_string(),
            ],
        );
        let mut data = json!({ "reason": reason.reason() });
        if let NoUsableRule::NoRegionMatch { region } = reason
            && let Some(object) = data.as_object_mut()
        {
            object.insert("region".to_string(), Value::String(region.clone()));
        }
        error.data = Some(data);
        error
    }

    pub fn recommendation_not_found(rec_id: &str) -> Self {
        Self::new(
            "recommendation_not_found",
            &format!("Recommendation id `{rec_id}` was not found."),
            vec![
                "Run `cardwise recommend <merchant> <amount>` to create a new recommendation."
                    .to_string(),
                "Retry with `cardwise record <rec-id>` using the id it prints.".to_string(),
            ],
        )
        .with_data(json!({
            "rec_id": rec_id,
        }))
    }

    pub fn recommendation_already_recorded(rec_id: &str) -> Self {
        Self::new(
            "recommendation_already_recorded",
            &format!("Recommendation `{rec_id}` was already recorded. Usage was not changed."),
            vec![
                "Run `cardwise history` to see recorded transactions.".to_string(),
                "Run `cardwise recommend` again for a new purchase.".to_string(),
            ],
        )
        .with_data(json!({
            "rec_id": rec_id,
        }))
    }

    pub fn no_pending_recommendation() -> Self {
        Self::new(
            "no_pending_recommendation",
            "There is no pending recommendation to record.",
            vec!["Run `cardwise recommend <merchant> <amount>` first.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("Cannot initialize ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `CARDWISE_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Ledger database is locked at `{location}`."),
            vec![format!(
                "Close other processes using `{location}` so the lock is released."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("Ledger database appears corrupt at `{location}`."),
            vec![format!(
                "Replace `{location}` with a valid cardwise ledger or restore it from backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Ledger migration failed at `{location}`: {detail}"),
            vec!["Resolve conflicting schema objects referenced in the error details.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Ledger initialization failed at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    /// Failures the user cannot fix by changing their input.
    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_")
            || matches!(
                self.code.as_str(),
                "ledger_init_permission_denied"
                    | "ledger_locked"
                    | "ledger_corrupt"
                    | "migration_failed"
                    | "ledger_init_failed"
            )
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ClientError;
    use crate::engine::NoUsableRule;

    #[test]
    fn no_usable_rule_carries_reason_and_region() {
        let error = ClientError::no_usable_rule(&NoUsableRule::NoRegionMatch {
            region: "foreign".to_string(),
        });
        assert_eq!(error.code, "no_usable_rule");
        assert!(error.message.contains("foreign"));
        assert!(!error.is_internal());
        if let Some(data) = &error.data {
            assert_eq!(data["reason"], "no_region_match");
            assert_eq!(data["region"], "foreign");
        } else {
            panic!("expected error data");
        }
    }

    #[test]
    fn ledger_errors_are_internal() {
        assert!(ClientError::ledger_locked(Path::new("/tmp/ledger.db")).is_internal());
        assert!(ClientError::internal_serialization("boom").is_internal());
        assert!(!ClientError::invalid_argument("bad").is_internal());
    }
}
