use std::io;

use cardwise_client::{ClientError, FailureEnvelope, SuccessEnvelope};
use serde::Serialize;
use serde_json::json;

/// `{ok, version, data}`; the command name is implied by the invocation.
pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let payload = json!({
        "ok": success.ok,
        "version": success.version,
        "data": success.data,
    });
    serialize_json_pretty(&payload)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    serialize_json_pretty(&FailureEnvelope::from(error))
}

fn serialize_json_pretty<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
