//! Result Normalizer
//!
//! Gives handler results the response shape a real client produces: a
//! metadata container with a status code and a request identifier.

use crate::config::MockConfig;
use crate::result::{MockError, MockResult};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Metadata field holding the status code
pub const STATUS_CODE_FIELD: &str = "httpStatusCode";
/// Metadata field holding the request identifier
pub const REQUEST_ID_FIELD: &str = "requestId";

/// Whether `value` counts as "no result"
///
/// `null`, `false`, zero and the empty string are falsy.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Shape a handler's JSON result into a response
///
/// Objects gain a metadata container if they lack one, and an existing
/// container gains a request identifier if it lacks one. Fields the handler
/// supplied are kept verbatim. Other truthy values pass through unchanged.
pub fn normalize(
    value: Value,
    config: &MockConfig,
    client: &str,
    command: &str,
) -> MockResult<Value> {
    if is_falsy(&value) {
        return Err(MockError::EmptyResult {
            client: client.to_string(),
            command: command.to_string(),
        });
    }

    let mut output = match value {
        Value::Object(output) => output,
        other => return Ok(other),
    };

    let has_metadata = output
        .get(&config.metadata_key)
        .is_some_and(|metadata| !is_falsy(metadata));
    if !has_metadata {
        output.insert(
            config.metadata_key.clone(),
            json!({
                STATUS_CODE_FIELD: config.status_code,
                REQUEST_ID_FIELD: new_request_id(),
            }),
        );
    } else if let Some(Value::Object(metadata)) = output.get_mut(&config.metadata_key) {
        ensure_request_id(metadata);
    }

    Ok(Value::Object(output))
}

fn ensure_request_id(metadata: &mut Map<String, Value>) {
    let missing = metadata.get(REQUEST_ID_FIELD).map_or(true, is_falsy);
    if missing {
        metadata.insert(REQUEST_ID_FIELD.to_string(), Value::String(new_request_id()));
    }
}

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}
