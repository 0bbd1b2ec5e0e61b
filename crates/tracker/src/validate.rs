//! Shape checks for the untrusted review-status payload.
//!
//! Every field access goes through `get`, never indexing: fields may vanish from the
//! upstream response at any time and that has to surface as a typed error.

use serde_json::Value;

use verdict_common::error::RelayError;

/// Check the response shape and return its homework list, most recent first.
///
/// An empty list is valid. A missing or null `homeworks`/`current_date` is not.
pub fn check_response(response: &Value) -> Result<&[Value], RelayError> {
    let Some(fields) = response.as_object() else {
        return Err(RelayError::type_mismatch("response", "object", response));
    };

    let homeworks = present(fields.get("homeworks"), "homeworks")?;
    let current_date = present(fields.get("current_date"), "current_date")?;

    let Some(homeworks) = homeworks.as_array() else {
        return Err(RelayError::type_mismatch("homeworks", "array", homeworks));
    };

    if current_date.as_i64().is_none() {
        return Err(RelayError::type_mismatch(
            "current_date",
            "integer",
            current_date,
        ));
    }

    Ok(homeworks)
}

/// Server-echoed `current_date`, if it is usable as a cursor.
pub fn current_date(response: &Value) -> Option<i64> {
    response.get("current_date").and_then(Value::as_i64)
}

fn present<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a Value, RelayError> {
    match value {
        None | Some(Value::Null) => Err(RelayError::MissingField(field.to_string())),
        Some(value) => Ok(value),
    }
}
