use serde_json::Value;

use verdict_common::error::RelayError;
use verdict_common::types::HomeworkStatus;

/// Turn a single homework record into the notification text.
pub fn describe_verdict(record: &Value) -> Result<String, RelayError> {
    let Some(fields) = record.as_object() else {
        return Err(RelayError::type_mismatch("homework", "object", record));
    };

    let name = match fields.get("homework_name") {
        None | Some(Value::Null) => {
            return Err(RelayError::MissingField("homework_name".to_string()));
        }
        Some(Value::String(name)) => name,
        Some(other) => return Err(RelayError::type_mismatch("homework_name", "string", other)),
    };

    let raw_status = fields.get("status").and_then(Value::as_str);
    let status = raw_status
        .and_then(HomeworkStatus::from_api)
        .ok_or_else(|| RelayError::UnknownStatus {
            status: raw_status.map(str::to_string),
        })?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.verdict()
    ))
}
