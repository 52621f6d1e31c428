//! Validation and formatting of review API payloads.
//!
//! The remote payload has no contractual shape, so everything here works on
//! `serde_json::Value` and checks each field before use.

use serde_json::Value;

use crate::{config::Verdicts, domain::HomeworkStatus, errors::Error, Result};

/// Validate a raw API payload and return its homework records unchanged.
///
/// A top-level array is normalized to its first element.
pub fn check_response(payload: Value) -> Result<Vec<Value>> {
    let payload = match payload {
        Value::Array(items) => items.into_iter().next().ok_or_else(|| {
            Error::Response("api answer is an empty list".to_string())
        })?,
        other => other,
    };

    let mut map = match payload {
        Value::Object(map) => map,
        other => {
            return Err(Error::Response(format!(
                "api answer is not a mapping: {}",
                type_name(&other)
            )))
        }
    };

    match map.remove("homeworks") {
        Some(Value::Array(homeworks)) => Ok(homeworks),
        Some(other) => Err(Error::Response(format!(
            "`homeworks` is not a list: {}",
            type_name(&other)
        ))),
        None => Err(Error::Response("`homeworks` key is missing".to_string())),
    }
}

/// Build the status-change message for one homework record.
///
/// Returns `Ok(None)` when the record carries no status, which means
/// "nothing changed" for this record.
pub fn parse_status(homework: &Value, verdicts: &Verdicts) -> Result<Option<String>> {
    let Value::Object(map) = homework else {
        return Err(Error::Response(format!(
            "homework record is not a mapping: {}",
            type_name(homework)
        )));
    };

    let name = match map.get("homework_name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(Error::Response(format!(
                "`homework_name` is not a string: {}",
                type_name(other)
            )))
        }
        None => return Err(Error::Response("`homework_name` key is missing".to_string())),
    };

    let raw_status = match map.get("status") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            return Err(Error::Status(format!(
                "status of {name:?} is not a string: {other}"
            )))
        }
    };
    let Some(raw_status) = raw_status else {
        tracing::debug!("homework {name:?} has no status; nothing changed");
        return Ok(None);
    };

    let status = raw_status
        .parse::<HomeworkStatus>()
        .map_err(|_| Error::Status(format!("unknown homework status {raw_status:?}")))?;

    Ok(Some(status_message(name, verdicts.verdict(status))))
}

pub fn status_message(homework_name: &str, verdict: &str) -> String {
    format!("Изменился статус проверки работы \"{homework_name}\". {verdict}")
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
