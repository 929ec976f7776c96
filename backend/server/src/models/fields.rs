use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Attributes, ValidationError};

/// Deserializes a payload into its draft shape. Shape errors are the client's fault.
pub fn draft<T: DeserializeOwned>(payload: Value) -> Result<T, ValidationError> {
    if !payload.is_object() {
        return Err(ValidationError::Invalid("Request body must be a JSON object".to_string()));
    }

    serde_json::from_value(payload)
        .map_err(|e| ValidationError::Invalid(format!("Invalid field format: {e}")))
}

pub fn required_text(value: Option<String>) -> Result<String, ValidationError> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingFields)
}

pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn required_list(value: Option<Vec<String>>) -> Result<Vec<String>, ValidationError> {
    value
        .filter(|items| !items.is_empty())
        .ok_or(ValidationError::MissingFields)
}

pub fn list(value: Option<Vec<String>>) -> Vec<String> {
    value.unwrap_or_default()
}

pub fn attributes(value: Option<Attributes>) -> Attributes {
    value.unwrap_or_default()
}

/// Display text that clients may send as a JSON string or number.
pub fn display_text(value: Option<Value>, field: &str) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingFields),
        Some(Value::String(s)) => required_text(Some(s)),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ValidationError::Invalid(format!("{field} must be text"))),
    }
}

/// Integer that clients may send as a JSON number or an integer string.
pub fn integer(value: Option<Value>, field: &str) -> Result<i64, ValidationError> {
    let invalid = || ValidationError::Invalid(format!("{field} must be a whole number"));

    match value {
        None | Some(Value::Null) => Err(ValidationError::MissingFields),
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingFields),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
