use crate::ipc::error::HandlerErr;
use crate::model::UnknownVariant;
use std::str::FromStr;

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

/// Absent and `null` both read as `None`.
pub fn get_optional_str(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

fn as_number(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numbers may arrive as JSON numbers or numeric strings.
pub fn get_required_f64(params: &serde_json::Value, key: &str) -> Result<f64, HandlerErr> {
    let v = params
        .get(key)
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))?;
    as_number(v)
        .filter(|n| n.is_finite())
        .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a number", key)))
}

/// Absent, `null` and `""` all read as `None`.
pub fn get_optional_f64(params: &serde_json::Value, key: &str) -> Result<Option<f64>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(_) => get_required_f64(params, key).map(Some),
    }
}

pub fn get_required_u32(params: &serde_json::Value, key: &str) -> Result<u32, HandlerErr> {
    let n = get_required_f64(params, key)?;
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return Err(HandlerErr::bad_params(format!(
            "{} must be a non-negative integer",
            key
        )));
    }
    Ok(n as u32)
}

/// Parses a closed-set value (subject, status) and rejects anything else.
pub fn get_required_parsed<T>(params: &serde_json::Value, key: &str) -> Result<T, HandlerErr>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw = get_required_str(params, key)?;
    raw.parse::<T>().map_err(|e| HandlerErr::bad_params(e.to_string()))
}

pub fn get_optional_parsed<T>(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<T>, HandlerErr>
where
    T: FromStr<Err = UnknownVariant>,
{
    match get_optional_str(params, key)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .parse::<T>()
            .map(Some)
            .map_err(|e| HandlerErr::bad_params(e.to_string())),
    }
}
