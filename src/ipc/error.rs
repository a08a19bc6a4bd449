use crate::error::StoreError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

#[derive(Debug)]
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn bad_params(message: impl Into<String>) -> Self {
        HandlerErr {
            code: "bad_params",
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let (code, details) = match &e {
            StoreError::Io { path, .. } => {
                ("store_io_failed", Some(json!({ "path": path.to_string_lossy() })))
            }
            StoreError::Parse { path, .. } => (
                "store_parse_failed",
                Some(json!({ "path": path.to_string_lossy() })),
            ),
            StoreError::Serialize(_) => ("store_io_failed", None),
            StoreError::LockTimeout { path, .. } => {
                ("store_locked", Some(json!({ "lock": path.to_string_lossy() })))
            }
        };
        HandlerErr {
            code,
            message: e.to_string(),
            details,
        }
    }
}

/// Wraps a handler outcome in the response envelope.
pub fn respond(id: &str, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => {
            tracing::warn!(code = e.code, message = %e.message, "request failed");
            e.response(id)
        }
    }
}
