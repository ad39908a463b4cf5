//! Response normalization
//!
//! Provider responses come in several shapes. Everything a handler returns goes
//! through [`normalize`] first, so callers only ever see one success envelope
//! and one error shape.

use crate::error::{GatewayError, Result};
use crate::executor::RawResponse;
use serde_json::{Value, json};

/// Fallback message when the provider reports a failure without a usable message
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Message for every non-200 answer in raw-text mode
pub const KEY_NOT_FOUND: &str = "Key not found";

/// How a raw response should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// JSON envelope with `success` / `errors`
    Structured,
    /// Value fetched by key, returned as text
    RawText,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    Success { payload: Value },
    RawSuccess { text: String },
    Failure { status: u16, message: String },
}

/// Map a raw provider response onto the internal result contract.
///
/// In [`ResponseMode::RawText`] every status other than 200 becomes
/// `Failure { message: "Key not found" }`, transient upstream errors included.
pub fn normalize(raw: RawResponse, mode: ResponseMode) -> NormalizedResult {
    match mode {
        ResponseMode::RawText => {
            if raw.status == 200 {
                NormalizedResult::RawSuccess { text: raw.body }
            } else {
                NormalizedResult::Failure {
                    status: raw.status,
                    message: KEY_NOT_FOUND.to_string(),
                }
            }
        }
        ResponseMode::Structured => match serde_json::from_str::<Value>(&raw.body) {
            Ok(payload) => {
                if payload.get("success") == Some(&Value::Bool(false)) {
                    NormalizedResult::Failure {
                        status: raw.status,
                        message: first_error_message(&payload),
                    }
                } else {
                    NormalizedResult::Success { payload }
                }
            }
            // Non-JSON bodies (e.g. BIND exports, script sources)
            Err(_) if raw.is_success() => NormalizedResult::Success {
                payload: Value::String(raw.body),
            },
            Err(_) => NormalizedResult::Failure {
                status: raw.status,
                message: UNKNOWN_ERROR.to_string(),
            },
        },
    }
}

/// Message of the first entry in `errors`, or the generic fallback
fn first_error_message(payload: &Value) -> String {
    payload
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

impl NormalizedResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, NormalizedResult::Failure { .. })
    }

    /// Turn the normalized result into what a handler returns
    pub fn into_reply(self) -> Result<Reply> {
        match self {
            NormalizedResult::Success { payload } => Ok(Reply::Result(unwrap_result(payload))),
            NormalizedResult::RawSuccess { text } => Ok(Reply::Text(text)),
            NormalizedResult::Failure { status, message } => {
                Err(GatewayError::upstream(status, message))
            }
        }
    }
}

/// The provider wraps payloads as `{ success, errors, messages, result }`;
/// callers only get `result`.
fn unwrap_result(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => match map.remove("result") {
            Some(result) => result,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Successful handler output
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Provider payload
    Result(Value),
    /// Raw value text
    Text(String),
    /// Captured output of the command-line backend
    Output { output: String, stderr: String },
}

impl Reply {
    /// Wire envelope for the internal REST surface
    pub fn to_envelope(&self) -> Value {
        match self {
            Reply::Result(result) => json!({ "success": true, "result": result }),
            Reply::Text(text) => json!({ "success": true, "result": text }),
            Reply::Output { output, stderr } => json!({
                "success": true,
                "output": output,
                "stderr": stderr,
            }),
        }
    }
}
