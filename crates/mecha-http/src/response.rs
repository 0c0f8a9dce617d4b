//! Response classification.

use serde_json::Value;

use mecha_core::{ApiError, Error, FieldErrors, Payload, RawResponse, Result};

/// How the generic message reads when the server sent none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fallback {
    /// `HTTP <status>`
    Status,
    /// `Upload failed: HTTP <status>`
    Upload,
}

impl Fallback {
    fn message(self, status: u16) -> String {
        match self {
            Fallback::Status => format!("HTTP {status}"),
            Fallback::Upload => format!("Upload failed: HTTP {status}"),
        }
    }
}

/// Turn a fully-read response into a payload or a typed error.
pub(crate) fn classify(response: RawResponse, fallback: Fallback) -> Result<Payload> {
    if response.status == 204 {
        return Ok(Payload::NoContent);
    }

    if !response.is_success() {
        return Err(api_error(&response, fallback).into());
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::NoContent);
    }

    if response.is_json() {
        let value: Value = serde_json::from_slice(&response.body).map_err(|e| Error::Decode {
            message: e.to_string(),
        })?;
        return Ok(Payload::Json(value));
    }

    Ok(Payload::Text(
        String::from_utf8_lossy(&response.body).into_owned(),
    ))
}

/// Build the error for a non-success response from whatever its body holds.
pub(crate) fn api_error(response: &RawResponse, fallback: Fallback) -> ApiError {
    let body: Value = serde_json::from_slice(&response.body).unwrap_or(Value::Null);
    let text = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let message = text("message")
        .or_else(|| text("error"))
        .unwrap_or_else(|| fallback.message(response.status));
    let field_errors = body.get("errors").and_then(parse_field_errors);

    ApiError::new(response.status, message, field_errors)
}

// Accepts `{field: [msg, ..]}` as well as `{field: msg}`.
fn parse_field_errors(value: &Value) -> Option<FieldErrors> {
    let fields: FieldErrors = value
        .as_object()?
        .iter()
        .map(|(field, messages)| {
            let messages = match messages {
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                Value::String(s) => vec![s.clone()],
                other => vec![other.to_string()],
            };
            (field.clone(), messages)
        })
        .collect();
    (!fields.is_empty()).then_some(fields)
}
