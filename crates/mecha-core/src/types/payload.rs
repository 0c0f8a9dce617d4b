//! Successful response bodies.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// The body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A JSON document.
    Json(Value),
    /// A non-JSON body, returned verbatim.
    Text(String),
    /// 204, or a success response with an empty body.
    NoContent,
}

impl Payload {
    pub fn is_no_content(&self) -> bool {
        matches!(self, Payload::NoContent)
    }

    /// Decode the payload into `T`.
    ///
    /// `NoContent` decodes as JSON `null`, so `()` and `Option<_>` targets
    /// accept it. Text decodes as a JSON string.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        let value = match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
            Payload::NoContent => Value::Null,
        };
        serde_json::from_value(value).map_err(|e| Error::Decode {
            message: e.to_string(),
        })
    }
}
