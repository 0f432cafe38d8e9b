//! The API server's JSON response envelope.
//!
//! Every successful response has the shape
//! `{ statusCode, data, message, success: true }` and every failure
//! `{ success: false, statusCode, message, errors }`. The envelope is
//! decoded here once; typed payloads are extracted at the call site.

use serde::Deserialize;
use serde_json::Value;

use crate::Result;

/// A successful response envelope with the payload left as raw JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub message: String,
    pub success: bool,
}

impl Envelope {
    /// Deserialize the `data` payload into a typed value.
    pub fn into_data<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}

/// The error-envelope body sent with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub status_code: u16,
    pub message: String,
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub success: bool,
}
