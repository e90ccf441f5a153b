//! The backend's standard response body.

use serde::{Deserialize, Serialize};

/// `code` of a successful call.
pub const SUCCESS_CODE: i64 = 0;

/// `code` the backend uses for any failure.
pub const ERROR_CODE: i64 = 7;

/// `{ "code": 0, "data": ..., "msg": "..." }` as returned by every
/// `/riskbird/user/*` endpoint.
///
/// A failed operation still comes back as HTTP 200; only `code` tells
/// the two apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub code: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub msg: String,
}

impl ApiEnvelope {
    /// Read an envelope out of a raw response body.
    ///
    /// # Errors
    /// Returns the decoding error if the body is not envelope-shaped.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
