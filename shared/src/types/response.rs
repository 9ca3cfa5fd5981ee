//! API response envelope

use serde::{Deserialize, Serialize};

use crate::errors::{code_text, error_codes};
use crate::types::Language;

/// Envelope returned by every endpoint: `{"code": .., "msg": .., "data": ..}`.
///
/// `code` is `0` on success and a business code from
/// [`error_codes`](crate::errors::error_codes) otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse<T = serde_json::Value> {
    pub code: i32,
    pub msg: String,
    pub data: T,
}

impl<T: Serialize> JsonResponse<T> {
    /// Successful response carrying `data`
    pub fn success(data: T, lang: Language) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: code_text(error_codes::SUCCESS, lang).to_string(),
            data,
        }
    }
}

impl JsonResponse<serde_json::Value> {
    /// Failure response with an empty object as data
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Failure response using the catalogue text for `code`
    pub fn error_auto_msg(code: i32, lang: Language) -> Self {
        Self::error(code, code_text(code, lang))
    }

    /// Check if the response is successful
    pub fn is_success(&self) -> bool {
        self.code == error_codes::SUCCESS
    }
}
