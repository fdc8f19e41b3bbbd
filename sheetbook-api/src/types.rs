//! Response bodies shared by the route handlers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetbook_core::Record;

/// Body of every successful write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResponse {
    pub success: bool,
    pub message: String,
    /// Raw response of the store's write call.
    pub updates: Value,
    /// Non-fatal problems, such as a background color that could not be set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl WriteResponse {
    pub fn new(message: impl Into<String>, updates: Value, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            updates,
            warnings,
        }
    }
}

/// Body of `GET /api/get-all-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllDataResponse {
    pub registro: Vec<Record>,
    pub metas: Vec<Record>,
    pub organizadores: Vec<Record>,
}
