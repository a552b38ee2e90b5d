//! Per-operation option structs. Every field has a default, so callers only
//! name what they want to change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for [`ResourceManager::create`](crate::manager::ResourceManager::create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Owner of the new resource. `None` means the context's user.
    pub owner: Option<String>,
    /// Access mode. `None` means the configured default (`"private"`).
    pub access_mode: Option<String>,
    pub access_mode_args: Value,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            owner: None,
            access_mode: None,
            access_mode_args: Value::Array(Vec::new()),
        }
    }
}

/// Ordering and paging for list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Body field to sort on. `None` keeps store order.
    pub sort_by: Option<String>,
    pub descending: bool,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl ListParams {
    pub fn sorted_by(field: impl Into<String>) -> Self {
        Self {
            sort_by: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn page(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }
}
