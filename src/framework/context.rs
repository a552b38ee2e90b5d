//! Request context: who is acting, when, and from where.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable snapshot of the request that triggers an operation.
///
/// Every [`ResourceManager`](crate::manager::ResourceManager) operation takes a
/// context first. Writes copy it verbatim into `created_context` /
/// `last_modified_context`, so two contexts compare equal exactly when all of
/// their fields do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl Context {
    /// A context with no logged-in user, stamped now.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            timestamp: Utc::now(),
            remote_address: None,
            attributes: BTreeMap::new(),
        }
    }

    /// A context acting on behalf of `user_id`, stamped now.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::anonymous()
        }
    }

    pub fn with_remote_address(mut self, address: impl Into<String>) -> Self {
        self.remote_address = Some(address.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn is_logged_in(&self) -> bool {
        self.user_id.is_some()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::anonymous()
    }
}
