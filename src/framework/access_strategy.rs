//! # Access Strategies
//!
//! An access strategy is a named predicate deciding whether the request
//! described by a [`Context`] may perform an [`Action`] on a resource type.
//!
//! Item-sensitive strategies look at the concrete record (e.g. "only the
//! owner"), so they must be given one. [`check_access`] enforces that: it hands
//! the item to item-sensitive strategies, withholds it from the others, and
//! fails with "no item provided" when an item-sensitive strategy is consulted
//! without one.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::context::Context;
use super::error::StoreError;
use crate::model::ResourceRepresentation;

/// The actions a resource type maps to strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Retrieve,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// What the strategy is asked about.
#[derive(Debug, Clone, Copy)]
pub enum AccessItem<'a> {
    /// No item was supplied.
    Absent,
    /// The item is about to be created and has no stored state yet.
    New,
    /// A stored record.
    Existing(&'a ResourceRepresentation),
}

#[async_trait]
pub trait AccessStrategy: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Whether decisions depend on the record being acted on.
    fn item_sensitive(&self) -> bool {
        false
    }

    /// `Ok(())` when permitted, `Err(StoreError::Permission { .. })` when not.
    async fn check(&self, ctx: &Context, item: AccessItem<'_>) -> Result<(), StoreError>;
}

/// Runs `strategy` for `action`, applying the item-sensitivity rules.
pub async fn check_access(
    strategy: &Arc<dyn AccessStrategy>,
    action: Action,
    ctx: &Context,
    item: AccessItem<'_>,
) -> Result<(), StoreError> {
    let item = if strategy.item_sensitive() {
        if let AccessItem::Absent = item {
            warn!(strategy = strategy.name(), %action, "Item-sensitive strategy called without item");
            return Err(StoreError::permission(strategy.name(), "no item provided"));
        }
        item
    } else {
        AccessItem::Absent
    };

    let result = strategy.check(ctx, item).await;
    match &result {
        Ok(()) => debug!(strategy = strategy.name(), %action, "Access granted"),
        Err(e) => warn!(strategy = strategy.name(), %action, error = %e, "Access denied"),
    }
    result
}
