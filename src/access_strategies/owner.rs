use async_trait::async_trait;

use crate::framework::{AccessItem, AccessStrategy, Context, StoreError};

/// Only the owner of the item. A new item may be created by any logged-in
/// user, who then becomes its owner by default.
pub struct Owner;

#[async_trait]
impl AccessStrategy for Owner {
    fn name(&self) -> &str {
        "owner"
    }

    fn item_sensitive(&self) -> bool {
        true
    }

    async fn check(&self, ctx: &Context, item: AccessItem<'_>) -> Result<(), StoreError> {
        let Some(user_id) = ctx.user_id.as_deref() else {
            return Err(StoreError::permission(self.name(), "you are not logged in"));
        };
        match item {
            AccessItem::Absent => Err(StoreError::permission(self.name(), "no item provided")),
            AccessItem::New => Ok(()),
            AccessItem::Existing(resource) if resource.owner.as_deref() == Some(user_id) => Ok(()),
            AccessItem::Existing(_) => {
                Err(StoreError::permission(self.name(), "you are not the owner of this item"))
            }
        }
    }
}
