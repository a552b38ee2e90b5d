use async_trait::async_trait;

use crate::framework::{AccessItem, AccessStrategy, Context, StoreError};

/// Everyone, including anonymous contexts.
pub struct Public;

#[async_trait]
impl AccessStrategy for Public {
    fn name(&self) -> &str {
        "public"
    }

    async fn check(&self, _ctx: &Context, _item: AccessItem<'_>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Nobody.
pub struct Noone;

#[async_trait]
impl AccessStrategy for Noone {
    fn name(&self) -> &str {
        "noone"
    }

    async fn check(&self, _ctx: &Context, _item: AccessItem<'_>) -> Result<(), StoreError> {
        Err(StoreError::permission(self.name(), "nobody is allowed"))
    }
}

/// Any context with a user id.
pub struct LoggedIn;

#[async_trait]
impl AccessStrategy for LoggedIn {
    fn name(&self) -> &str {
        "logged_in"
    }

    async fn check(&self, ctx: &Context, _item: AccessItem<'_>) -> Result<(), StoreError> {
        if ctx.is_logged_in() {
            Ok(())
        } else {
            Err(StoreError::permission(self.name(), "you are not logged in"))
        }
    }
}
