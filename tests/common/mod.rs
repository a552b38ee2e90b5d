#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use resource_store::framework::{
    AccessItem, AccessStrategy, Action, Context, FieldParams, FieldType, FieldVerdict, OldValueSensitivity,
    Registry, RegistryBuilder, StoreError,
};
use resource_store::manager::ResourceManager;
use resource_store::model::{AccessStrategyDeclaration, Body, FieldDeclaration, ResourceTypeDeclaration};
use resource_store::store::DocumentActor;
use serde_json::Value;
use tokio::task::JoinHandle;

pub fn body(value: Value) -> Body {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

pub struct AlwaysFails;

#[async_trait]
impl FieldType for AlwaysFails {
    fn name(&self) -> &str {
        "always_fails"
    }

    async fn is_proper_value(&self, _: &Context, _: &FieldParams, _: &Value, _: Option<&Value>) -> Result<FieldVerdict, StoreError> {
        Ok(FieldVerdict::reject("always fails"))
    }
}

pub struct NeverFails;

#[async_trait]
impl FieldType for NeverFails {
    fn name(&self) -> &str {
        "never_fails"
    }

    async fn is_proper_value(&self, _: &Context, _: &FieldParams, _: &Value, _: Option<&Value>) -> Result<FieldVerdict, StoreError> {
        Ok(FieldVerdict::Accept)
    }
}

/// Rejects unless it is handed an old value.
pub struct RequiresOldValue;

#[async_trait]
impl FieldType for RequiresOldValue {
    fn name(&self) -> &str {
        "requires_old_value"
    }

    fn old_value_sensitivity(&self) -> OldValueSensitivity {
        OldValueSensitivity { is_proper_value: true, encode: false }
    }

    async fn is_proper_value(&self, _: &Context, _: &FieldParams, _: &Value, old: Option<&Value>) -> Result<FieldVerdict, StoreError> {
        Ok(match old {
            Some(_) => FieldVerdict::Accept,
            None => FieldVerdict::reject("No old value provided!"),
        })
    }
}

/// Rejects whenever it is handed an old value.
pub struct RejectsWithOldValue;

#[async_trait]
impl FieldType for RejectsWithOldValue {
    fn name(&self) -> &str {
        "rejects_with_old_value"
    }

    async fn is_proper_value(&self, _: &Context, _: &FieldParams, _: &Value, old: Option<&Value>) -> Result<FieldVerdict, StoreError> {
        Ok(match old {
            Some(_) => FieldVerdict::reject("Old value provided"),
            None => FieldVerdict::Accept,
        })
    }
}

/// Accepts the first value, then only that same value.
pub struct AlwaysTheSame;

#[async_trait]
impl FieldType for AlwaysTheSame {
    fn name(&self) -> &str {
        "always_the_same"
    }

    fn old_value_sensitivity(&self) -> OldValueSensitivity {
        OldValueSensitivity { is_proper_value: true, encode: false }
    }

    async fn is_proper_value(&self, _: &Context, _: &FieldParams, value: &Value, old: Option<&Value>) -> Result<FieldVerdict, StoreError> {
        Ok(match old {
            Some(Value::Null) => FieldVerdict::Accept,
            Some(old) if old == value => FieldVerdict::Accept,
            _ => FieldVerdict::reject("value may not change"),
        })
    }
}

/// Allows any request that comes with an item, new or stored.
pub struct ItemSensitive;

#[async_trait]
impl AccessStrategy for ItemSensitive {
    fn name(&self) -> &str {
        "item_sensitive"
    }

    fn item_sensitive(&self) -> bool {
        true
    }

    async fn check(&self, _ctx: &Context, item: AccessItem<'_>) -> Result<(), StoreError> {
        match item {
            AccessItem::Absent => Err(StoreError::permission(self.name(), "No item provided")),
            _ => Ok(()),
        }
    }
}

fn single(name: &str, field: &str, type_name: &str) -> ResourceTypeDeclaration {
    ResourceTypeDeclaration::new(name).field(FieldDeclaration::new(field, type_name))
}

pub fn registry() -> Registry {
    RegistryBuilder::new()
        .with_builtins()
        .field_type(AlwaysFails)
        .field_type(NeverFails)
        .field_type(RequiresOldValue)
        .field_type(RejectsWithOldValue)
        .field_type(AlwaysTheSame)
        .access_strategy(ItemSensitive)
        .resource_type(ResourceTypeDeclaration::new("listable"))
        .resource_type(single("always_fails_resource", "#fail", "always_fails"))
        .resource_type(single("never_fails_resource", "#success", "never_fails"))
        .resource_type(single("old_value_sensitive", "value", "requires_old_value"))
        .resource_type(single("old_value_insensitive", "value", "rejects_with_old_value"))
        .resource_type(single("always_the_same", "value", "always_the_same"))
        .resource_type(
            ResourceTypeDeclaration::new("multifield")
                .field(FieldDeclaration::new("value1", "text"))
                .field(FieldDeclaration::new("value2", "text")),
        )
        .resource_type(
            ResourceTypeDeclaration::new("person")
                .field(FieldDeclaration::new("name", "text").required())
                .field(FieldDeclaration::new("email", "email").required())
                .field(FieldDeclaration::new("age", "int"))
                .access_strategy(
                    AccessStrategyDeclaration::all("public").action(Action::Update, "owner"),
                ),
        )
        .resource_type(
            ResourceTypeDeclaration::new("nobody_can_create_me")
                .access_strategy(AccessStrategyDeclaration::all("noone")),
        )
        .resource_type(
            single("nobody_can_update_me", "value", "text")
                .access_strategy(AccessStrategyDeclaration::default().action(Action::Update, "noone")),
        )
        .resource_type(
            single("nobody_can_delete_me", "value", "text")
                .access_strategy(AccessStrategyDeclaration::default().action(Action::Delete, "noone")),
        )
        .resource_type(
            single("nobody_can_list_me", "value", "text")
                .access_strategy(AccessStrategyDeclaration::default().action(Action::Retrieve, "noone")),
        )
        .resource_type(
            single("item_sensitive", "value", "text")
                .access_strategy(AccessStrategyDeclaration::all("item_sensitive")),
        )
        .build()
        .expect("test registry is valid")
}

/// A manager on a fresh in-memory datastore.
pub fn memory_manager() -> (ResourceManager, JoinHandle<()>) {
    let (actor, client) = DocumentActor::new(32);
    let handle = tokio::spawn(actor.run());
    (ResourceManager::new(Arc::new(registry()), Arc::new(client)), handle)
}
