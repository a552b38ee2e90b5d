//! Demo: a small `person` registry on the configured datastore.
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! RESOURCE_STORE_CONFIG=store.toml cargo run
//! ```

use resource_store::config::StoreConfig;
use resource_store::framework::{Action, Context, RegistryBuilder, StoreError};
use resource_store::lifecycle::{setup_tracing, StoreSystem};
use resource_store::model::{
    AccessMode, AccessStrategyDeclaration, Body, CreateOptions, FieldDeclaration, ListParams,
    ResourceTypeDeclaration,
};
use serde_json::json;
use tracing::{error, info, Instrument};

fn body(value: serde_json::Value) -> Body {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    let config = StoreConfig::load()?;
    setup_tracing(&config.logging.filter);

    info!("Starting resource store demo");

    let registry = RegistryBuilder::new()
        .with_builtins()
        .resource_type(
            ResourceTypeDeclaration::new("person")
                .field(FieldDeclaration::new("name", "text").required().param("max_length", json!(64)))
                .field(FieldDeclaration::new("email", "email").required())
                .field(FieldDeclaration::new("age", "int").human_readable("Age in years"))
                .field(FieldDeclaration::new("active", "boolean"))
                .access_strategy(
                    AccessStrategyDeclaration::all("public")
                        .action(Action::Update, "owner")
                        .action(Action::Delete, "owner"),
                ),
        )
        .build()?;

    let system = StoreSystem::start(&config, registry)?;
    let manager = &system.manager;
    let alice = Context::for_user("alice").with_remote_address("127.0.0.1");

    let span = tracing::info_span!("person_creation");
    let created = async {
        manager
            .create(
                &alice,
                "person",
                body(json!({"name": "Alice", "email": "alice@example.com", "age": "34", "active": "TRUE"})),
                CreateOptions::default(),
            )
            .await
    }
    .instrument(span)
    .await?;
    info!(id = %created.id, body = %serde_json::Value::Object(created.body.clone()), "Person created");

    let rejected = manager
        .create(&alice, "person", body(json!({"name": 7, "email": "nope", "nickname": "al"})), CreateOptions::default())
        .await;
    if let Err(e) = rejected {
        info!(error = %e, "Invalid payload rejected");
    }

    let patched = manager
        .patch_resource(&alice, "person", &created.id, body(json!({"active": false})))
        .await?;
    info!(body = %serde_json::Value::Object(patched.body.clone()), "Person patched");

    match manager
        .patch_resource(&Context::for_user("mallory"), "person", &created.id, body(json!({"age": 1})))
        .await
    {
        Ok(_) => error!("Patch by a stranger was accepted"),
        Err(e) => info!(error = %e, "Patch by a stranger refused"),
    }

    manager
        .edit_resource_access_mode(&alice, "person", &created.id, AccessMode::new("public"))
        .await?;
    let public = manager.search_by_mode(&alice, "person", "public").await?;
    info!(count = public.len(), "Public people");

    let found = manager.search(&Context::anonymous(), "person", "name", "^ali").await?;
    info!(count = found.len(), "Search by name");

    let listed = manager
        .list_by_type(&Context::anonymous(), "person", ListParams::sorted_by("name"))
        .await?;
    info!(count = listed.len(), "Listed people");

    let signature = manager.get_resource_type_signature(&alice, "person").await?;
    info!(signature = %serde_json::to_string(&signature)?, "Schema");

    manager.delete(&alice, "person", &created.id).await?;

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
