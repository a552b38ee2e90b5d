//! # Resource Store
//!
//! > **Schema-driven resources with per-field validation and per-action access control.**
//!
//! An application declares named *resource types* (field name → field type,
//! plus an access strategy per action) and then creates, reads, lists, finds,
//! searches, updates, patches and deletes instances of them. Every write runs
//! the payload through the type's fields and records who made it and when.
//!
//! ## Core Concepts
//!
//! ### The pipeline
//! `payload → validate (all fields at once) → encode → access check → datastore → decode → representation`
//!
//! - **Validation never stops early.** Every field check runs concurrently and
//!   all problems come back in one [`StoreError::Validation`](framework::StoreError::Validation),
//!   keyed by field name.
//! - **Old values on demand.** A field type can ask for the previously stored
//!   value (e.g. "may never change"). Only field types that declare the need
//!   receive it.
//! - **Item-sensitive access.** Strategies like `owner` look at the record they
//!   guard; on create they get an explicit "new item" marker.
//!
//! ### Update vs patch
//! `update_resource` replaces the body (absent fields become `null`),
//! `patch_resource` merges the given fields.
//!
//! ## Module Tour
//!
//! ### 1. The Schema Engine ([`framework`])
//! Field types, access strategies, resource types, the [`Registry`](framework::Registry)
//! and the error type.
//!
//! ### 2. The Built-ins ([`field_types`], [`access_strategies`])
//! `boolean`, `email`, `text`, `int`; `public`, `noone`, `logged_in`, `owner`.
//!
//! ### 3. The Manager ([`manager`])
//! [`ResourceManager`](manager::ResourceManager): every lifecycle operation.
//!
//! ### 4. Storage ([`store`])
//! The [`Datastore`](store::Datastore) trait, an actor-backed in-memory store,
//! a `sled` store and a mock for tests.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! [`StoreSystem`](lifecycle::StoreSystem) starts the configured datastore and
//! shuts it down; [`setup_tracing`](lifecycle::setup_tracing) installs logging.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resource_store::config::StoreConfig;
//! use resource_store::framework::{Context, RegistryBuilder};
//! use resource_store::lifecycle::StoreSystem;
//! use resource_store::model::{CreateOptions, FieldDeclaration, ResourceTypeDeclaration};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), resource_store::framework::StoreError> {
//! let registry = RegistryBuilder::new()
//!     .with_builtins()
//!     .resource_type(
//!         ResourceTypeDeclaration::new("person")
//!             .field(FieldDeclaration::new("name", "text").required())
//!             .field(FieldDeclaration::new("email", "email")),
//!     )
//!     .build()?;
//!
//! let system = StoreSystem::start(&StoreConfig::default(), registry)?;
//! let ctx = Context::for_user("alice");
//! let body = json!({"name": "Alice", "email": "alice@example.com"});
//! let alice = system
//!     .manager
//!     .create(&ctx, "person", body.as_object().cloned().unwrap_or_default(), CreateOptions::default())
//!     .await?;
//! assert_eq!(alice.owner.as_deref(), Some("alice"));
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod access_strategies;
pub mod config;
pub mod field_types;
pub mod framework;
pub mod lifecycle;
pub mod manager;
pub mod model;
pub mod store;
