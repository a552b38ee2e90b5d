//! # Document storage
//!
//! The resource manager persists JSON documents through the [`Datastore`]
//! trait. Three implementations are provided:
//!
//! - [`DatastoreClient`] talks to an in-process [`DocumentActor`] (the default),
//! - [`SledDatastore`] keeps one `sled` tree per collection on disk,
//! - [`MockDatastore`] answers from queued expectations, for tests.
//!
//! Every document carries a string `id`, unique within its collection.

pub mod actor;
pub mod client;
pub mod message;
pub mod mock;
pub mod query;
pub mod sled_store;

pub use actor::DocumentActor;
pub use client::DatastoreClient;
pub use message::{DatastoreRequest, Response};
pub use mock::MockDatastore;
pub use query::{lookup, Condition, FindOptions, Mutation, Query};
pub use sled_store::SledDatastore;

use async_trait::async_trait;
use serde_json::Value;

use crate::framework::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: usize,
    pub modified: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted: usize,
}

#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// Stores a new document and returns it as stored.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError>;

    async fn find(
        &self,
        collection: &str,
        query: Query,
        options: FindOptions,
    ) -> Result<Vec<Value>, StoreError>;

    async fn update(
        &self,
        collection: &str,
        query: Query,
        mutation: Mutation,
    ) -> Result<UpdateResult, StoreError>;

    async fn delete(&self, collection: &str, query: Query) -> Result<DeleteResult, StoreError>;
}

/// Extracts the `id` every stored document must carry.
pub(crate) fn document_id(document: &Value) -> Result<String, StoreError> {
    document
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Internal("document has no string `id`".to_string()))
}
