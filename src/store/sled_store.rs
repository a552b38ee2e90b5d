//! Persistent [`Datastore`] on top of `sled`.
//!
//! Each collection is a tree; documents are stored as JSON under their `id`.
//! Iteration order is key order. sled is synchronous, so every request runs on
//! the blocking pool and writes are flushed before they are acknowledged.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task;
use tracing::{debug, info, warn};

use super::{document_id, Datastore, DeleteResult, FindOptions, Mutation, Query, UpdateResult};
use crate::framework::StoreError;

#[derive(Clone)]
pub struct SledDatastore {
    db: sled::Db,
}

impl SledDatastore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Opened sled datastore");
        Ok(Self { db })
    }

    /// A datastore removed from disk when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Runs `work` against the tree of `collection` off the async runtime.
    async fn blocking<T, F>(&self, collection: &str, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(sled::Tree) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        let collection = collection.to_string();
        task::spawn_blocking(move || work(db.open_tree(collection)?))
            .await
            .map_err(|e| StoreError::Internal(format!("sled task failed: {}", e)))?
    }
}

fn matching(tree: &sled::Tree, query: &Query) -> Result<Vec<(sled::IVec, Value)>, StoreError> {
    let mut matched = Vec::new();
    for entry in tree.iter() {
        let (key, bytes) = entry?;
        let document: Value = serde_json::from_slice(&bytes)?;
        if query.matches(&document) {
            matched.push((key, document));
        }
    }
    Ok(matched)
}

#[async_trait]
impl Datastore for SledDatastore {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let id = document_id(&document)?;
        let bytes = serde_json::to_vec(&document)?;
        let key = id.clone();
        let inserted = self
            .blocking(collection, move |tree| {
                if tree.compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(bytes))?.is_err() {
                    return Ok(None);
                }
                tree.flush()?;
                Ok(Some(tree.len()))
            })
            .await?;
        let Some(size) = inserted else {
            warn!(collection, %id, "Duplicate id");
            return Err(StoreError::Internal(format!("duplicate id {} in {}", id, collection)));
        };
        info!(collection, %id, size, "Inserted");
        Ok(document)
    }

    async fn find(
        &self,
        collection: &str,
        query: Query,
        options: FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        debug!(collection, ?query, "Find");
        let found = self
            .blocking(collection, move |tree| {
                let found: Vec<Value> = matching(&tree, &query)?.into_iter().map(|(_, d)| d).collect();
                Ok(options.apply(found))
            })
            .await?;
        debug!(collection, found = found.len(), "Found");
        Ok(found)
    }

    async fn update(
        &self,
        collection: &str,
        query: Query,
        mutation: Mutation,
    ) -> Result<UpdateResult, StoreError> {
        let result = self
            .blocking(collection, move |tree| {
                let mut result = UpdateResult::default();
                for (key, mut document) in matching(&tree, &query)? {
                    result.matched += 1;
                    if mutation.apply(&mut document) {
                        tree.insert(key, serde_json::to_vec(&document)?)?;
                        result.modified += 1;
                    }
                }
                tree.flush()?;
                Ok(result)
            })
            .await?;
        info!(collection, matched = result.matched, modified = result.modified, "Updated");
        Ok(result)
    }

    async fn delete(&self, collection: &str, query: Query) -> Result<DeleteResult, StoreError> {
        let deleted = self
            .blocking(collection, move |tree| {
                let mut deleted = 0usize;
                for (key, _) in matching(&tree, &query)? {
                    if tree.remove(key)?.is_some() {
                        deleted += 1;
                    }
                }
                tree.flush()?;
                Ok(deleted)
            })
            .await?;
        info!(collection, deleted, "Deleted");
        Ok(DeleteResult { deleted })
    }
}
