//! # Document Actor
//!
//! One Tokio task owns every collection and handles [`DatastoreRequest`]s one
//! at a time, so each request is atomic with respect to all others. Callers
//! talk to it through cloned [`DatastoreClient`]s; the actor stops once the
//! last client is dropped.
//!
//! ```rust,no_run
//! use resource_store::store::DocumentActor;
//!
//! # async fn demo() {
//! let (actor, client) = DocumentActor::new(32);
//! let handle = tokio::spawn(actor.run());
//! // ... use `client` ...
//! drop(client);
//! handle.await.unwrap();
//! # }
//! ```

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{document_id, DatastoreClient, DatastoreRequest, DeleteResult, FindOptions, Mutation, Query, UpdateResult};
use crate::framework::StoreError;

pub struct DocumentActor {
    receiver: mpsc::Receiver<DatastoreRequest>,
    /// Documents per collection, in insertion order.
    collections: HashMap<String, Vec<Value>>,
}

impl DocumentActor {
    pub fn new(buffer_size: usize) -> (Self, DatastoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            collections: HashMap::new(),
        };
        (actor, DatastoreClient::new(sender))
    }

    pub async fn run(mut self) {
        info!("Document actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                DatastoreRequest::Insert { collection, document, respond_to } => {
                    let result = self.insert(&collection, document);
                    let _ = respond_to.send(result);
                }
                DatastoreRequest::Find { collection, query, options, respond_to } => {
                    let found = self.find(&collection, &query, &options);
                    debug!(%collection, ?query, found = found.len(), "Find");
                    let _ = respond_to.send(Ok(found));
                }
                DatastoreRequest::Update { collection, query, mutation, respond_to } => {
                    let result = self.update(&collection, &query, &mutation);
                    let _ = respond_to.send(Ok(result));
                }
                DatastoreRequest::Delete { collection, query, respond_to } => {
                    let result = self.delete(&collection, &query);
                    let _ = respond_to.send(Ok(result));
                }
            }
        }

        let documents: usize = self.collections.values().map(Vec::len).sum();
        info!(collections = self.collections.len(), documents, "Shutdown");
    }

    fn insert(&mut self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let id = document_id(&document)?;
        let documents = self.collections.entry(collection.to_string()).or_default();
        if documents.iter().any(|d| d.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            warn!(collection, %id, "Duplicate id");
            return Err(StoreError::Internal(format!("duplicate id {} in {}", id, collection)));
        }
        documents.push(document.clone());
        info!(collection, %id, size = documents.len(), "Inserted");
        Ok(document)
    }

    fn find(&self, collection: &str, query: &Query, options: &FindOptions) -> Vec<Value> {
        let matched = self
            .collections
            .get(collection)
            .map(|documents| documents.iter().filter(|d| query.matches(d)).cloned().collect())
            .unwrap_or_default();
        options.apply(matched)
    }

    fn update(&mut self, collection: &str, query: &Query, mutation: &Mutation) -> UpdateResult {
        let mut result = UpdateResult::default();
        if let Some(documents) = self.collections.get_mut(collection) {
            for document in documents.iter_mut().filter(|d| query.matches(d)) {
                result.matched += 1;
                if mutation.apply(document) {
                    result.modified += 1;
                }
            }
        }
        info!(collection, matched = result.matched, modified = result.modified, "Updated");
        result
    }

    fn delete(&mut self, collection: &str, query: &Query) -> DeleteResult {
        let mut deleted = 0;
        if let Some(documents) = self.collections.get_mut(collection) {
            let before = documents.len();
            documents.retain(|d| !query.matches(d));
            deleted = before - documents.len();
        }
        info!(collection, deleted, "Deleted");
        DeleteResult { deleted }
    }
}
