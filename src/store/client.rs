use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::{Datastore, DatastoreRequest, DeleteResult, FindOptions, Mutation, Query, UpdateResult};
use crate::framework::StoreError;

const ACTOR_CLOSED: &str = "datastore actor closed";
const ACTOR_DROPPED: &str = "datastore actor dropped response channel";

/// Cheaply cloneable handle to a [`DocumentActor`](super::DocumentActor).
#[derive(Clone)]
pub struct DatastoreClient {
    sender: mpsc::Sender<DatastoreRequest>,
}

impl DatastoreClient {
    pub fn new(sender: mpsc::Sender<DatastoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, StoreError>>) -> DatastoreRequest,
    ) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::Internal(ACTOR_CLOSED.to_string()))?;
        response
            .await
            .map_err(|_| StoreError::Internal(ACTOR_DROPPED.to_string()))?
    }
}

#[async_trait]
impl Datastore for DatastoreClient {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let collection = collection.to_string();
        self.request(|respond_to| DatastoreRequest::Insert { collection, document, respond_to })
            .await
    }

    async fn find(
        &self,
        collection: &str,
        query: Query,
        options: FindOptions,
    ) -> Result<Vec<Value>, StoreError> {
        let collection = collection.to_string();
        self.request(|respond_to| DatastoreRequest::Find { collection, query, options, respond_to })
            .await
    }

    async fn update(
        &self,
        collection: &str,
        query: Query,
        mutation: Mutation,
    ) -> Result<UpdateResult, StoreError> {
        let collection = collection.to_string();
        self.request(|respond_to| DatastoreRequest::Update { collection, query, mutation, respond_to })
            .await
    }

    async fn delete(&self, collection: &str, query: Query) -> Result<DeleteResult, StoreError> {
        let collection = collection.to_string();
        self.request(|respond_to| DatastoreRequest::Delete { collection, query, respond_to })
            .await
    }
}
