//! Messages understood by the [`DocumentActor`](super::DocumentActor).

use serde_json::Value;
use tokio::sync::oneshot;

use super::{DeleteResult, FindOptions, Mutation, Query, UpdateResult};
use crate::framework::StoreError;

/// Reply channel of a request.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum DatastoreRequest {
    Insert {
        collection: String,
        document: Value,
        respond_to: Response<Value>,
    },
    Find {
        collection: String,
        query: Query,
        options: FindOptions,
        respond_to: Response<Vec<Value>>,
    },
    Update {
        collection: String,
        query: Query,
        mutation: Mutation,
        respond_to: Response<UpdateResult>,
    },
    Delete {
        collection: String,
        query: Query,
        respond_to: Response<DeleteResult>,
    },
}
