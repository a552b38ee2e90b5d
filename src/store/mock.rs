//! # Mock Datastore
//!
//! A test double for the document store. Expectations are queued up front and
//! answered in order by a background task that stands in for the
//! [`DocumentActor`](super::DocumentActor); the code under test talks to it
//! through an ordinary [`DatastoreClient`].
//!
//! ```rust,no_run
//! use resource_store::store::{Datastore, FindOptions, MockDatastore, Query};
//!
//! # async fn demo() {
//! let mock = MockDatastore::new();
//! mock.expect_find().return_ok(vec![]);
//!
//! let found = mock.client().find("resources", Query::new(), FindOptions::default()).await;
//! assert_eq!(found.unwrap(), Vec::<serde_json::Value>::new());
//! mock.verify();
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;

use super::{DatastoreClient, DatastoreRequest, DeleteResult, UpdateResult};
use crate::framework::StoreError;

enum Expectation {
    Insert { response: Result<Value, StoreError> },
    Find { response: Result<Vec<Value>, StoreError> },
    Update { response: Result<UpdateResult, StoreError> },
    Delete { response: Result<DeleteResult, StoreError> },
}

type Expectations = Arc<Mutex<VecDeque<Expectation>>>;

pub struct MockDatastore {
    client: DatastoreClient,
    expectations: Expectations,
    received: Arc<AtomicUsize>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockDatastore {
    /// Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<DatastoreRequest>(100);
        let expectations: Expectations = Arc::new(Mutex::new(VecDeque::new()));
        let received = Arc::new(AtomicUsize::new(0));
        let expectations_clone = expectations.clone();
        let received_clone = received.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                received_clone.fetch_add(1, Ordering::SeqCst);
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (DatastoreRequest::Insert { respond_to, .. }, Some(Expectation::Insert { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (DatastoreRequest::Find { respond_to, .. }, Some(Expectation::Find { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (DatastoreRequest::Update { respond_to, .. }, Some(Expectation::Update { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (DatastoreRequest::Delete { respond_to, .. }, Some(Expectation::Delete { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {:?}", request);
                    }
                }
            }
        });

        Self {
            client: DatastoreClient::new(sender),
            expectations,
            received,
            _handle: handle,
        }
    }

    pub fn client(&self) -> DatastoreClient {
        self.client.clone()
    }

    pub fn expect_insert(&self) -> ExpectationBuilder<Value> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Insert { response })
    }

    pub fn expect_find(&self) -> ExpectationBuilder<Vec<Value>> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Find { response })
    }

    pub fn expect_update(&self) -> ExpectationBuilder<UpdateResult> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Update { response })
    }

    pub fn expect_delete(&self) -> ExpectationBuilder<DeleteResult> {
        ExpectationBuilder::new(&self.expectations, |response| Expectation::Delete { response })
    }

    /// Number of requests the mock has received so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl Default for MockDatastore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExpectationBuilder<T> {
    expectations: Expectations,
    wrap: fn(Result<T, StoreError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    fn new(expectations: &Expectations, wrap: fn(Result<T, StoreError>) -> Expectation) -> Self {
        Self {
            expectations: expectations.clone(),
            wrap,
        }
    }

    pub fn return_ok(self, value: T) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Ok(value)));
    }

    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Err(error)));
    }
}
