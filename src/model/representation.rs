//! Persisted and returned shapes of a resource.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::framework::{Context, StoreError};

/// Field name → value payload of a resource.
pub type Body = Map<String, Value>;

/// A resource as it is stored: the body holds *encoded* values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub body: Body,
    pub owner: Option<String>,
    pub access_mode: String,
    #[serde(default)]
    pub access_mode_args: Value,
    pub created_context: Context,
    pub last_modified_context: Context,
}

impl ResourceDocument {
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A resource as callers see it: the body holds *decoded* values.
///
/// Derived from a [`ResourceDocument`] on every read and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRepresentation {
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub body: Body,
    pub owner: Option<String>,
    pub access_mode: String,
    pub access_mode_args: Value,
    pub created_context: Context,
    pub last_modified_context: Context,
}

impl ResourceRepresentation {
    /// Re-attaches the document's metadata to an already decoded body.
    pub fn from_document(document: ResourceDocument, decoded_body: Body) -> Self {
        Self {
            id: document.id,
            type_name: document.type_name,
            body: decoded_body,
            owner: document.owner,
            access_mode: document.access_mode,
            access_mode_args: document.access_mode_args,
            created_context: document.created_context,
            last_modified_context: document.last_modified_context,
        }
    }

    pub fn access_mode(&self) -> AccessMode {
        AccessMode {
            access_mode: self.access_mode.clone(),
            access_mode_args: self.access_mode_args.clone(),
        }
    }
}

/// Record-level access metadata, read and written outside field validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessMode {
    pub access_mode: String,
    #[serde(default)]
    pub access_mode_args: Value,
}

impl AccessMode {
    pub fn new(access_mode: impl Into<String>) -> Self {
        Self {
            access_mode: access_mode.into(),
            access_mode_args: Value::Array(Vec::new()),
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.access_mode_args = args;
        self
    }
}
