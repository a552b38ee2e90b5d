//! # Store Errors
//!
//! Every operation in the crate returns [`StoreError`]. Callers (for example a
//! REST binding) match on [`StoreError::kind`] to pick a response; the kinds are
//! never collapsed into a generic failure.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The five error kinds a caller can distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Permission,
    Developer,
    Internal,
}

/// What could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("unknown resource type: {0}")]
    ResourceType(String),
    #[error("resource of id {0} not found")]
    Resource(String),
    #[error("unknown field type: {0}")]
    FieldType(String),
    #[error("unknown access strategy: {0}")]
    AccessStrategy(String),
}

/// A single problem with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "reason", rename_all = "snake_case")]
pub enum FieldIssue {
    UnknownField,
    MissingValue,
    Invalid(String),
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::UnknownField => write!(f, "unknown field"),
            FieldIssue::MissingValue => write!(f, "missing value"),
            FieldIssue::Invalid(reason) => write!(f, "{}", reason),
        }
    }
}

/// Per-field validation failures collected during one validate call.
///
/// Keyed by field name, so the content does not depend on the order in which
/// the individual checks settled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    invalid_fields: BTreeMap<String, FieldIssue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an issue for `field`. The first issue recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, issue: FieldIssue) {
        self.invalid_fields.entry(field.into()).or_insert(issue);
    }

    pub fn get(&self, field: &str) -> Option<&FieldIssue> {
        self.invalid_fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.invalid_fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.invalid_fields.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldIssue)> {
        self.invalid_fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `Ok(())` when nothing was recorded, otherwise the aggregate error.
    pub fn into_result(self) -> Result<(), StoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "There are problems with some of the provided values")?;
        for (i, (field, issue)) in self.invalid_fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{} ({})", sep, field, issue)?;
        }
        Ok(())
    }
}

/// Errors returned by the resource store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// One or more fields were rejected. User-correctable.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// An id or a registered name did not resolve.
    #[error("{0}")]
    NotFound(NotFound),

    /// An access strategy denied the action.
    #[error("permission denied by access strategy `{strategy}`: {reason}")]
    Permission { strategy: String, reason: String },

    /// Misuse of the registration API. Not user-facing.
    #[error("developer error: {0}")]
    Developer(String),

    /// Unexpected failure of a collaborator (storage, serialization, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Permission { .. } => ErrorKind::Permission,
            StoreError::Developer(_) => ErrorKind::Developer,
            StoreError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn permission(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Permission {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_resource_type(name: impl Into<String>) -> Self {
        StoreError::NotFound(NotFound::ResourceType(name.into()))
    }

    pub fn resource_not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound(NotFound::Resource(id.into()))
    }

    /// Shorthand for a validation error with a single entry.
    pub fn invalid_field(field: impl Into<String>, issue: FieldIssue) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, issue);
        StoreError::Validation(errors)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Internal(format!("serialization failed: {}", error))
    }
}

impl From<sled::Error> for StoreError {
    fn from(error: sled::Error) -> Self {
        StoreError::Internal(format!("sled: {}", error))
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(error: toml::de::Error) -> Self {
        StoreError::Internal(format!("invalid configuration: {}", error))
    }
}
