//! # Field Types
//!
//! A field type is a reusable value kind (`boolean`, `email`, `text`, ...).
//! Resource types bind each of their fields to one field type by name; the
//! field type then decides whether a candidate value is acceptable and how it
//! is stored.
//!
//! ## Old values
//!
//! Some checks only make sense relative to what is already stored (e.g. a value
//! that may never change). A field type opts into receiving the previous value
//! per method through [`FieldType::old_value_sensitivity`]. The schema engine
//! consults those flags and passes:
//!
//! - `Some(previous)` to sensitive methods (`Some(&Value::Null)` when nothing
//!   was stored before, e.g. on create),
//! - `None` to every other method, even when a previous value exists.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::context::Context;
use super::error::StoreError;

/// Type-specific parameters declared on a field (`{"max_length": 64}`).
pub type FieldParams = Map<String, Value>;

/// Outcome of a field check that did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldVerdict {
    Accept,
    Reject(String),
}

impl FieldVerdict {
    pub fn reject(reason: impl Into<String>) -> Self {
        FieldVerdict::Reject(reason.into())
    }
}

/// Which methods of a field type need the previously stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OldValueSensitivity {
    pub is_proper_value: bool,
    pub encode: bool,
}

/// A value kind that fields can be declared with.
///
/// `is_proper_value` returns `Ok(FieldVerdict::Reject(..))` for user mistakes;
/// those are aggregated into one validation error. An `Err` is a genuine
/// failure and aborts the whole operation.
///
/// `encode` and `decode` default to the identity. Implementations must keep
/// `decode(encode(v))` observably equal to `v` for every accepted `v`.
#[async_trait]
pub trait FieldType: Send + Sync + 'static {
    /// Registry name.
    fn name(&self) -> &str;

    /// Human-readable description of accepted values.
    fn description(&self, _params: &FieldParams) -> String {
        format!("Value of type {}", self.name())
    }

    fn old_value_sensitivity(&self) -> OldValueSensitivity {
        OldValueSensitivity::default()
    }

    async fn is_proper_value(
        &self,
        ctx: &Context,
        params: &FieldParams,
        value: &Value,
        old_value: Option<&Value>,
    ) -> Result<FieldVerdict, StoreError>;

    async fn encode(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<Value, StoreError> {
        Ok(value.clone())
    }

    async fn decode(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        stored: &Value,
    ) -> Result<Value, StoreError> {
        Ok(stored.clone())
    }
}
