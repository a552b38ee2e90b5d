//! Schema engine building blocks.
//!
//! # Main Components
//!
//! - [`FieldType`] - value kinds with async validation and encode/decode
//! - [`AccessStrategy`] - named access predicates, optionally item-sensitive
//! - [`ResourceType`] - resolved schema: validation, encoding, introspection
//! - [`Registry`] - write-once lookup of all of the above by name
//! - [`Context`] - who/when of a request
//! - [`StoreError`] - the error type of every operation

pub mod access_strategy;
pub mod context;
pub mod error;
pub mod field_type;
pub mod registry;
pub mod resource_type;

pub use access_strategy::{check_access, AccessItem, AccessStrategy, Action};
pub use context::Context;
pub use error::{ErrorKind, FieldIssue, NotFound, StoreError, ValidationErrors};
pub use field_type::{FieldParams, FieldType, FieldVerdict, OldValueSensitivity};
pub use registry::{ChipKind, Registry, RegistryBuilder, DEFAULT_ACCESS_STRATEGY};
pub use resource_type::{
    Field, FieldSignature, FieldSpecification, ResourceType, ResourceTypeSignature,
    SpecificationMode,
};
