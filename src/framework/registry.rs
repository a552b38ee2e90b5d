//! # Registry
//!
//! Field types, access strategies and resource types are looked up by name.
//! All of them are registered up front on a [`RegistryBuilder`]; `build()`
//! resolves every name a declaration references and produces an immutable
//! [`Registry`]. There is no way to register anything afterwards.
//!
//! ```rust
//! use resource_store::framework::RegistryBuilder;
//! use resource_store::model::{FieldDeclaration, ResourceTypeDeclaration};
//!
//! let registry = RegistryBuilder::new()
//!     .with_builtins()
//!     .resource_type(
//!         ResourceTypeDeclaration::new("person")
//!             .field(FieldDeclaration::new("email", "email").required()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.resolve_resource_type("person").is_ok());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::access_strategy::{AccessStrategy, Action};
use super::error::{NotFound, StoreError};
use super::field_type::FieldType;
use super::resource_type::{Field, ResourceType};
use crate::model::ResourceTypeDeclaration;

/// Strategy used for actions a resource type does not configure.
pub const DEFAULT_ACCESS_STRATEGY: &str = "public";

const ACTIONS: [Action; 4] = [Action::Create, Action::Retrieve, Action::Update, Action::Delete];

/// The kinds of named entries the registry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipKind {
    FieldType,
    AccessStrategy,
    ResourceType,
}

impl fmt::Display for ChipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChipKind::FieldType => "field_type",
            ChipKind::AccessStrategy => "access_strategy",
            ChipKind::ResourceType => "resource_type",
        };
        f.write_str(name)
    }
}

/// Collects registrations. Problems are reported together by [`build`](Self::build).
#[derive(Default)]
pub struct RegistryBuilder {
    field_types: HashMap<String, Arc<dyn FieldType>>,
    access_strategies: HashMap<String, Arc<dyn AccessStrategy>>,
    declarations: Vec<ResourceTypeDeclaration>,
    problems: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the built-in field types and access strategies.
    pub fn with_builtins(self) -> Self {
        let builder = crate::field_types::register_builtins(self);
        crate::access_strategies::register_builtins(builder)
    }

    pub fn field_type(mut self, field_type: impl FieldType) -> Self {
        let name = field_type.name().to_string();
        if self.field_types.contains_key(&name) {
            self.problems.push(format!("field type `{}` registered twice", name));
        } else {
            self.field_types.insert(name, Arc::new(field_type));
        }
        self
    }

    pub fn access_strategy(mut self, strategy: impl AccessStrategy) -> Self {
        let name = strategy.name().to_string();
        if self.access_strategies.contains_key(&name) {
            self.problems.push(format!("access strategy `{}` registered twice", name));
        } else {
            self.access_strategies.insert(name, Arc::new(strategy));
        }
        self
    }

    pub fn resource_type(mut self, declaration: ResourceTypeDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Resolves every declaration. Fails with [`StoreError::Developer`]
    /// listing all problems found.
    pub fn build(self) -> Result<Registry, StoreError> {
        let mut problems = self.problems;
        let mut resource_types = HashMap::new();

        for declaration in self.declarations {
            let name = declaration.name.clone();
            if name.is_empty() {
                problems.push("resource type with an empty name".to_string());
                continue;
            }
            if resource_types.contains_key(&name) {
                problems.push(format!("resource type `{}` registered twice", name));
                continue;
            }
            match resolve_declaration(declaration, &self.field_types, &self.access_strategies) {
                Ok(resource_type) => {
                    debug!(resource_type = %name, fields = resource_type.fields().len(), "Registered");
                    resource_types.insert(name, Arc::new(resource_type));
                }
                Err(mut found) => problems.append(&mut found),
            }
        }

        if !problems.is_empty() {
            return Err(StoreError::Developer(problems.join("; ")));
        }

        info!(
            field_types = self.field_types.len(),
            access_strategies = self.access_strategies.len(),
            resource_types = resource_types.len(),
            "Registry built"
        );
        Ok(Registry {
            field_types: self.field_types,
            access_strategies: self.access_strategies,
            resource_types,
        })
    }
}

fn resolve_declaration(
    declaration: ResourceTypeDeclaration,
    field_types: &HashMap<String, Arc<dyn FieldType>>,
    access_strategies: &HashMap<String, Arc<dyn AccessStrategy>>,
) -> Result<ResourceType, Vec<String>> {
    let type_name = declaration.name;
    let mut problems = Vec::new();
    let mut fields: Vec<Field> = Vec::with_capacity(declaration.fields.len());

    for field in declaration.fields {
        if field.name.is_empty() {
            problems.push(format!("resource type `{}` has a field with an empty name", type_name));
            continue;
        }
        if fields.iter().any(|f| f.name() == field.name) {
            problems.push(format!("field `{}` declared twice on `{}`", field.name, type_name));
            continue;
        }
        match field_types.get(&field.type_name) {
            Some(field_type) => fields.push(Field::new(
                field.name,
                field.human_readable_name,
                field.required,
                field.params,
                field_type.clone(),
            )),
            None => problems.push(format!(
                "field `{}` of `{}` uses unknown field type `{}`",
                field.name, type_name, field.type_name
            )),
        }
    }

    let mut access = HashMap::new();
    for action in ACTIONS {
        let strategy_name = declaration
            .access_strategy
            .for_action(action)
            .unwrap_or(DEFAULT_ACCESS_STRATEGY);
        match access_strategies.get(strategy_name) {
            Some(strategy) => {
                access.insert(action, strategy.clone());
            }
            None => problems.push(format!(
                "`{}` uses unknown access strategy `{}` for {}",
                type_name, strategy_name, action
            )),
        }
    }

    if problems.is_empty() {
        Ok(ResourceType::new(type_name, fields, access))
    } else {
        Err(problems)
    }
}

/// Immutable name → definition lookup.
pub struct Registry {
    field_types: HashMap<String, Arc<dyn FieldType>>,
    access_strategies: HashMap<String, Arc<dyn AccessStrategy>>,
    resource_types: HashMap<String, Arc<ResourceType>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resolve_field_type(&self, name: &str) -> Result<Arc<dyn FieldType>, StoreError> {
        self.field_types
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(NotFound::FieldType(name.to_string())))
    }

    pub fn resolve_access_strategy(&self, name: &str) -> Result<Arc<dyn AccessStrategy>, StoreError> {
        self.access_strategies
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(NotFound::AccessStrategy(name.to_string())))
    }

    pub fn resolve_resource_type(&self, name: &str) -> Result<Arc<ResourceType>, StoreError> {
        self.resource_types
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::unknown_resource_type(name))
    }

    pub fn is_registered(&self, kind: ChipKind, name: &str) -> bool {
        match kind {
            ChipKind::FieldType => self.field_types.contains_key(name),
            ChipKind::AccessStrategy => self.access_strategies.contains_key(name),
            ChipKind::ResourceType => self.resource_types.contains_key(name),
        }
    }

    /// Registered resource type names, sorted.
    pub fn resource_type_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.resource_types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
