//! Registration-time declarations of resource types.
//!
//! Declarations are plain data (they deserialize from TOML/JSON as well); the
//! [`RegistryBuilder`](crate::framework::RegistryBuilder) resolves the names
//! they reference into a [`ResourceType`](crate::framework::ResourceType).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::framework::{Action, FieldParams};

/// One field of a resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub human_readable_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub params: FieldParams,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn human_readable(mut self, name: impl Into<String>) -> Self {
        self.human_readable_name = Some(name.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// Strategy names per action; unset actions fall back to `default`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStrategyDeclaration {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub retrieve: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

impl AccessStrategyDeclaration {
    /// The same strategy for every action.
    pub fn all(name: impl Into<String>) -> Self {
        Self {
            default: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn action(mut self, action: Action, name: impl Into<String>) -> Self {
        let slot = match action {
            Action::Create => &mut self.create,
            Action::Retrieve => &mut self.retrieve,
            Action::Update => &mut self.update,
            Action::Delete => &mut self.delete,
        };
        *slot = Some(name.into());
        self
    }

    pub fn for_action(&self, action: Action) -> Option<&str> {
        let specific = match action {
            Action::Create => &self.create,
            Action::Retrieve => &self.retrieve,
            Action::Update => &self.update,
            Action::Delete => &self.delete,
        };
        specific.as_deref().or(self.default.as_deref())
    }
}

/// A resource type as the application declares it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
    #[serde(default)]
    pub access_strategy: AccessStrategyDeclaration,
}

impl ResourceTypeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    pub fn access_strategy(mut self, access_strategy: AccessStrategyDeclaration) -> Self {
        self.access_strategy = access_strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_specific_strategy_overrides_default() {
        let decl = AccessStrategyDeclaration::all("public").action(Action::Update, "noone");
        assert_eq!(decl.for_action(Action::Update), Some("noone"));
        assert_eq!(decl.for_action(Action::Delete), Some("public"));
        assert_eq!(AccessStrategyDeclaration::default().for_action(Action::Create), None);
    }

    #[test]
    fn test_declaration_from_json() {
        let decl: ResourceTypeDeclaration = serde_json::from_value(serde_json::json!({
            "name": "person",
            "fields": [
                {"name": "email", "type": "email", "required": true},
                {"name": "age", "type": "int", "params": {"min": 0}}
            ],
            "access_strategy": {"default": "logged_in", "delete": "owner"}
        }))
        .unwrap();

        assert_eq!(decl.fields.len(), 2);
        assert!(decl.fields[0].required);
        assert_eq!(decl.fields[1].params["min"], 0);
        assert_eq!(decl.access_strategy.for_action(Action::Delete), Some("owner"));
    }
}
