//! # Resource Manager
//!
//! Entry point for every operation on resources. Each call takes the request
//! [`Context`] first, resolves the resource type, runs the access strategy for
//! the action, validates and encodes the payload through the
//! [`ResourceType`], and talks to the [`Datastore`].
//!
//! ## Order of checks
//!
//! Unknown types, unknown ids and access denials abort an operation before
//! any field is validated. Validation problems are reported all at once as a
//! single [`StoreError::Validation`].
//!
//! ## Update vs patch
//!
//! - [`update_resource`](ResourceManager::update_resource) replaces the body:
//!   stored fields missing from the payload are cleared to `null` and required
//!   fields must be present.
//! - [`patch_resource`](ResourceManager::patch_resource) merges the given
//!   fields into the stored body and leaves the others alone.
//!
//! Both hand the stored (decoded) values to old-value sensitive field types.
//!
//! ## Visibility
//!
//! [`get_by_id`](ResourceManager::get_by_id) fails with a permission error
//! when the retrieve strategy denies the item. The collection reads (`list`,
//! `find`, `search`) leave such items out instead.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::framework::{
    AccessItem, Action, Context, FieldIssue, NotFound, Registry, ResourceType,
    ResourceTypeSignature, StoreError,
};
use crate::model::{
    AccessMode, Body, CreateOptions, ListParams, ResourceDocument, ResourceRepresentation,
};
use crate::store::{Datastore, FindOptions, Mutation, Query};

pub const DEFAULT_COLLECTION: &str = "resources";
pub const DEFAULT_ACCESS_MODE: &str = "private";

/// A stored record together with its resolved type and decoded form.
struct Loaded {
    resource_type: Arc<ResourceType>,
    document: ResourceDocument,
    representation: ResourceRepresentation,
}

#[derive(Clone)]
pub struct ResourceManager {
    registry: Arc<Registry>,
    datastore: Arc<dyn Datastore>,
    collection: String,
    default_access_mode: String,
}

impl ResourceManager {
    pub fn new(registry: Arc<Registry>, datastore: Arc<dyn Datastore>) -> Self {
        Self {
            registry,
            datastore,
            collection: DEFAULT_COLLECTION.to_string(),
            default_access_mode: DEFAULT_ACCESS_MODE.to_string(),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_default_access_mode(mut self, access_mode: impl Into<String>) -> Self {
        self.default_access_mode = access_mode.into();
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Creates a resource of `type_name` from `body`.
    #[instrument(skip(self, ctx, body, options), fields(resource_type = %type_name))]
    pub async fn create(
        &self,
        ctx: &Context,
        type_name: &str,
        body: Body,
        options: CreateOptions,
    ) -> Result<ResourceRepresentation, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        resource_type.check_access(Action::Create, ctx, AccessItem::New).await?;

        resource_type.validate_field_values(ctx, true, &body, None).await?;
        let encoded = resource_type.encode_field_values(ctx, &body, None).await?;

        let document = ResourceDocument {
            id: Uuid::new_v4().to_string(),
            type_name: type_name.to_string(),
            body: encoded,
            owner: options.owner.or_else(|| ctx.user_id.clone()),
            access_mode: options
                .access_mode
                .unwrap_or_else(|| self.default_access_mode.clone()),
            access_mode_args: options.access_mode_args,
            created_context: ctx.clone(),
            last_modified_context: ctx.clone(),
        };

        let stored = self.datastore.insert(&self.collection, document.to_value()?).await?;
        let stored = ResourceDocument::from_value(stored)?;
        info!(id = %stored.id, "Created");
        resource_type.decode_db_entry(ctx, stored).await
    }

    /// Fetches one resource. Unknown ids are `NotFound`; an item the retrieve
    /// strategy denies is a permission error.
    #[instrument(skip(self, ctx))]
    pub async fn get_by_id(&self, ctx: &Context, id: &str) -> Result<ResourceRepresentation, StoreError> {
        let loaded = self.load(ctx, id, None).await?;
        loaded
            .resource_type
            .check_access(Action::Retrieve, ctx, AccessItem::Existing(&loaded.representation))
            .await?;
        debug!("Retrieved");
        Ok(loaded.representation)
    }

    /// Every visible resource of `type_name`.
    #[instrument(skip(self, ctx, params), fields(resource_type = %type_name))]
    pub async fn list_by_type(
        &self,
        ctx: &Context,
        type_name: &str,
        params: ListParams,
    ) -> Result<Vec<ResourceRepresentation>, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let query = Query::new().eq("type", Value::String(type_name.to_string()));
        let documents = self
            .datastore
            .find(&self.collection, query, FindOptions::from(&params))
            .await?;
        self.visible(ctx, Some(&resource_type), documents).await
    }

    /// Resources whose body fields equal `field_values`, optionally limited to
    /// one type. With a type, the values are validated and then encoded the way
    /// they are stored.
    #[instrument(skip(self, ctx, field_values))]
    pub async fn find(
        &self,
        ctx: &Context,
        field_values: Body,
        type_name: Option<&str>,
    ) -> Result<Vec<ResourceRepresentation>, StoreError> {
        let mut query = Query::new();
        let resource_type = match type_name {
            Some(name) => {
                let resource_type = self.registry.resolve_resource_type(name)?;
                query = query.eq("type", Value::String(name.to_string()));
                Some(resource_type)
            }
            None => None,
        };

        let field_values = match &resource_type {
            Some(resource_type) => {
                resource_type
                    .validate_field_values(ctx, false, &field_values, None)
                    .await?;
                resource_type.encode_field_values(ctx, &field_values, None).await?
            }
            None => field_values,
        };
        for (field, value) in field_values {
            query = query.eq(format!("body.{}", field), value);
        }

        let documents = self
            .datastore
            .find(&self.collection, query, FindOptions::default())
            .await?;
        self.visible(ctx, resource_type.as_ref(), documents).await
    }

    /// Resources of `type_name` whose `field` matches `pattern`, ignoring case.
    #[instrument(skip(self, ctx), fields(resource_type = %type_name))]
    pub async fn search(
        &self,
        ctx: &Context,
        type_name: &str,
        field: &str,
        pattern: &str,
    ) -> Result<Vec<ResourceRepresentation>, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        if resource_type.field(field).is_none() {
            return Err(StoreError::invalid_field(field, FieldIssue::UnknownField));
        }
        let query = Query::new()
            .eq("type", Value::String(type_name.to_string()))
            .pattern(format!("body.{}", field), pattern)
            .map_err(|e| {
                StoreError::invalid_field(field, FieldIssue::Invalid(format!("invalid search pattern: {}", e)))
            })?;

        let documents = self
            .datastore
            .find(&self.collection, query, FindOptions::default())
            .await?;
        self.visible(ctx, Some(&resource_type), documents).await
    }

    /// Resources of `type_name` stored with the given access mode.
    #[instrument(skip(self, ctx), fields(resource_type = %type_name))]
    pub async fn search_by_mode(
        &self,
        ctx: &Context,
        type_name: &str,
        access_mode: &str,
    ) -> Result<Vec<ResourceRepresentation>, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let query = Query::new()
            .eq("type", Value::String(type_name.to_string()))
            .eq("access_mode", Value::String(access_mode.to_string()));
        let documents = self
            .datastore
            .find(&self.collection, query, FindOptions::default())
            .await?;
        self.visible(ctx, Some(&resource_type), documents).await
    }

    /// Replaces the body of a resource.
    #[instrument(skip(self, ctx, new_body), fields(resource_type = %type_name))]
    pub async fn update_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        id: &str,
        mut new_body: Body,
    ) -> Result<ResourceRepresentation, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let loaded = self.load(ctx, id, Some(type_name)).await?;
        resource_type
            .check_access(Action::Update, ctx, AccessItem::Existing(&loaded.representation))
            .await?;

        new_body.remove("id");
        let old_values = &loaded.representation.body;
        for field in old_values.keys() {
            if !new_body.contains_key(field) {
                new_body.insert(field.clone(), Value::Null);
            }
        }

        resource_type
            .validate_field_values(ctx, true, &new_body, Some(old_values))
            .await?;
        let encoded = resource_type
            .encode_field_values(ctx, &new_body, Some(old_values))
            .await?;

        let mutation = Mutation::new()
            .set("body", Value::Object(encoded.clone()))
            .set("last_modified_context", serde_json::to_value(ctx)?);
        self.write(id, mutation).await?;

        let mut document = loaded.document;
        document.body = encoded;
        document.last_modified_context = ctx.clone();
        info!(%id, "Updated");
        resource_type.decode_db_entry(ctx, document).await
    }

    /// Merges `partial_body` into the stored body.
    #[instrument(skip(self, ctx, partial_body), fields(resource_type = %type_name))]
    pub async fn patch_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        id: &str,
        mut partial_body: Body,
    ) -> Result<ResourceRepresentation, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let loaded = self.load(ctx, id, Some(type_name)).await?;
        resource_type
            .check_access(Action::Update, ctx, AccessItem::Existing(&loaded.representation))
            .await?;

        partial_body.remove("id");
        let old_values = &loaded.representation.body;
        resource_type
            .validate_field_values(ctx, false, &partial_body, Some(old_values))
            .await?;
        let encoded = resource_type
            .encode_field_values(ctx, &partial_body, Some(old_values))
            .await?;

        let mut mutation = Mutation::new();
        for (field, value) in &encoded {
            mutation = mutation.set(format!("body.{}", field), value.clone());
        }
        let mutation = mutation.set("last_modified_context", serde_json::to_value(ctx)?);
        self.write(id, mutation).await?;

        let mut document = loaded.document;
        document.body.extend(encoded);
        document.last_modified_context = ctx.clone();
        info!(%id, "Patched");
        resource_type.decode_db_entry(ctx, document).await
    }

    #[instrument(skip(self, ctx), fields(resource_type = %type_name))]
    pub async fn delete(&self, ctx: &Context, type_name: &str, id: &str) -> Result<(), StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let loaded = self.load(ctx, id, Some(type_name)).await?;
        resource_type
            .check_access(Action::Delete, ctx, AccessItem::Existing(&loaded.representation))
            .await?;

        let result = self.datastore.delete(&self.collection, Query::by_id(id)).await?;
        if result.deleted == 0 {
            warn!(%id, "Vanished before delete");
            return Err(StoreError::resource_not_found(id));
        }
        info!(%id, "Deleted");
        Ok(())
    }

    /// Sets the access mode of a resource. Field validation does not apply;
    /// the update strategy does.
    #[instrument(skip(self, ctx, access_mode), fields(resource_type = %type_name))]
    pub async fn edit_resource_access_mode(
        &self,
        ctx: &Context,
        type_name: &str,
        id: &str,
        access_mode: AccessMode,
    ) -> Result<AccessMode, StoreError> {
        let resource_type = self.registry.resolve_resource_type(type_name)?;
        let loaded = self.load(ctx, id, Some(type_name)).await?;
        resource_type
            .check_access(Action::Update, ctx, AccessItem::Existing(&loaded.representation))
            .await?;

        let mutation = Mutation::new()
            .set("access_mode", Value::String(access_mode.access_mode.clone()))
            .set("access_mode_args", access_mode.access_mode_args.clone())
            .set("last_modified_context", serde_json::to_value(ctx)?);
        self.write(id, mutation).await?;
        info!(%id, access_mode = %access_mode.access_mode, "Access mode changed");
        Ok(access_mode)
    }

    #[instrument(skip(self, ctx))]
    pub async fn get_resource_access_mode(&self, ctx: &Context, id: &str) -> Result<AccessMode, StoreError> {
        Ok(self.get_by_id(ctx, id).await?.access_mode())
    }

    pub async fn get_resource_type_signature(
        &self,
        _ctx: &Context,
        type_name: &str,
    ) -> Result<ResourceTypeSignature, StoreError> {
        Ok(self.registry.resolve_resource_type(type_name)?.get_signature())
    }

    /// Reads the document with `id`, resolves its type and decodes it. With
    /// `expected_type`, a record of another type counts as missing.
    async fn load(&self, ctx: &Context, id: &str, expected_type: Option<&str>) -> Result<Loaded, StoreError> {
        let mut documents = self
            .datastore
            .find(&self.collection, Query::by_id(id), FindOptions::default())
            .await?;
        if documents.is_empty() {
            warn!(%id, "Not found");
            return Err(StoreError::resource_not_found(id));
        }
        let document = ResourceDocument::from_value(documents.swap_remove(0))?;
        if expected_type.is_some_and(|expected| expected != document.type_name) {
            warn!(%id, stored_type = %document.type_name, "Type mismatch");
            return Err(StoreError::resource_not_found(id));
        }

        let resource_type = self.registry.resolve_resource_type(&document.type_name)?;
        let representation = resource_type.decode_db_entry(ctx, document.clone()).await?;
        Ok(Loaded {
            resource_type,
            document,
            representation,
        })
    }

    async fn write(&self, id: &str, mutation: Mutation) -> Result<(), StoreError> {
        let result = self
            .datastore
            .update(&self.collection, Query::by_id(id), mutation)
            .await?;
        if result.matched == 0 {
            warn!(%id, "Vanished before write");
            return Err(StoreError::resource_not_found(id));
        }
        Ok(())
    }

    /// Decodes `documents` and keeps the ones the retrieve strategy allows.
    async fn visible(
        &self,
        ctx: &Context,
        resource_type: Option<&Arc<ResourceType>>,
        documents: Vec<Value>,
    ) -> Result<Vec<ResourceRepresentation>, StoreError> {
        let mut visible = Vec::with_capacity(documents.len());
        let total = documents.len();
        for value in documents {
            let document = ResourceDocument::from_value(value)?;
            let resource_type = match resource_type {
                Some(resource_type) => resource_type.clone(),
                None => match self.registry.resolve_resource_type(&document.type_name) {
                    Ok(resource_type) => resource_type,
                    Err(StoreError::NotFound(NotFound::ResourceType(name))) => {
                        warn!(resource_type = %name, "Skipping document of unregistered type");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
            };
            let representation = resource_type.decode_db_entry(ctx, document).await?;
            match resource_type
                .check_access(Action::Retrieve, ctx, AccessItem::Existing(&representation))
                .await
            {
                Ok(()) => visible.push(representation),
                Err(StoreError::Permission { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        debug!(total, visible = visible.len(), "Filtered by retrieve access");
        Ok(visible)
    }
}
