//! # Resource Types
//!
//! A [`ResourceType`] is a resolved schema: an ordered list of [`Field`]s, each
//! bound to a [`FieldType`], plus one [`AccessStrategy`] per [`Action`]. It is
//! built once by the [`RegistryBuilder`](super::RegistryBuilder) and is
//! read-only afterwards.
//!
//! ## Validation
//!
//! [`ResourceType::validate_field_values`] never stops at the first problem.
//! Unknown keys are recorded up front, every known field check is started at
//! once and joined, and missing required fields are added after all checks
//! have settled. The caller gets either `Ok(())` or one
//! [`StoreError::Validation`] holding every problem, keyed by field name.
//!
//! A field check that fails with an `Err` (rather than rejecting the value) is
//! not a user mistake; that error is returned as is.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::access_strategy::{check_access, AccessItem, AccessStrategy, Action};
use super::context::Context;
use super::error::{FieldIssue, StoreError, ValidationErrors};
use super::field_type::{FieldParams, FieldType, FieldVerdict, OldValueSensitivity};
use crate::model::{Body, ResourceDocument, ResourceRepresentation};

static NULL: Value = Value::Null;

/// A field of a resource type, bound to its field type.
#[derive(Clone)]
pub struct Field {
    name: String,
    human_readable_name: String,
    required: bool,
    params: FieldParams,
    field_type: Arc<dyn FieldType>,
}

impl Field {
    pub(crate) fn new(
        name: String,
        human_readable_name: Option<String>,
        required: bool,
        params: FieldParams,
        field_type: Arc<dyn FieldType>,
    ) -> Self {
        let human_readable_name = human_readable_name.unwrap_or_else(|| name.clone());
        Self {
            name,
            human_readable_name,
            required,
            params,
            field_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn field_type(&self) -> &Arc<dyn FieldType> {
        &self.field_type
    }

    fn sensitivity(&self) -> OldValueSensitivity {
        self.field_type.old_value_sensitivity()
    }

    /// The old value a method may see: the stored value (or null) when the
    /// method is sensitive, nothing otherwise.
    fn old_value<'a>(&self, sensitive: bool, old_values: Option<&'a Body>) -> Option<&'a Value> {
        if !sensitive {
            return None;
        }
        Some(old_values.and_then(|old| old.get(&self.name)).unwrap_or(&NULL))
    }

    fn signature(&self) -> FieldSignature {
        FieldSignature {
            name: self.name.clone(),
            type_name: self.field_type.name().to_string(),
            human_readable_name: self.human_readable_name.clone(),
            required: self.required,
            params: self.params.clone(),
        }
    }
}

/// Wire-safe description of one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSignature {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub human_readable_name: String,
    pub required: bool,
    pub params: FieldParams,
}

/// Wire-safe description of a resource type, fields in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceTypeSignature {
    pub name: String,
    pub fields: Vec<FieldSignature>,
}

/// Whether [`ResourceType::get_specification`] embeds the field type handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificationMode {
    SignatureOnly,
    WithValidators,
}

/// Field description that may carry the live field type.
///
/// Deliberately not `Serialize`: use [`ResourceType::get_signature`] for
/// anything that leaves the process.
#[derive(Clone)]
pub struct FieldSpecification {
    pub signature: FieldSignature,
    pub validator: Option<Arc<dyn FieldType>>,
}

/// A registered resource type.
pub struct ResourceType {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    access: HashMap<Action, Arc<dyn AccessStrategy>>,
}

impl ResourceType {
    pub(crate) fn new(
        name: String,
        fields: Vec<Field>,
        access: HashMap<Action, Arc<dyn AccessStrategy>>,
    ) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
        Self {
            name,
            fields,
            index,
            access,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// The strategy guarding `action`.
    pub fn access_strategy(&self, action: Action) -> Option<&Arc<dyn AccessStrategy>> {
        self.access.get(&action)
    }

    /// Checks `action` against this type's strategy for it.
    pub async fn check_access(
        &self,
        action: Action,
        ctx: &Context,
        item: AccessItem<'_>,
    ) -> Result<(), StoreError> {
        let strategy = self.access_strategy(action).ok_or_else(|| {
            StoreError::Developer(format!("resource type `{}` has no {} strategy", self.name, action))
        })?;
        check_access(strategy, action, ctx, item).await
    }

    /// Validates `values` against the schema.
    ///
    /// `old_values` is the decoded body currently stored, if any. Only fields
    /// whose `is_proper_value` is old-value sensitive get to see it.
    pub async fn validate_field_values(
        &self,
        ctx: &Context,
        check_missing: bool,
        values: &Body,
        old_values: Option<&Body>,
    ) -> Result<(), StoreError> {
        let mut errors = ValidationErrors::new();
        let mut checks = Vec::new();

        for (name, value) in values {
            let Some(field) = self.field(name) else {
                errors.add(name.as_str(), FieldIssue::UnknownField);
                continue;
            };
            if value.is_null() {
                continue;
            }
            let old_value = field.old_value(field.sensitivity().is_proper_value, old_values);
            checks.push(async move {
                let verdict = field
                    .field_type
                    .is_proper_value(ctx, &field.params, value, old_value)
                    .await;
                (field.name(), verdict)
            });
        }

        // Every check settles before anything is reported.
        for (name, verdict) in join_all(checks).await {
            match verdict? {
                FieldVerdict::Accept => {}
                FieldVerdict::Reject(reason) => errors.add(name, FieldIssue::Invalid(reason)),
            }
        }

        if check_missing {
            for field in self.fields.iter().filter(|f| f.required) {
                if values.get(&field.name).map_or(true, Value::is_null) {
                    errors.add(field.name.as_str(), FieldIssue::MissingValue);
                }
            }
        }

        if !errors.is_empty() {
            warn!(resource_type = %self.name, invalid = errors.len(), "Validation failed");
        }
        errors.into_result()
    }

    /// Maps every present value through its field's encoder.
    ///
    /// Nulls are stored as nulls. Callers validate first; an unknown key here
    /// is still reported as a validation error rather than silently stored.
    pub async fn encode_field_values(
        &self,
        ctx: &Context,
        body: &Body,
        old_body: Option<&Body>,
    ) -> Result<Body, StoreError> {
        let mut encodings = Vec::new();
        for (name, value) in body {
            let field = self
                .field(name)
                .ok_or_else(|| StoreError::invalid_field(name.as_str(), FieldIssue::UnknownField))?;
            let old_value = field.old_value(field.sensitivity().encode, old_body);
            encodings.push(async move {
                let encoded = if value.is_null() {
                    Ok(Value::Null)
                } else {
                    field
                        .field_type
                        .encode(ctx, &field.params, value, old_value)
                        .await
                };
                (field.name.clone(), encoded)
            });
        }

        let mut encoded_body = Body::new();
        for (name, encoded) in join_all(encodings).await {
            encoded_body.insert(name, encoded?);
        }
        debug!(resource_type = %self.name, fields = encoded_body.len(), "Encoded");
        Ok(encoded_body)
    }

    /// Decodes every schema field present in `stored`.
    ///
    /// Fields missing from storage stay missing; keys that are not part of the
    /// schema are dropped.
    pub async fn decode_values(&self, ctx: &Context, stored: &Body) -> Result<Body, StoreError> {
        let decodings = self.fields.iter().filter_map(|field| {
            let value = stored.get(&field.name)?;
            Some(async move {
                let decoded = if value.is_null() {
                    Ok(Value::Null)
                } else {
                    field.field_type.decode(ctx, &field.params, value).await
                };
                (field.name.clone(), decoded)
            })
        });

        let mut body = Body::new();
        for (name, decoded) in join_all(decodings).await {
            body.insert(name, decoded?);
        }
        Ok(body)
    }

    /// Turns a stored document into what callers see.
    pub async fn decode_db_entry(
        &self,
        ctx: &Context,
        document: ResourceDocument,
    ) -> Result<ResourceRepresentation, StoreError> {
        let body = self.decode_values(ctx, &document.body).await?;
        Ok(ResourceRepresentation::from_document(document, body))
    }

    pub fn get_specification(&self, mode: SpecificationMode) -> Vec<FieldSpecification> {
        self.fields
            .iter()
            .map(|field| FieldSpecification {
                signature: field.signature(),
                validator: match mode {
                    SpecificationMode::SignatureOnly => None,
                    SpecificationMode::WithValidators => Some(field.field_type.clone()),
                },
            })
            .collect()
    }

    pub fn get_signature(&self) -> ResourceTypeSignature {
        ResourceTypeSignature {
            name: self.name.clone(),
            fields: self.fields.iter().map(Field::signature).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::RegistryBuilder;
    use crate::model::{FieldDeclaration, ResourceTypeDeclaration};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    /// Rejects everything after a per-instance delay.
    struct SlowReject {
        name: &'static str,
        delay_ms: u64,
    }

    #[async_trait]
    impl FieldType for SlowReject {
        fn name(&self) -> &str {
            self.name
        }

        async fn is_proper_value(
            &self,
            _ctx: &Context,
            _params: &FieldParams,
            _value: &Value,
            _old: Option<&Value>,
        ) -> Result<FieldVerdict, StoreError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            Ok(FieldVerdict::reject(format!("{} says no", self.name)))
        }
    }

    /// Fails with an internal error instead of judging the value.
    struct Broken;

    #[async_trait]
    impl FieldType for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn is_proper_value(
            &self,
            _ctx: &Context,
            _params: &FieldParams,
            _value: &Value,
            _old: Option<&Value>,
        ) -> Result<FieldVerdict, StoreError> {
            Err(StoreError::Internal("lookup service unavailable".into()))
        }
    }

    /// Records the old values it is handed.
    #[derive(Default)]
    struct OldValueRecorder {
        sensitive: bool,
        seen: Mutex<Vec<Option<Value>>>,
    }

    #[async_trait]
    impl FieldType for Arc<OldValueRecorder> {
        fn name(&self) -> &str {
            if self.sensitive {
                "sensitive_recorder"
            } else {
                "insensitive_recorder"
            }
        }

        fn old_value_sensitivity(&self) -> OldValueSensitivity {
            OldValueSensitivity {
                is_proper_value: self.sensitive,
                encode: false,
            }
        }

        async fn is_proper_value(
            &self,
            _ctx: &Context,
            _params: &FieldParams,
            _value: &Value,
            old: Option<&Value>,
        ) -> Result<FieldVerdict, StoreError> {
            self.seen.lock().unwrap().push(old.cloned());
            Ok(FieldVerdict::Accept)
        }
    }

    fn person_type() -> Arc<ResourceType> {
        let registry = RegistryBuilder::new()
            .with_builtins()
            .resource_type(
                ResourceTypeDeclaration::new("person")
                    .field(FieldDeclaration::new("name", "text").required())
                    .field(FieldDeclaration::new("email", "email").required())
                    .field(FieldDeclaration::new("active", "boolean"))
                    .field(FieldDeclaration::new("age", "int").human_readable("Age in years")),
            )
            .build()
            .unwrap();
        registry.resolve_resource_type("person").unwrap()
    }

    #[tokio::test]
    async fn test_accepts_valid_payload() {
        let person = person_type();
        let values = body(json!({"name": "Ada", "email": "ada@example.com", "active": "true"}));
        person
            .validate_field_values(&Context::anonymous(), true, &values, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_aggregates_unknown_missing_and_invalid() {
        let person = person_type();
        let values = body(json!({"email": "not-an-address", "nickname": "ada", "age": "old"}));

        let err = person
            .validate_field_values(&Context::anonymous(), true, &values, None)
            .await
            .unwrap_err();

        let StoreError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("nickname"), Some(&FieldIssue::UnknownField));
        assert_eq!(errors.get("name"), Some(&FieldIssue::MissingValue));
        assert!(matches!(errors.get("email"), Some(FieldIssue::Invalid(_))));
        assert!(matches!(errors.get("age"), Some(FieldIssue::Invalid(_))));
    }

    #[tokio::test]
    async fn test_missing_check_is_optional() {
        let person = person_type();
        let values = body(json!({"age": 30}));
        person
            .validate_field_values(&Context::anonymous(), false, &values, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_string_is_not_missing() {
        let person = person_type();
        let values = body(json!({"name": "", "email": "a@b.co"}));
        person
            .validate_field_values(&Context::anonymous(), true, &values, None)
            .await
            .unwrap();

        let cleared = body(json!({"name": null, "email": "a@b.co"}));
        let err = person
            .validate_field_values(&Context::anonymous(), true, &cleared, None)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::invalid_field("name", FieldIssue::MissingValue));
    }

    #[tokio::test]
    async fn test_reports_every_rejection_regardless_of_settle_order() {
        let mut builder = RegistryBuilder::new().with_builtins();
        let mut decl = ResourceTypeDeclaration::new("slow");
        let delays = [40u64, 5, 25, 0, 15];
        let names = ["slow_a", "slow_b", "slow_c", "slow_d", "slow_e"];
        for (&name, delay_ms) in names.iter().zip(delays) {
            builder = builder.field_type(SlowReject { name, delay_ms });
            decl = decl.field(FieldDeclaration::new(name, name));
        }
        let registry = builder.resource_type(decl).build().unwrap();
        let slow = registry.resolve_resource_type("slow").unwrap();

        let values = body(json!({
            "slow_a": 1, "slow_b": 1, "slow_c": 1, "slow_d": 1, "slow_e": 1
        }));
        let err = slow
            .validate_field_values(&Context::anonymous(), true, &values, None)
            .await
            .unwrap_err();

        let StoreError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors.get("slow_a"),
            Some(&FieldIssue::Invalid("slow_a says no".into()))
        );
    }

    #[tokio::test]
    async fn test_internal_failure_is_not_folded_into_validation() {
        let registry = RegistryBuilder::new()
            .with_builtins()
            .field_type(Broken)
            .resource_type(
                ResourceTypeDeclaration::new("fragile")
                    .field(FieldDeclaration::new("x", "broken"))
                    .field(FieldDeclaration::new("y", "text")),
            )
            .build()
            .unwrap();
        let fragile = registry.resolve_resource_type("fragile").unwrap();

        let values = body(json!({"x": 1, "y": 2, "z": 3}));
        let err = fragile
            .validate_field_values(&Context::anonymous(), true, &values, None)
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Internal("lookup service unavailable".into()));
    }

    #[tokio::test]
    async fn test_old_value_only_reaches_sensitive_fields() {
        let sensitive = Arc::new(OldValueRecorder { sensitive: true, ..Default::default() });
        let insensitive = Arc::new(OldValueRecorder::default());
        let registry = RegistryBuilder::new()
            .with_builtins()
            .field_type(sensitive.clone())
            .field_type(insensitive.clone())
            .resource_type(
                ResourceTypeDeclaration::new("recorded")
                    .field(FieldDeclaration::new("s", "sensitive_recorder"))
                    .field(FieldDeclaration::new("i", "insensitive_recorder")),
            )
            .build()
            .unwrap();
        let recorded = registry.resolve_resource_type("recorded").unwrap();
        let ctx = Context::anonymous();

        let values = body(json!({"s": "new", "i": "new"}));
        let old = body(json!({"s": "old", "i": "old"}));
        recorded.validate_field_values(&ctx, false, &values, Some(&old)).await.unwrap();
        recorded.validate_field_values(&ctx, true, &values, None).await.unwrap();

        assert_eq!(
            *sensitive.seen.lock().unwrap(),
            vec![Some(json!("old")), Some(Value::Null)]
        );
        assert_eq!(*insensitive.seen.lock().unwrap(), vec![None, None]);
    }

    #[tokio::test]
    async fn test_decode_inverts_encode() {
        let person = person_type();
        let ctx = Context::anonymous();
        let values = body(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "active": true,
            "age": 36
        }));

        let encoded = person.encode_field_values(&ctx, &values, None).await.unwrap();
        let decoded = person.decode_values(&ctx, &encoded).await.unwrap();
        assert_eq!(decoded, values);
    }

    #[tokio::test]
    async fn test_decode_leaves_absent_fields_absent() {
        let person = person_type();
        let stored = body(json!({"name": "Ada", "ghost": 1, "age": null}));
        let decoded = person.decode_values(&Context::anonymous(), &stored).await.unwrap();
        assert_eq!(decoded, body(json!({"name": "Ada", "age": null})));
    }

    #[test]
    fn test_specification_modes() {
        let person = person_type();

        let plain = person.get_specification(SpecificationMode::SignatureOnly);
        assert!(plain.iter().all(|f| f.validator.is_none()));
        let names: Vec<_> = plain.iter().map(|f| f.signature.name.as_str()).collect();
        assert_eq!(names, vec!["name", "email", "active", "age"]);

        let full = person.get_specification(SpecificationMode::WithValidators);
        assert_eq!(full[1].validator.as_ref().map(|v| v.name()), Some("email"));

        let signature = serde_json::to_value(person.get_signature()).unwrap();
        assert_eq!(signature["fields"][3]["human_readable_name"], "Age in years");
        assert_eq!(signature["fields"][0]["type"], "text");
        assert_eq!(signature["fields"][0]["required"], true);
    }
}
