use async_trait::async_trait;
use serde_json::Value;

use crate::framework::{Context, FieldParams, FieldType, FieldVerdict, StoreError};

/// `true`/`false`, also accepting `0`/`1` and the strings `"true"`/`"false"`
/// in any letter case. Stored as a JSON bool.
pub struct BooleanField;

impl BooleanField {
    fn interpret(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_f64() {
                Some(x) if x == 1.0 => Some(true),
                Some(x) if x == 0.0 => Some(false),
                _ => None,
            },
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

#[async_trait]
impl FieldType for BooleanField {
    fn name(&self) -> &str {
        "boolean"
    }

    fn description(&self, _params: &FieldParams) -> String {
        "Boolean value. True or false. Can be a string: \"true\" or \"false\".".to_string()
    }

    async fn is_proper_value(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<FieldVerdict, StoreError> {
        Ok(match Self::interpret(value) {
            Some(_) => FieldVerdict::Accept,
            None => FieldVerdict::reject(format!("Value `{}` is not boolean format.", value)),
        })
    }

    async fn encode(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<Value, StoreError> {
        Self::interpret(value)
            .map(Value::Bool)
            .ok_or_else(|| StoreError::Internal(format!("cannot encode `{}` as boolean", value)))
    }
}
