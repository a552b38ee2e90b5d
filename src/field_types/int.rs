use async_trait::async_trait;
use serde_json::Value;

use crate::framework::{Context, FieldParams, FieldType, FieldVerdict, StoreError};

/// A whole number, bounded by the optional `min` / `max` params. Numeric
/// strings are accepted and stored as JSON integers.
pub struct IntField;

impl IntField {
    fn interpret(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[async_trait]
impl FieldType for IntField {
    fn name(&self) -> &str {
        "int"
    }

    fn description(&self, _params: &FieldParams) -> String {
        "An integer".to_string()
    }

    async fn is_proper_value(
        &self,
        _ctx: &Context,
        params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<FieldVerdict, StoreError> {
        let Some(number) = Self::interpret(value) else {
            return Ok(FieldVerdict::reject(format!("Value {} is not an integer.", value)));
        };
        if let Some(min) = params.get("min").and_then(Value::as_i64) {
            if number < min {
                return Ok(FieldVerdict::reject(format!("Value {} should be at least {}.", number, min)));
            }
        }
        if let Some(max) = params.get("max").and_then(Value::as_i64) {
            if number > max {
                return Ok(FieldVerdict::reject(format!("Value {} should be at most {}.", number, max)));
            }
        }
        Ok(FieldVerdict::Accept)
    }

    async fn encode(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<Value, StoreError> {
        Self::interpret(value)
            .map(Value::from)
            .ok_or_else(|| StoreError::Internal(format!("cannot encode `{}` as int", value)))
    }
}
