use async_trait::async_trait;
use serde_json::Value;

use crate::framework::{Context, FieldParams, FieldType, FieldVerdict, StoreError};

/// A string, optionally bounded by the `min_length` / `max_length` params
/// (counted in characters).
pub struct TextField;

fn length_param(params: &FieldParams, key: &str) -> Option<usize> {
    params.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

#[async_trait]
impl FieldType for TextField {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self, params: &FieldParams) -> String {
        match (length_param(params, "min_length"), length_param(params, "max_length")) {
            (Some(min), Some(max)) => format!("Text between {} and {} characters", min, max),
            (Some(min), None) => format!("Text of at least {} characters", min),
            (None, Some(max)) => format!("Text of at most {} characters", max),
            (None, None) => "Text".to_string(),
        }
    }

    async fn is_proper_value(
        &self,
        _ctx: &Context,
        params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<FieldVerdict, StoreError> {
        let Some(text) = value.as_str() else {
            return Ok(FieldVerdict::reject(format!("Type of `{}` is not text.", value)));
        };
        let length = text.chars().count();
        if let Some(min) = length_param(params, "min_length") {
            if length < min {
                return Ok(FieldVerdict::reject(format!("Text `{}` is too short.", text)));
            }
        }
        if let Some(max) = length_param(params, "max_length") {
            if length > max {
                return Ok(FieldVerdict::reject(format!("Text `{}` is too long.", text)));
            }
        }
        Ok(FieldVerdict::Accept)
    }
}
