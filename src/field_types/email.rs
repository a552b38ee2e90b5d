use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::framework::{Context, FieldParams, FieldType, FieldVerdict, StoreError};

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("address pattern compiles")
});

/// An e-mail address, like `something@something.sth`.
pub struct EmailField;

#[async_trait]
impl FieldType for EmailField {
    fn name(&self) -> &str {
        "email"
    }

    fn description(&self, _params: &FieldParams) -> String {
        "Email address, like something@something.sth".to_string()
    }

    async fn is_proper_value(
        &self,
        _ctx: &Context,
        _params: &FieldParams,
        value: &Value,
        _old_value: Option<&Value>,
    ) -> Result<FieldVerdict, StoreError> {
        Ok(match value.as_str() {
            Some(address) if ADDRESS.is_match(address) => FieldVerdict::Accept,
            _ => FieldVerdict::reject(format!("{} is not valid e-mail address.", value)),
        })
    }
}
