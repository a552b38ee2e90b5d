//! Built-in field types.

mod boolean;
mod email;
mod int;
mod text;

pub use boolean::BooleanField;
pub use email::EmailField;
pub use int::IntField;
pub use text::TextField;

use crate::framework::RegistryBuilder;

pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .field_type(BooleanField)
        .field_type(EmailField)
        .field_type(IntField)
        .field_type(TextField)
}
