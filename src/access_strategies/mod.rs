//! Built-in access strategies.

mod basic;
mod owner;

pub use basic::{LoggedIn, Noone, Public};
pub use owner::Owner;

use crate::framework::RegistryBuilder;

pub fn register_builtins(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .access_strategy(Public)
        .access_strategy(Noone)
        .access_strategy(LoggedIn)
        .access_strategy(Owner)
}
