//! Startup and shutdown: the [`StoreSystem`] orchestrator and
//! [`setup_tracing`].

pub mod store_system;
pub mod tracing;

pub use store_system::StoreSystem;
pub use self::tracing::setup_tracing;
