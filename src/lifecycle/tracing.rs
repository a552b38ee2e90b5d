//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber for the whole
//! process. Module paths are hidden (`with_target(false)`); operations carry
//! structured fields instead (`resource_type`, `id`, `collection`, ...).
//!
//! `RUST_LOG` wins when set. Otherwise the filter from the configuration is
//! used (`[logging] filter`, `"info"` by default).
//!
//! ```bash
//! # one line per created/updated/deleted resource
//! RUST_LOG=info cargo run
//!
//! # also show reads, queries and access decisions
//! RUST_LOG=debug cargo run
//! ```
//!
//! With `RUST_LOG=debug` a create shows up as:
//!
//! ```text
//! DEBUG create:check_access Access granted strategy="public" action=create
//! DEBUG create Encoded resource_type=person fields=2
//!  INFO create Inserted collection="resources" id=6f1c... size=1
//!  INFO create Created id=6f1c...
//! ```

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Returns `false` if one was already set.
pub fn setup_tracing(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
