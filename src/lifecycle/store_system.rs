use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{Backend, StoreConfig};
use crate::framework::{Registry, StoreError};
use crate::manager::ResourceManager;
use crate::store::{Datastore, DocumentActor, SledDatastore};

/// Wires a [`ResourceManager`] to the datastore named in the configuration.
///
/// For the in-memory backend this spawns a [`DocumentActor`] and keeps its
/// task handle so [`shutdown`](Self::shutdown) can wait for it.
///
/// # Example
///
/// ```rust,no_run
/// use resource_store::config::StoreConfig;
/// use resource_store::framework::{Context, RegistryBuilder};
/// use resource_store::lifecycle::StoreSystem;
/// use resource_store::model::CreateOptions;
///
/// # async fn demo() -> Result<(), resource_store::framework::StoreError> {
/// let registry = RegistryBuilder::new().with_builtins().build()?;
/// let system = StoreSystem::start(&StoreConfig::default(), registry)?;
///
/// let people = system.manager.list_by_type(&Context::anonymous(), "person", Default::default()).await;
///
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct StoreSystem {
    pub manager: ResourceManager,
    handle: Option<JoinHandle<()>>,
}

impl StoreSystem {
    /// Opens the datastore and builds the manager. Must be called from inside
    /// a Tokio runtime.
    pub fn start(config: &StoreConfig, registry: impl Into<Arc<Registry>>) -> Result<Self, StoreError> {
        let mut handle = None;
        let datastore: Arc<dyn Datastore> = match config.datastore.backend {
            Backend::Memory => {
                let (actor, client) = DocumentActor::new(config.datastore.buffer_size);
                handle = Some(tokio::spawn(actor.run()));
                Arc::new(client)
            }
            Backend::Sled => {
                let path = config.datastore.path.as_ref().ok_or_else(|| {
                    StoreError::Developer("datastore.path is required for the sled backend".to_string())
                })?;
                Arc::new(SledDatastore::open(path)?)
            }
        };

        let manager = ResourceManager::new(registry.into(), datastore)
            .with_collection(config.datastore.collection.clone())
            .with_default_access_mode(config.defaults.access_mode.clone());

        info!(backend = ?config.datastore.backend, collection = %config.datastore.collection, "Store started");
        Ok(Self { manager, handle })
    }

    /// Drops the manager and waits for the datastore actor to finish.
    ///
    /// Clones of the manager keep the actor alive; drop them first.
    pub async fn shutdown(self) -> Result<(), StoreError> {
        info!("Shutting down store...");
        drop(self.manager);

        if let Some(handle) = self.handle {
            if let Err(e) = handle.await {
                error!("Datastore task failed: {:?}", e);
                return Err(StoreError::Internal(format!("datastore task failed: {:?}", e)));
            }
        }

        info!("Store shutdown complete.");
        Ok(())
    }
}
