//! Storage cluster provider
//!
//! Owns the cluster transport and the mapper configuration, and hands out one
//! handler per resource kind.

use std::sync::Arc;

use pylon_core::settings::MapperConfig;

use crate::client::ClusterClient;
use crate::resources::network_pool::NetworkPoolHandler;
use crate::resources::nfs_export::NfsExportHandler;
use crate::resources::quota::QuotaHandler;

/// Storage cluster provider
pub struct StorageProvider {
    client: Arc<dyn ClusterClient>,
    config: MapperConfig,
}

impl StorageProvider {
    /// Create a provider with the default mapper configuration
    pub fn new(client: Arc<dyn ClusterClient>) -> Self {
        Self::with_config(client, MapperConfig::default())
    }

    pub fn with_config(client: Arc<dyn ClusterClient>, config: MapperConfig) -> Self {
        log::debug!(
            "storage provider: mismatch policy {:?}, float precision {}",
            config.on_type_mismatch,
            config.float_precision
        );
        Self { client, config }
    }

    pub fn name(&self) -> &'static str {
        "storage"
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn nfs_exports(&self) -> NfsExportHandler {
        NfsExportHandler::new(self.client.clone(), self.config.clone())
    }

    pub fn quotas(&self) -> QuotaHandler {
        QuotaHandler::new(self.client.clone(), self.config.clone())
    }

    pub fn network_pools(&self) -> NetworkPoolHandler {
        NetworkPoolHandler::new(self.client.clone(), self.config.clone())
    }
}
