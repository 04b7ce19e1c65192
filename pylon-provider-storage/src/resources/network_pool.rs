//! Network pools
//!
//! A pool hands out addresses from its ranges to the member interfaces of
//! cluster nodes. Interfaces are a list of nested models; ranges are kept as
//! a list of `[low, high]` pairs.

use std::sync::Arc;

use pylon_core::model::{ModelListValue, changed_only, null_unknowns};
use pylon_core::project::{copy_fields_with, read_from_state_with};
use pylon_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceHandler};
use pylon_core::settings::MapperConfig;
use pylon_core::value::{
    CaseInsensitive, CaseInsensitiveValue, Int32Value, Int64Value, ListValue, StringValue,
    TriState,
};
use pylon_core::wire::Nullable;
use pylon_core::{config_model, wire_model};
use serde::{Deserialize, Serialize};

use super::Endpoint;
use crate::client::ClusterClient;

pub const KIND: &str = "network_pool";
pub const COLLECTION: &str = "/platform/network/pools";

// =============================================================================
// Wire Model
// =============================================================================

/// Interface of a node, e.g. `ext-1` on logical node 3
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lnn: Option<u32>,
}

wire_model!(PoolInterface {
    "iface,omitempty" => iface,
    "lnn,omitempty" => lnn,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkPool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ifaces: Option<Vec<PoolInterface>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alloc_method: Option<CaseInsensitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_ttl: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sc_dns_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,
}

wire_model!(NetworkPool {
    "id,omitempty" => id,
    "name,omitempty" => name,
    "groupnet,omitempty" => groupnet,
    "subnet,omitempty" => subnet,
    "ranges,omitempty" => ranges,
    "ifaces,omitempty" => ifaces,
    "alloc_method,omitempty" => alloc_method,
    "sc_ttl,omitempty" => sc_ttl,
    "sc_dns_zone,omitempty" => sc_dns_zone,
    "description" => description,
});

// =============================================================================
// Config Model
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolInterfaceModel {
    pub iface: StringValue,
    pub lnn: Int64Value,
}

config_model!(PoolInterfaceModel {
    "iface" => iface,
    "lnn" => lnn,
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkPoolModel {
    pub id: StringValue,
    pub name: StringValue,
    pub groupnet: StringValue,
    pub subnet: StringValue,
    pub ranges: ListValue,
    pub ifaces: ModelListValue<PoolInterfaceModel>,
    /// `static` or `dynamic`, in whatever case the cluster reports
    pub alloc_method: CaseInsensitiveValue,
    /// SmartConnect TTL in seconds
    pub sc_ttl: Int32Value,
    pub sc_dns_zone: StringValue,
    pub description: StringValue,
}

config_model!(NetworkPoolModel {
    "id" => id,
    "name" => name,
    "groupnet" => groupnet,
    "subnet" => subnet,
    "ranges" => ranges,
    "ifaces" => ifaces,
    "alloc_method" => alloc_method,
    "sc_ttl" => sc_ttl,
    "sc_dns_zone" => sc_dns_zone,
    "description" => description,
});

// =============================================================================
// Handler
// =============================================================================

pub struct NetworkPoolHandler {
    endpoint: Endpoint,
    config: MapperConfig,
}

impl NetworkPoolHandler {
    pub fn new(client: Arc<dyn ClusterClient>, config: MapperConfig) -> Self {
        Self {
            endpoint: Endpoint::new(client, COLLECTION, KIND),
            config,
        }
    }

    fn request_body(&self, model: &NetworkPoolModel) -> ProviderResult<NetworkPool> {
        let mut body = NetworkPool::default();
        read_from_state_with(model, &mut body, &self.config)?;
        body.id = None;
        Ok(body)
    }

    async fn refresh(&self, mut state: NetworkPoolModel) -> ProviderResult<Option<NetworkPoolModel>> {
        let id = self.endpoint.known_id(&state.id)?.to_string();
        let Some(pool) = self.endpoint.fetch::<NetworkPool>(&id).await? else {
            return Ok(None);
        };
        copy_fields_with(&pool, &mut state, &self.config)
            .map_err(|e| ProviderError::from(e).for_resource(self.endpoint.resource_id(&id)))?;
        Ok(Some(state))
    }

    async fn create_pool(&self, plan: &NetworkPoolModel) -> ProviderResult<NetworkPoolModel> {
        let body = self.request_body(plan)?;
        let id = self.endpoint.create(&body).await?;

        let mut state = plan.clone();
        state.id = TriState::Known(id.clone());
        let mut state = self
            .refresh(state)
            .await?
            .ok_or_else(|| self.endpoint.vanished(&id))?;
        null_unknowns(&mut state);
        Ok(state)
    }

    async fn update_pool(
        &self,
        state: &NetworkPoolModel,
        plan: &NetworkPoolModel,
    ) -> ProviderResult<NetworkPoolModel> {
        let id = self.endpoint.known_id(&state.id)?.to_string();
        let mut body = self.request_body(&changed_only(state, plan))?;
        if plan.description.is_null() && state.description.is_known() {
            body.description.set_null();
        }
        self.endpoint.modify(&id, &body).await?;

        let mut next = plan.clone();
        next.id = state.id.clone();
        let mut next = self
            .refresh(next)
            .await?
            .ok_or_else(|| self.endpoint.vanished(&id))?;
        null_unknowns(&mut next);
        Ok(next)
    }

    async fn delete_pool(&self, state: &NetworkPoolModel) -> ProviderResult<()> {
        let id = self.endpoint.known_id(&state.id)?;
        self.endpoint.remove(id).await
    }
}

impl ResourceHandler for NetworkPoolHandler {
    type Model = NetworkPoolModel;

    fn name(&self) -> &'static str {
        KIND
    }

    fn create<'a>(
        &'a self,
        plan: &'a NetworkPoolModel,
    ) -> BoxFuture<'a, ProviderResult<NetworkPoolModel>> {
        Box::pin(self.create_pool(plan))
    }

    fn read<'a>(
        &'a self,
        state: &'a NetworkPoolModel,
    ) -> BoxFuture<'a, ProviderResult<Option<NetworkPoolModel>>> {
        Box::pin(self.refresh(state.clone()))
    }

    fn update<'a>(
        &'a self,
        state: &'a NetworkPoolModel,
        plan: &'a NetworkPoolModel,
    ) -> BoxFuture<'a, ProviderResult<NetworkPoolModel>> {
        Box::pin(self.update_pool(state, plan))
    }

    fn delete<'a>(&'a self, state: &'a NetworkPoolModel) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_pool(state))
    }
}
