//! NFS exports
//!
//! An export publishes one or more directory paths to a set of clients. Its
//! root mapping nests two levels deep (`map_root.user.id`), so state is
//! refreshed with the nested-aware projection.

use std::sync::Arc;

use pylon_core::model::{ModelValue, changed_only, null_unknowns};
use pylon_core::project::{copy_fields_with, read_from_state_with};
use pylon_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceHandler};
use pylon_core::settings::MapperConfig;
use pylon_core::value::{
    BoolValue, CaseInsensitive, CaseInsensitiveValue, Int64Value, ListValue, SetValue,
    StringValue, TriState,
};
use pylon_core::{config_model, wire_model};
use serde::{Deserialize, Serialize};

use super::Endpoint;
use crate::client::ClusterClient;

pub const KIND: &str = "nfs_export";
pub const COLLECTION: &str = "/platform/protocols/nfs/exports";

// =============================================================================
// Wire Model
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsPersona {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

wire_model!(NfsPersona { "id,omitempty" => id });

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<NfsPersona>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_group: Option<NfsPersona>,
}

wire_model!(NfsMapping {
    "enabled,omitempty" => enabled,
    "user,omitempty" => user,
    "primary_group,omitempty" => primary_group,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NfsExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_flavors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<CaseInsensitive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_root: Option<NfsMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

wire_model!(NfsExport {
    "id,omitempty" => id,
    "paths,omitempty" => paths,
    "clients,omitempty" => clients,
    "security_flavors,omitempty" => security_flavors,
    "zone,omitempty" => zone,
    "read_only,omitempty" => read_only,
    "map_root,omitempty" => map_root,
    "block_size,omitempty" => block_size,
    "description,omitempty" => description,
});

// =============================================================================
// Config Model
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfsPersonaModel {
    pub id: StringValue,
}

config_model!(NfsPersonaModel { "id" => id });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfsMappingModel {
    pub enabled: BoolValue,
    pub user: ModelValue<NfsPersonaModel>,
    pub primary_group: ModelValue<NfsPersonaModel>,
}

config_model!(NfsMappingModel {
    "enabled" => enabled,
    "user" => user,
    "primary_group" => primary_group,
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NfsExportModel {
    pub id: StringValue,
    pub paths: ListValue,
    pub clients: SetValue,
    pub security_flavors: SetValue,
    /// Access zone; the cluster may change its case
    pub zone: CaseInsensitiveValue,
    pub read_only: BoolValue,
    pub map_root: ModelValue<NfsMappingModel>,
    pub block_size: Int64Value,
    pub description: StringValue,
}

config_model!(NfsExportModel {
    "id" => id,
    "paths" => paths,
    "clients" => clients,
    "security_flavors" => security_flavors,
    "zone" => zone,
    "read_only" => read_only,
    "map_root" => map_root,
    "block_size" => block_size,
    "description" => description,
});

// =============================================================================
// Handler
// =============================================================================

pub struct NfsExportHandler {
    endpoint: Endpoint,
    config: MapperConfig,
}

impl NfsExportHandler {
    pub fn new(client: Arc<dyn ClusterClient>, config: MapperConfig) -> Self {
        Self {
            endpoint: Endpoint::new(client, COLLECTION, KIND),
            config,
        }
    }

    fn request_body(&self, model: &NfsExportModel) -> ProviderResult<NfsExport> {
        let mut body = NfsExport::default();
        read_from_state_with(model, &mut body, &self.config)?;
        body.id = None;
        Ok(body)
    }

    async fn refresh(&self, mut state: NfsExportModel) -> ProviderResult<Option<NfsExportModel>> {
        let id = self.endpoint.known_id(&state.id)?.to_string();
        let Some(export) = self.endpoint.fetch::<NfsExport>(&id).await? else {
            return Ok(None);
        };
        copy_fields_with(&export, &mut state, &self.config)
            .map_err(|e| ProviderError::from(e).for_resource(self.endpoint.resource_id(&id)))?;
        Ok(Some(state))
    }

    async fn create_export(&self, plan: &NfsExportModel) -> ProviderResult<NfsExportModel> {
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

    async fn update_export(
        &self,
        state: &NfsExportModel,
        plan: &NfsExportModel,
    ) -> ProviderResult<NfsExportModel> {
        let id = self.endpoint.known_id(&state.id)?.to_string();
        let body = self.request_body(&changed_only(state, plan))?;
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

    async fn delete_export(&self, state: &NfsExportModel) -> ProviderResult<()> {
        let id = self.endpoint.known_id(&state.id)?;
        self.endpoint.remove(id).await
    }
}

impl ResourceHandler for NfsExportHandler {
    type Model = NfsExportModel;

    fn name(&self) -> &'static str {
        KIND
    }

    fn create<'a>(
        &'a self,
        plan: &'a NfsExportModel,
    ) -> BoxFuture<'a, ProviderResult<NfsExportModel>> {
        Box::pin(self.create_export(plan))
    }

    fn read<'a>(
        &'a self,
        state: &'a NfsExportModel,
    ) -> BoxFuture<'a, ProviderResult<Option<NfsExportModel>>> {
        Box::pin(self.refresh(state.clone()))
    }

    fn update<'a>(
        &'a self,
        state: &'a NfsExportModel,
        plan: &'a NfsExportModel,
    ) -> BoxFuture<'a, ProviderResult<NfsExportModel>> {
        Box::pin(self.update_export(state, plan))
    }

    fn delete<'a>(&'a self, state: &'a NfsExportModel) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_export(state))
    }
}
