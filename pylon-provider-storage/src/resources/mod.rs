//! Resource kinds managed on the storage cluster
//!
//! This module defines:
//! - The handlers for each resource kind (`nfs_export`, `quota`, `network_pool`)
//! - The registry of kinds used by offline tooling (payload inspection, schemas)
//! - The REST endpoint helper the handlers share

pub mod network_pool;
pub mod nfs_export;
pub mod quota;

use std::sync::Arc;

use pylon_core::convert::attr_type_of;
use pylon_core::provider::{ProviderError, ProviderResult, ResourceId};
use pylon_core::settings::MapperConfig;
use pylon_core::value::StringValue;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ClusterClient;

// =============================================================================
// Resource Kind Registry
// =============================================================================

/// One field of a resource kind's wire model
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub tag: &'static str,
    /// Declared wire type (e.g. `Option<Vec<string>>`)
    pub wire_type: String,
    /// Config attribute type the field maps to
    pub attr_type: String,
}

/// Offline view of a resource kind: payload projection without a cluster
pub trait ResourceKind: Send + Sync {
    /// Kind name (e.g., "nfs_export")
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Decode an API payload and project it into state, rendered as JSON
    fn read_payload(&self, payload: &Value, config: &MapperConfig) -> ProviderResult<Value>;

    /// Project an API payload into state and back into a request body
    ///
    /// An explicit `null` in the payload becomes null state, which a request
    /// body never carries, so it is missing from the result.
    fn round_trip(&self, payload: &Value, config: &MapperConfig) -> ProviderResult<Value>;

    /// Wire fields with their declared and mapped types
    fn schema(&self) -> Vec<SchemaField>;
}

macro_rules! define_resource_kind {
    ($name:ident, $type_name:expr, $description:expr, $wire:ty, $model:ty, $copy:path) => {
        pub struct $name;

        impl ResourceKind for $name {
            fn name(&self) -> &'static str {
                $type_name
            }

            fn description(&self) -> &'static str {
                $description
            }

            fn read_payload(&self, payload: &Value, config: &MapperConfig) -> ProviderResult<Value> {
                let wire: $wire = serde_json::from_value(payload.clone())?;
                let mut state = <$model>::default();
                $copy(&wire, &mut state, config)?;
                let state = pylon_core::value::AttrValue::Object(
                    pylon_core::model::ConfigModel::to_object(&state),
                );
                Ok(state.to_json()?)
            }

            fn round_trip(&self, payload: &Value, config: &MapperConfig) -> ProviderResult<Value> {
                let wire: $wire = serde_json::from_value(payload.clone())?;
                let mut state = <$model>::default();
                $copy(&wire, &mut state, config)?;
                let mut body = <$wire>::default();
                pylon_core::project::read_from_state_with(&state, &mut body, config)?;
                Ok(serde_json::to_value(&body)?)
            }

            fn schema(&self) -> Vec<SchemaField> {
                schema_of(<$wire as pylon_core::wire::WireModel>::field_specs())
            }
        }
    };
}

define_resource_kind!(
    NfsExportKind,
    "nfs_export",
    "NFS export of one or more directory paths",
    nfs_export::NfsExport,
    nfs_export::NfsExportModel,
    pylon_core::project::copy_fields_with
);
define_resource_kind!(
    QuotaKind,
    "quota",
    "Directory, user or group quota with usage counters",
    quota::Quota,
    quota::QuotaModel,
    pylon_core::project::copy_fields_to_non_nested_with
);
define_resource_kind!(
    NetworkPoolKind,
    "network_pool",
    "IP address pool with its member interfaces",
    network_pool::NetworkPool,
    network_pool::NetworkPoolModel,
    pylon_core::project::copy_fields_with
);

/// Returns all resource kinds supported by this provider
pub fn resource_kinds() -> Vec<Box<dyn ResourceKind>> {
    vec![
        Box::new(NfsExportKind),
        Box::new(QuotaKind),
        Box::new(NetworkPoolKind),
    ]
}

/// Look up a resource kind by name
pub fn find_kind(name: &str) -> Option<Box<dyn ResourceKind>> {
    resource_kinds().into_iter().find(|k| k.name() == name)
}

fn schema_of(specs: &[pylon_core::wire::WireFieldSpec]) -> Vec<SchemaField> {
    specs
        .iter()
        .map(|spec| SchemaField {
            tag: spec.tag,
            wire_type: spec.ty.to_string(),
            attr_type: attr_type_of(&spec.ty).to_string(),
        })
        .collect()
}

// =============================================================================
// REST Endpoint
// =============================================================================

/// REST collection holding the documents of one resource kind
pub(crate) struct Endpoint {
    client: Arc<dyn ClusterClient>,
    collection: &'static str,
    kind: &'static str,
}

impl Endpoint {
    pub(crate) fn new(
        client: Arc<dyn ClusterClient>,
        collection: &'static str,
        kind: &'static str,
    ) -> Self {
        Self {
            client,
            collection,
            kind,
        }
    }

    pub(crate) fn resource_id(&self, id: &str) -> ResourceId {
        ResourceId::new(self.kind, id)
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection, id)
    }

    /// Identifier recorded in state
    pub(crate) fn known_id<'m>(&self, id: &'m StringValue) -> ProviderResult<&'m str> {
        id.known()
            .map(String::as_str)
            .ok_or_else(|| ProviderError::new(format!("{} has no id in state", self.kind)))
    }

    /// POST `body` and return the id the cluster assigned
    pub(crate) async fn create(&self, body: &(impl Serialize + Sync)) -> ProviderResult<String> {
        let body = serde_json::to_value(body)?;
        let response = self.client.post(self.collection, body).await?;
        let id = match response.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(ProviderError::new(format!(
                    "{}: create response carries no id",
                    self.kind
                )));
            }
        };
        log::info!("created {}", self.resource_id(&id));
        Ok(id)
    }

    /// GET and decode the document `id`; `None` if it does not exist
    pub(crate) async fn fetch<W: DeserializeOwned>(&self, id: &str) -> ProviderResult<Option<W>> {
        let Some(document) = self.client.get(&self.item_path(id)).await? else {
            log::debug!("{} not found", self.resource_id(id));
            return Ok(None);
        };
        serde_json::from_value(document)
            .map(Some)
            .map_err(|e| ProviderError::from(e).for_resource(self.resource_id(id)))
    }

    pub(crate) async fn modify(&self, id: &str, body: &(impl Serialize + Sync)) -> ProviderResult<()> {
        let body = serde_json::to_value(body)?;
        self.client
            .put(&self.item_path(id), body)
            .await
            .map_err(|e| e.for_resource(self.resource_id(id)))?;
        log::info!("updated {}", self.resource_id(id));
        Ok(())
    }

    pub(crate) async fn remove(&self, id: &str) -> ProviderResult<()> {
        self.client
            .delete(&self.item_path(id))
            .await
            .map_err(|e| e.for_resource(self.resource_id(id)))?;
        log::info!("deleted {}", self.resource_id(id));
        Ok(())
    }

    /// Error for a resource that disappeared while it was being applied
    pub(crate) fn vanished(&self, id: &str) -> ProviderError {
        ProviderError::new("resource disappeared while being applied")
            .for_resource(self.resource_id(id))
    }
}
