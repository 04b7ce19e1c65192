//! Quotas
//!
//! The quota model is flat: thresholds and usage are carried as object
//! attributes rather than nested models, and every field the cluster omits
//! is recorded as null.

use std::sync::Arc;

use pylon_core::model::{changed_only, null_unknowns};
use pylon_core::project::{copy_fields_to_non_nested_with, read_from_state_with};
use pylon_core::provider::{BoxFuture, ProviderError, ProviderResult, ResourceHandler};
use pylon_core::settings::MapperConfig;
use pylon_core::value::{BoolValue, NumberValue, ObjectValue, StringValue, TriState};
use pylon_core::wire::Nullable;
use pylon_core::{config_model, wire_model};
use serde::{Deserialize, Serialize};

use super::Endpoint;
use crate::client::ClusterClient;

pub const KIND: &str = "quota";
pub const COLLECTION: &str = "/platform/quota/quotas";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<u64>,
    /// Seconds usage may stay above the soft threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_grace: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_advisory: Option<f32>,
}

wire_model!(QuotaThresholds {
    "hard,omitempty" => hard,
    "soft,omitempty" => soft,
    "advisory,omitempty" => advisory,
    "soft_grace,omitempty" => soft_grace,
    "percent_advisory,omitempty" => percent_advisory,
});

/// Usage counters, maintained by the cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inodes: Option<u64>,
}

wire_model!(QuotaUsage {
    "logical,omitempty" => logical,
    "physical,omitempty" => physical,
    "inodes,omitempty" => inodes,
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quota {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub quota_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_snapshots: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<QuotaThresholds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<QuotaUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub description: Nullable<String>,
}

wire_model!(Quota {
    "id,omitempty" => id,
    "path,omitempty" => path,
    "type,omitempty" => quota_type,
    "include_snapshots,omitempty" => include_snapshots,
    "thresholds,omitempty" => thresholds,
    "usage,omitempty" => usage,
    "efficiency_ratio,omitempty" => efficiency_ratio,
    "description" => description,
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaModel {
    pub id: StringValue,
    pub path: StringValue,
    pub quota_type: StringValue,
    pub include_snapshots: BoolValue,
    pub thresholds: ObjectValue,
    pub usage: ObjectValue,
    pub efficiency_ratio: NumberValue,
    pub description: StringValue,
}

config_model!(QuotaModel {
    "id" => id,
    "path" => path,
    "type" => quota_type,
    "include_snapshots" => include_snapshots,
    "thresholds" => thresholds,
    "usage" => usage,
    "efficiency_ratio" => efficiency_ratio,
    "description" => description,
});

pub struct QuotaHandler {
    endpoint: Endpoint,
    config: MapperConfig,
}

impl QuotaHandler {
    pub fn new(client: Arc<dyn ClusterClient>, config: MapperConfig) -> Self {
        Self {
            endpoint: Endpoint::new(client, COLLECTION, KIND),
            config,
        }
    }

    /// Usage and efficiency are reported by the cluster, never sent
    fn request_body(&self, model: &QuotaModel) -> ProviderResult<Quota> {
        let mut body = Quota::default();
        read_from_state_with(model, &mut body, &self.config)?;
        body.id = None;
        body.usage = None;
        body.efficiency_ratio = None;
        Ok(body)
    }

    async fn refresh(&self, mut state: QuotaModel) -> ProviderResult<Option<QuotaModel>> {
        let id = self.endpoint.known_id(&state.id)?.to_string();
        let Some(quota) = self.endpoint.fetch::<Quota>(&id).await? else {
            return Ok(None);
        };
        copy_fields_to_non_nested_with(&quota, &mut state, &self.config)
            .map_err(|e| ProviderError::from(e).for_resource(self.endpoint.resource_id(&id)))?;
        Ok(Some(state))
    }

    async fn create_quota(&self, plan: &QuotaModel) -> ProviderResult<QuotaModel> {
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

    async fn update_quota(&self, state: &QuotaModel, plan: &QuotaModel) -> ProviderResult<QuotaModel> {
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

    async fn delete_quota(&self, state: &QuotaModel) -> ProviderResult<()> {
        let id = self.endpoint.known_id(&state.id)?;
        self.endpoint.remove(id).await
    }
}

impl ResourceHandler for QuotaHandler {
    type Model = QuotaModel;

    fn name(&self) -> &'static str {
        KIND
    }

    fn create<'a>(&'a self, plan: &'a QuotaModel) -> BoxFuture<'a, ProviderResult<QuotaModel>> {
        Box::pin(self.create_quota(plan))
    }

    fn read<'a>(
        &'a self,
        state: &'a QuotaModel,
    ) -> BoxFuture<'a, ProviderResult<Option<QuotaModel>>> {
        Box::pin(self.refresh(state.clone()))
    }

    fn update<'a>(
        &'a self,
        state: &'a QuotaModel,
        plan: &'a QuotaModel,
    ) -> BoxFuture<'a, ProviderResult<QuotaModel>> {
        Box::pin(self.update_quota(state, plan))
    }

    fn delete<'a>(&'a self, state: &'a QuotaModel) -> BoxFuture<'a, ProviderResult<()>> {
        Box::pin(self.delete_quota(state))
    }
}
