//! Provider - Resource handlers built on the mapping engine
//!
//! A handler owns one resource kind. It turns a planned config model into
//! request bodies, and folds API responses back into state.

use std::future::Future;
use std::pin::Pin;

use crate::error::MapError;
use crate::model::ConfigModel;

/// Identity of a resource on the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    /// Resource kind (e.g., "nfs_export", "quota")
    pub resource_type: String,
    /// Identifier assigned by the cluster
    pub id: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.id)
    }
}

/// Error type for resource operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}] {}", id, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The mapping error behind this failure, if any
    pub fn map_error(&self) -> Option<&MapError> {
        self.cause.as_ref().and_then(|e| e.downcast_ref::<MapError>())
    }
}

impl From<MapError> for ProviderError {
    fn from(err: MapError) -> Self {
        ProviderError::new(format!("mapping failed: {}", err)).with_cause(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::new(format!("invalid payload: {}", err)).with_cause(err)
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle of one resource kind
///
/// Implementations translate between their config model and the cluster's
/// wire models with the projections in [`crate::project`].
pub trait ResourceHandler: Send + Sync {
    type Model: ConfigModel + Send + Sync;

    /// Resource kind name (e.g., "nfs_export")
    fn name(&self) -> &'static str;

    /// Create the resource and return the resulting state
    fn create<'a>(&'a self, plan: &'a Self::Model)
    -> BoxFuture<'a, ProviderResult<Self::Model>>;

    /// Refresh `state` from the cluster
    ///
    /// Returns `None` if the resource no longer exists.
    fn read<'a>(
        &'a self,
        state: &'a Self::Model,
    ) -> BoxFuture<'a, ProviderResult<Option<Self::Model>>>;

    /// Apply the difference between `state` and `plan`
    fn update<'a>(
        &'a self,
        state: &'a Self::Model,
        plan: &'a Self::Model,
    ) -> BoxFuture<'a, ProviderResult<Self::Model>>;

    fn delete<'a>(&'a self, state: &'a Self::Model) -> BoxFuture<'a, ProviderResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_model;
    use crate::value::{StringValue, TriState};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct ShareModel {
        id: StringValue,
        name: StringValue,
    }
    config_model!(ShareModel { "id" => id, "name" => name });

    // Mock handler for testing
    struct MockHandler;

    impl ResourceHandler for MockHandler {
        type Model = ShareModel;

        fn name(&self) -> &'static str {
            "mock_share"
        }

        fn create<'a>(
            &'a self,
            plan: &'a ShareModel,
        ) -> BoxFuture<'a, ProviderResult<ShareModel>> {
            Box::pin(async move {
                Ok(ShareModel {
                    id: "mock-id-123".into(),
                    ..plan.clone()
                })
            })
        }

        fn read<'a>(
            &'a self,
            _state: &'a ShareModel,
        ) -> BoxFuture<'a, ProviderResult<Option<ShareModel>>> {
            Box::pin(async { Ok(None) })
        }

        fn update<'a>(
            &'a self,
            state: &'a ShareModel,
            plan: &'a ShareModel,
        ) -> BoxFuture<'a, ProviderResult<ShareModel>> {
            Box::pin(async move {
                Ok(ShareModel {
                    id: state.id.clone(),
                    ..plan.clone()
                })
            })
        }

        fn delete<'a>(&'a self, state: &'a ShareModel) -> BoxFuture<'a, ProviderResult<()>> {
            Box::pin(async move {
                if state.id.is_known() {
                    Ok(())
                } else {
                    Err(ProviderError::new("resource has no id"))
                }
            })
        }
    }

    #[tokio::test]
    async fn mock_handler_read_returns_not_found() {
        let handler = MockHandler;
        let state = handler.read(&ShareModel::default()).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn mock_handler_create_assigns_id() {
        let handler = MockHandler;
        let plan = ShareModel {
            name: "data".into(),
            ..Default::default()
        };
        let state = handler.create(&plan).await.unwrap();
        assert_eq!(state.id, TriState::Known("mock-id-123".to_string()));
        assert!(handler.delete(&state).await.is_ok());
        assert!(handler.delete(&plan).await.is_err());
    }

    #[test]
    fn map_error_is_kept_as_cause() {
        let err = ProviderError::from(MapError::DepthExceeded {
            path: "a.b".to_string(),
            limit: 1,
        })
        .for_resource(ResourceId::new("quota", "7"));
        assert!(err.to_string().starts_with("[quota.7] mapping failed"));
        assert!(matches!(err.map_error(), Some(MapError::DepthExceeded { .. })));
    }
}
