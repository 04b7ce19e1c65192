//! Mapper configuration

use serde::{Deserialize, Serialize};

/// What to do when a produced value does not fit the destination field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Abort the projection with `MapError::TypeMismatch`
    #[default]
    Error,
    /// Leave the destination field untouched and continue
    Skip,
}

/// Mapping options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Maximum nesting depth of a traversal (default: 32)
    pub max_depth: usize,

    /// Decimal digits kept when a float crosses the wire/config boundary (default: 4)
    pub float_precision: u32,

    /// Handling of destination type mismatches (default: error)
    pub on_type_mismatch: MismatchPolicy,

    /// Reject nested wire fields that the config model does not declare
    pub strict_nested_fields: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            float_precision: 4,
            on_type_mismatch: MismatchPolicy::Error,
            strict_nested_fields: false,
        }
    }
}

impl MapperConfig {
    /// Parse a configuration from JSON; omitted keys keep their defaults
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}
