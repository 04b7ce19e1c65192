//! Error - Failures raised while projecting between wire and config models
//!
//! Every variant carries the dotted path of the field being mapped when the
//! error arose. Errors from nested fields propagate unchanged to the caller.

use thiserror::Error;

/// Path rendered for errors raised at the top of a projection
const ROOT_PATH: &str = "<root>";

fn display_path(path: &str) -> &str {
    if path.is_empty() { ROOT_PATH } else { path }
}

/// Mapping error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// A value has the wrong structural shape for its destination
    /// (e.g. an object written into a scalar wire field)
    #[error("{}: expected {expected}, got {found}", display_path(path))]
    Shape {
        path: String,
        expected: String,
        found: String,
    },

    /// The produced value does not match the destination's declared type
    #[error("{}: type mismatch: expected {expected}, got {found}", display_path(path))]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Numeric conversion would overflow the destination
    #[error("{}: value {value} is out of range for {target}", display_path(path))]
    Overflow {
        path: String,
        value: String,
        target: &'static str,
    },

    /// A nested wire field has no counterpart in the config model
    #[error("{}: no field tagged '{tag}' in {type_name}", display_path(path))]
    FieldNotFound {
        path: String,
        tag: String,
        type_name: &'static str,
    },

    /// Traversal went deeper than the configured limit
    #[error("{}: nesting exceeds the limit of {limit} levels", display_path(path))]
    DepthExceeded { path: String, limit: usize },

    /// A typed null was requested for a container whose element type is unknown
    #[error("{}: cannot build a null {container} without an element type", display_path(path))]
    MissingType {
        path: String,
        container: &'static str,
    },

    /// A container was built from elements that do not fit its declared type
    #[error("{}: {message}", display_path(path))]
    InvalidValue { path: String, message: String },
}

impl MapError {
    /// Dotted path of the field the error refers to
    pub fn path(&self) -> &str {
        match self {
            MapError::Shape { path, .. }
            | MapError::TypeMismatch { path, .. }
            | MapError::Overflow { path, .. }
            | MapError::FieldNotFound { path, .. }
            | MapError::DepthExceeded { path, .. }
            | MapError::MissingType { path, .. }
            | MapError::InvalidValue { path, .. } => path,
        }
    }

    /// Fill in the path if the error was raised without one
    pub fn at(mut self, field_path: &str) -> Self {
        let slot = match &mut self {
            MapError::Shape { path, .. }
            | MapError::TypeMismatch { path, .. }
            | MapError::Overflow { path, .. }
            | MapError::FieldNotFound { path, .. }
            | MapError::DepthExceeded { path, .. }
            | MapError::MissingType { path, .. }
            | MapError::InvalidValue { path, .. } => path,
        };
        if slot.is_empty() {
            *slot = field_path.to_string();
        }
        self
    }

    /// Whether this is a type mismatch (subject to the mismatch policy)
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, MapError::TypeMismatch { .. })
    }
}

pub type MapResult<T> = Result<T, MapError>;
