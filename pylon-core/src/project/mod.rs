//! Projections between wire models and config models
//!
//! - [`copy_fields`] fills a config model from an API response, leaving
//!   fields the response omits untouched
//! - [`copy_fields_to_non_nested`] does the same for flat models and records
//!   omitted fields as null
//! - [`read_from_state`] builds a request body from a config model, writing
//!   only known values
//!
//! Fields are matched by tag; a tag present on only one side is skipped.
//!
//! # Example
//!
//! ```
//! use pylon_core::project::{copy_fields, read_from_state};
//! use pylon_core::value::{Int64Value, StringValue, TriState};
//! use pylon_core::{config_model, wire_model};
//!
//! #[derive(Debug, Default)]
//! struct Share {
//!     name: Option<String>,
//!     size: Option<i64>,
//! }
//! wire_model!(Share { "name" => name, "size,omitempty" => size });
//!
//! #[derive(Debug, Clone, Default)]
//! struct ShareModel {
//!     name: StringValue,
//!     size: Int64Value,
//! }
//! config_model!(ShareModel { "name" => name, "size" => size });
//!
//! let response = Share { name: Some("data".to_string()), size: Some(1024) };
//! let mut state = ShareModel::default();
//! copy_fields(&response, &mut state).unwrap();
//! assert_eq!(state.size, TriState::Known(1024));
//!
//! let mut body = Share::default();
//! read_from_state(&ShareModel { size: TriState::Unknown, ..state }, &mut body).unwrap();
//! assert_eq!(body.name.as_deref(), Some("data"));
//! assert_eq!(body.size, None);
//! ```

mod to_config;
mod to_wire;

pub use to_config::{
    copy_fields, copy_fields_to_non_nested, copy_fields_to_non_nested_with, copy_fields_with,
};
pub use to_wire::{read_from_state, read_from_state_with};
