//! Pylon Core
//!
//! Mapping engine between a storage cluster's REST models and tri-state
//! configuration models, plus the resource handler abstraction built on it

pub mod collection;
pub mod context;
pub mod convert;
pub mod error;
pub mod model;
pub mod project;
pub mod provider;
pub mod settings;
pub mod tag;
pub mod value;
pub mod wire;

pub use error::{MapError, MapResult};
pub use model::{ConfigField, ConfigModel};
pub use settings::{MapperConfig, MismatchPolicy};
pub use wire::{Nullable, Wire, WireModel};
