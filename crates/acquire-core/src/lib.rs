//! Core contracts and helpers for Acquire mocking.
//!
//! This crate defines the entity bound, error taxonomy, generation context and
//! the plain-data helpers shared by the mock registry, cache and simulator.

pub mod coerce;
pub mod context;
pub mod entity;
pub mod error;
pub mod value;

pub use coerce::{instantiate, instantiate_from_value, merge_patch, to_plain};
pub use context::GenerationContext;
pub use entity::{Entity, EntityType, short_type_name};
pub use error::{MockError, Result};
pub use value::{compare_values, field_of, search_text};
