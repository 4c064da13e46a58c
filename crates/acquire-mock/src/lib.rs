//! Deterministic, relation-aware mock data for simulated REST backends.
//!
//! Entity types declare per-field generator rules in a [`MockRegistry`]; the
//! [`MockGenerator`] instantiates them, resolving relations against a
//! seeded [`MockCache`]; a [`DatabaseSimulator`] answers sort, filter,
//! paginate, search and mutation queries over one cache partition.

pub mod annotate;
pub mod cache;
pub mod faker;
pub mod generator;
pub mod registry;
mod relation;
pub mod rule;
pub mod simulator;

pub use acquire_core::{Entity, EntityType, GenerationContext, MockError, Result};
pub use annotate::{EntityMocks, Mockable};
pub use cache::MockCache;
pub use faker::Faker;
pub use generator::MockGenerator;
pub use registry::{EntityRules, MockRegistry, Relation};
pub use rule::FieldRule;
pub use simulator::{DatabaseSimulator, SortDirection};
