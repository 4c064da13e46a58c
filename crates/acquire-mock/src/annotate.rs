//! Declaration surface for an entity type's mock rules.
//!
//! ```ignore
//! impl Mockable for PostDto {
//!     fn declare_mocks(mocks: &mut EntityMocks<'_, Self>) {
//!         mocks
//!             .mock_id("id")
//!             .mock_relation_id::<UserDto>("user_id")
//!             .mock_relation_property::<UserDto>("author", "name")
//!             .mock("title", FieldRule::literal("Hello"));
//!     }
//! }
//!
//! registry.register::<PostDto>();
//! ```

use std::marker::PhantomData;

use acquire_core::{Entity, EntityType};

use crate::registry::MockRegistry;
use crate::rule::FieldRule;

/// An entity type that declares its own mock rules.
pub trait Mockable: Entity {
    fn declare_mocks(mocks: &mut EntityMocks<'_, Self>);
}

/// Builder writing field rules for `T` into a registry.
pub struct EntityMocks<'r, T> {
    registry: &'r MockRegistry,
    entity: EntityType,
    _entity: PhantomData<fn() -> T>,
}

impl<'r, T: Entity> EntityMocks<'r, T> {
    pub fn new(registry: &'r MockRegistry) -> Self {
        Self {
            registry,
            entity: EntityType::of::<T>(),
            _entity: PhantomData,
        }
    }

    pub fn mock(&mut self, field: &str, rule: impl Into<FieldRule>) -> &mut Self {
        self.registry.register_field(self.entity, field, rule.into());
        self
    }

    /// Identity field backed by the per-type sequence (1, 2, 3, ...).
    pub fn mock_id(&mut self, field: &str) -> &mut Self {
        self.registry.register_identity(self.entity, field, None);
        self
    }

    pub fn mock_id_with(&mut self, field: &str, rule: impl Into<FieldRule>) -> &mut Self {
        self.registry
            .register_identity(self.entity, field, Some(rule.into()));
        self
    }

    /// Field holding a freshly generated `U`.
    pub fn mock_nested<U: Entity>(&mut self, field: &str) -> &mut Self {
        self.mock(field, FieldRule::nested::<U>())
    }

    /// Field holding the identity of a random cached `U`.
    pub fn mock_relation_id<U: Entity>(&mut self, field: &str) -> &mut Self {
        self.registry
            .register_relation_by_identity(self.entity, field, EntityType::of::<U>());
        self
    }

    /// Field copied from `target_field` of the same `U` chosen for this instance.
    pub fn mock_relation_property<U: Entity>(
        &mut self,
        field: &str,
        target_field: &str,
    ) -> &mut Self {
        self.registry.register_relation_by_property(
            self.entity,
            field,
            EntityType::of::<U>(),
            target_field,
        );
        self
    }
}

impl MockRegistry {
    /// Start declaring rules for `T`.
    pub fn entity<T: Entity>(&self) -> EntityMocks<'_, T> {
        EntityMocks::new(self)
    }

    /// Run `T`'s own declarations against this registry.
    pub fn register<T: Mockable>(&self) {
        T::declare_mocks(&mut self.entity::<T>());
    }
}
