use futures::future::try_join_all;
use serde_json::{Map, Value};
use tracing::trace;

use acquire_core::{Entity, EntityType, GenerationContext, Result, instantiate};

use crate::cache::MockCache;
use crate::registry::MockRegistry;
use crate::relation::RelationScratch;
use crate::rule::FieldRule;

/// Instantiates entity types from their registered rules.
///
/// Relation fields are resolved only when a cache is attached; without one
/// they keep their default values.
#[derive(Debug, Clone, Copy)]
pub struct MockGenerator<'a> {
    registry: &'a MockRegistry,
    cache: Option<&'a MockCache>,
}

impl<'a> MockGenerator<'a> {
    pub fn new(registry: &'a MockRegistry) -> Self {
        Self {
            registry,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: &'a MockCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Generate one instance of `T`.
    pub async fn generate_one<T: Entity>(&self, context: Option<&GenerationContext>) -> Result<T> {
        let entity = EntityType::of::<T>();
        let Some(rules) = self.registry.rules(entity) else {
            return Ok(T::default());
        };
        if rules.fields.is_empty() {
            return Ok(T::default());
        }

        let context = context.cloned().unwrap_or_default();
        let mut scratch = RelationScratch::default();
        let mut fields = Map::new();

        for (name, rule) in &rules.fields {
            let value = match (rules.relations.get(name), self.cache) {
                (Some(relation), Some(cache)) => {
                    scratch.resolve(self.registry, cache, entity, name, relation)?
                }
                _ => self.evaluate(entity, rule, &context).await?,
            };
            if let Some(value) = value {
                fields.insert(name.clone(), value);
            }
        }

        trace!(entity = %entity, fields = fields.len(), "mock instance generated");
        instantiate(fields)
    }

    /// Generate `count` independent instances of `T`.
    ///
    /// The generations run interleaved; their relative completion order is
    /// unspecified, but the returned vector has exactly `count` entries.
    pub async fn generate_many<T: Entity>(
        &self,
        count: usize,
        context: Option<&GenerationContext>,
    ) -> Result<Vec<T>> {
        try_join_all((0..count).map(|_| self.generate_one::<T>(context))).await
    }

    pub(crate) async fn evaluate(
        &self,
        entity: EntityType,
        rule: &FieldRule,
        context: &GenerationContext,
    ) -> Result<Option<Value>> {
        let value = match rule {
            FieldRule::Literal(value) => value.clone(),
            FieldRule::Sync(generate) => generate(context),
            FieldRule::Async(generate) => generate(context.clone()).await,
            FieldRule::Nested { build, .. } => build(self.registry).await?,
            FieldRule::Sequence => Value::from(self.registry.next_sequence(entity)),
            FieldRule::Placeholder => return Ok(None),
        };
        Ok(Some(value))
    }
}
