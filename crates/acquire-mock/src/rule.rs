use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use acquire_core::{Entity, EntityType, GenerationContext, Result};

use crate::generator::MockGenerator;
use crate::registry::MockRegistry;

pub type SyncGenerator = Arc<dyn Fn(&GenerationContext) -> Value + Send + Sync>;
pub type AsyncGenerator = Arc<dyn Fn(GenerationContext) -> BoxFuture<'static, Value> + Send + Sync>;
pub type NestedBuilder = for<'a> fn(&'a MockRegistry) -> BoxFuture<'a, Result<Value>>;

/// How a single field obtains its mock value.
#[derive(Clone)]
pub enum FieldRule {
    /// Fixed value copied into every instance.
    Literal(Value),
    /// Callback evaluated once per instance.
    Sync(SyncGenerator),
    /// Callback whose value is awaited once per instance.
    Async(AsyncGenerator),
    /// A freshly generated instance of another entity type.
    Nested {
        entity: EntityType,
        build: NestedBuilder,
    },
    /// Per-type counter starting at 1; the default identity rule.
    Sequence,
    /// Value supplied by relation resolution; yields nothing on its own.
    Placeholder,
}

impl FieldRule {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn sync<F>(generate: F) -> Self
    where
        F: Fn(&GenerationContext) -> Value + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(generate))
    }

    pub fn from_async<F, Fut>(generate: F) -> Self
    where
        F: Fn(GenerationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        Self::Async(Arc::new(move |context| generate(context).boxed()))
    }

    pub fn nested<T: Entity>() -> Self {
        Self::Nested {
            entity: EntityType::of::<T>(),
            build: build_nested::<T>,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Sync(_) => "sync",
            Self::Async(_) => "async",
            Self::Nested { .. } => "nested",
            Self::Sequence => "sequence",
            Self::Placeholder => "placeholder",
        }
    }
}

impl From<Value> for FieldRule {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Nested { entity, .. } => f.debug_tuple("Nested").field(entity).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

// Nested instances are generated without a cache or context.
fn build_nested<T: Entity>(registry: &MockRegistry) -> BoxFuture<'_, Result<Value>> {
    async move {
        let instance = MockGenerator::new(registry).generate_one::<T>(None).await?;
        Ok(serde_json::to_value(instance)?)
    }
    .boxed()
}
