use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};
use tracing::debug;

use acquire_core::{Entity, EntityType, GenerationContext, Result, to_plain};

use crate::generator::MockGenerator;
use crate::registry::MockRegistry;
use crate::simulator::DatabaseSimulator;

trait ErasedPartition: Send + Sync {
    fn len(&self) -> usize;
    fn plain_at(&self, index: usize) -> Result<Option<Map<String, Value>>>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Partition<T> {
    items: Vec<T>,
}

impl<T: Entity> ErasedPartition for Partition<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn plain_at(&self, index: usize) -> Result<Option<Map<String, Value>>> {
        self.items.get(index).map(to_plain).transpose()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type Partitions = HashMap<EntityType, Box<dyn ErasedPartition>>;

/// In-memory store of mock instances, partitioned by entity type, plus the
/// seeded random source used for relation picks.
///
/// Reproducible output requires seeding before generation and keeping the
/// order of `fill`/`add` calls stable between runs.
pub struct MockCache {
    registry: Arc<MockRegistry>,
    partitions: RwLock<Partitions>,
    rng: Mutex<ChaCha8Rng>,
}

impl MockCache {
    pub fn new(registry: Arc<MockRegistry>) -> Self {
        Self {
            registry,
            partitions: RwLock::new(HashMap::new()),
            rng: Mutex::new(ChaCha8Rng::from_rng(&mut rand::rng())),
        }
    }

    pub fn with_seed(registry: Arc<MockRegistry>, seed: u64) -> Self {
        let cache = Self::new(registry);
        cache.seed(seed);
        cache
    }

    pub fn registry(&self) -> &Arc<MockRegistry> {
        &self.registry
    }

    /// Replace the random source with one seeded from `seed`. Cached
    /// instances are kept.
    pub fn seed(&self, seed: u64) {
        debug!(seed, "mock cache reseeded");
        *self.rng() = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Run `f` with exclusive access to the shared random source. `f` must
    /// not call back into this cache.
    pub(crate) fn with_rng<R>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> R) -> R {
        f(&mut self.rng())
    }

    /// Generate `count` instances of `T` and append them to its partition.
    /// Returns only the new instances.
    pub async fn fill<T: Entity>(&self, count: usize) -> Result<Vec<T>> {
        self.fill_with_context(count, None).await
    }

    pub async fn fill_with_context<T: Entity>(
        &self,
        count: usize,
        context: Option<&GenerationContext>,
    ) -> Result<Vec<T>> {
        let generated = MockGenerator::new(&self.registry)
            .with_cache(self)
            .generate_many::<T>(count, context)
            .await?;
        let total = self.with_partition_mut::<T, _>(|items| {
            items.extend(generated.iter().cloned());
            items.len()
        });
        let entity = EntityType::of::<T>();
        debug!(entity = %entity, count, total, "mock cache filled");
        Ok(generated)
    }

    /// Append `value` as-is and return it.
    pub fn add<T: Entity>(&self, value: T) -> T {
        self.with_partition_mut::<T, _>(|items| items.push(value.clone()));
        value
    }

    /// Generate one instance of `T`, append it and return it.
    pub async fn add_generated<T: Entity>(&self) -> Result<T> {
        let value = MockGenerator::new(&self.registry)
            .with_cache(self)
            .generate_one::<T>(None)
            .await?;
        Ok(self.add(value))
    }

    /// Snapshot of `T`'s partition; empty if none exists.
    pub fn get<T: Entity>(&self) -> Vec<T> {
        self.with_partition::<T, _>(|items| items.to_vec())
    }

    /// Remove the first instance equal to `value`. Returns whether one was removed.
    pub fn remove<T: Entity>(&self, value: &T) -> bool {
        self.with_partition_mut::<T, _>(|items| {
            match items.iter().position(|item| item == value) {
                Some(index) => {
                    items.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Drop `T`'s partition entirely.
    pub fn clear<T: Entity>(&self) {
        self.write().remove(&EntityType::of::<T>());
    }

    /// Drop every partition.
    pub fn clear_all(&self) {
        self.write().clear();
    }

    /// Number of cached instances of `T`.
    pub fn size<T: Entity>(&self) -> usize {
        self.read()
            .get(&EntityType::of::<T>())
            .map_or(0, |partition| partition.len())
    }

    /// Number of distinct entity types with a partition.
    pub fn partition_count(&self) -> usize {
        self.read().len()
    }

    /// Whether `T` has a partition, even an empty one.
    pub fn has<T: Entity>(&self) -> bool {
        self.read().contains_key(&EntityType::of::<T>())
    }

    pub fn create_simulator<T: Entity>(&self) -> DatabaseSimulator<'_, T> {
        DatabaseSimulator::new(self)
    }

    /// Fields of a uniformly chosen instance of `entity`, or `None` when its
    /// partition is missing or empty.
    pub(crate) fn pick_random(&self, entity: EntityType) -> Result<Option<Map<String, Value>>> {
        let partitions = self.read();
        let Some(partition) = partitions.get(&entity) else {
            return Ok(None);
        };
        let len = partition.len();
        if len == 0 {
            return Ok(None);
        }
        let index = self.with_rng(|rng| rng.random_range(0..len));
        partition.plain_at(index)
    }

    // `f` runs under the partitions lock and must not touch the cache.
    pub(crate) fn with_partition<T: Entity, R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let partitions = self.read();
        let items = partitions
            .get(&EntityType::of::<T>())
            .and_then(|partition| partition.as_any().downcast_ref::<Partition<T>>())
            .map_or(&[][..], |partition| partition.items.as_slice());
        f(items)
    }

    /// Mutable access to `T`'s partition, creating it on first write.
    pub(crate) fn with_partition_mut<T: Entity, R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut partitions = self.write();
        let slot = partitions
            .entry(EntityType::of::<T>())
            .or_insert_with(|| -> Box<dyn ErasedPartition> {
                Box::new(Partition::<T> { items: Vec::new() })
            });
        match slot.as_any_mut().downcast_mut::<Partition<T>>() {
            Some(partition) => f(&mut partition.items),
            None => f(&mut Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions> {
        self.partitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions> {
        self.partitions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MockCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<(EntityType, usize)> = self
            .read()
            .iter()
            .map(|(entity, partition)| (*entity, partition.len()))
            .collect();
        f.debug_struct("MockCache").field("partitions", &sizes).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    fn tag(label: &str) -> Tag {
        Tag {
            label: label.to_string(),
        }
    }

    #[test]
    fn add_get_remove_round_trip() {
        let cache = MockCache::new(Arc::new(MockRegistry::new()));
        assert!(!cache.has::<Tag>());
        assert_eq!(cache.size::<Tag>(), 0);

        cache.add(tag("a"));
        cache.add(tag("b"));
        assert_eq!(cache.size::<Tag>(), 2);
        assert!(cache.get::<Tag>().contains(&tag("a")));

        assert!(cache.remove(&tag("a")));
        assert!(!cache.remove(&tag("missing")));
        assert_eq!(cache.get::<Tag>(), vec![tag("b")]);
        assert_eq!(cache.size::<Tag>(), 1);
    }

    #[test]
    fn emptied_partition_still_exists_until_cleared() {
        let cache = MockCache::new(Arc::new(MockRegistry::new()));
        cache.add(tag("a"));
        cache.remove(&tag("a"));
        assert!(cache.has::<Tag>());
        assert_eq!(cache.partition_count(), 1);

        cache.clear::<Tag>();
        assert!(!cache.has::<Tag>());
        assert_eq!(cache.partition_count(), 0);
    }

    #[test]
    fn reseeding_repeats_the_random_sequence_without_clearing() {
        let cache = MockCache::with_seed(Arc::new(MockRegistry::new()), 7);
        cache.add(tag("kept"));
        let first: Vec<u32> = (0..4).map(|_| cache.with_rng(|rng| rng.random())).collect();

        cache.seed(7);
        let second: Vec<u32> = (0..4).map(|_| cache.with_rng(|rng| rng.random())).collect();

        assert_eq!(first, second);
        assert_eq!(cache.size::<Tag>(), 1);
    }
}
