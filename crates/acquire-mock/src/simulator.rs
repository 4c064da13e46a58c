use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use acquire_core::{
    Entity, EntityType, GenerationContext, Result, compare_values, field_of, instantiate_from_value,
    merge_patch, search_text, to_plain,
};

use crate::cache::MockCache;
use crate::generator::MockGenerator;

const DEFAULT_ID_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Chainable query and mutation view over one cache partition.
///
/// Query stages (`sort`, `filter`, `paginate`, `search`) return a new
/// simulator over a transformed working set and never touch the cache.
/// Lookups and mutations (`find`, `create`, `update`, `delete`, `count`)
/// always go to the live partition.
pub struct DatabaseSimulator<'c, T> {
    cache: &'c MockCache,
    data: Vec<T>,
}

impl<'c, T: Entity> DatabaseSimulator<'c, T> {
    pub fn new(cache: &'c MockCache) -> Self {
        Self {
            cache,
            data: cache.get::<T>(),
        }
    }

    /// Simulator over an explicit working set.
    pub fn with_data(cache: &'c MockCache, data: Vec<T>) -> Self {
        Self { cache, data }
    }

    /// The current working set.
    pub fn get(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Fresh simulator over the live partition, discarding chained stages.
    pub fn reset(&self) -> Self {
        Self::new(self.cache)
    }

    /// Stable sort on a named field. No-op without a field.
    pub fn sort(&self, field: Option<&str>, direction: SortDirection) -> Self {
        let Some(field) = field else {
            return self.derive(self.data.clone());
        };
        let mut keyed: Vec<(Value, &T)> = self
            .data
            .iter()
            .map(|item| (field_of(item, field).unwrap_or(Value::Null), item))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match direction {
            SortDirection::Asc => compare_values(a, b),
            SortDirection::Desc => compare_values(b, a),
        });
        self.derive(keyed.into_iter().map(|(_, item)| item.clone()).collect())
    }

    /// Stable sort with a typed comparator.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> Self {
        let mut data = self.data.clone();
        data.sort_by(compare);
        self.derive(data)
    }

    /// Keep items matching `predicate`. No-op without one.
    pub fn filter(&self, predicate: Option<&dyn Fn(&T) -> bool>) -> Self {
        match predicate {
            Some(predicate) => self.derive(
                self.data
                    .iter()
                    .filter(|item| predicate(item))
                    .cloned()
                    .collect(),
            ),
            None => self.derive(self.data.clone()),
        }
    }

    /// Slice out page `page` of `page_size` items, where `base_index` is the
    /// number of the first page. No-op unless both page and size are given;
    /// pages before `base_index` or past the end are empty.
    pub fn paginate(&self, page: Option<i64>, page_size: Option<usize>, base_index: i64) -> Self {
        let (Some(page), Some(page_size)) = (page, page_size) else {
            return self.derive(self.data.clone());
        };
        let start = page
            .checked_sub(base_index)
            .and_then(|page| usize::try_from(page).ok())
            .and_then(|page| page.checked_mul(page_size));
        let data = match start {
            Some(start) => self
                .data
                .iter()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        self.derive(data)
    }

    /// Keep items where any of `fields`, converted to text, contains
    /// `keyword`. No-op unless a non-empty keyword and fields are given.
    pub fn search(
        &self,
        keyword: Option<&str>,
        fields: Option<&[&str]>,
        case_sensitive: bool,
    ) -> Self {
        let (Some(keyword), Some(fields)) = (keyword.filter(|k| !k.is_empty()), fields) else {
            return self.derive(self.data.clone());
        };
        let needle = if case_sensitive {
            keyword.to_string()
        } else {
            keyword.to_lowercase()
        };
        let is_match = |item: &T| {
            let Ok(plain) = to_plain(item) else {
                return false;
            };
            fields.iter().any(|field| {
                plain.get(*field).is_some_and(|value| {
                    let text = search_text(value);
                    if case_sensitive {
                        text.contains(&needle)
                    } else {
                        text.to_lowercase().contains(&needle)
                    }
                })
            })
        };
        self.derive(self.data.iter().filter(|item| is_match(item)).cloned().collect())
    }

    /// First item of the live partition matching `predicate`.
    ///
    /// The predicate runs over a snapshot, so it may itself read or write
    /// the cache.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.cache.get::<T>().into_iter().find(|item| predicate(item))
    }

    /// Evaluate `T`'s identity rule without creating an instance.
    ///
    /// For the default sequence this advances the counter, so the returned
    /// identity is reserved for the caller.
    pub async fn generate_next_id(&self) -> Result<Option<Value>> {
        let entity = EntityType::of::<T>();
        let registry = self.cache.registry();
        let Some(rule) = registry.identity_rule(entity) else {
            return Ok(None);
        };
        MockGenerator::new(registry)
            .evaluate(entity, &rule, &GenerationContext::default())
            .await
    }

    /// Store `item` in the live partition and return it.
    pub fn create(&self, item: T) -> T {
        self.cache.add(item)
    }

    /// Coerce plain data into a `T`, store it and return it.
    pub fn create_from(&self, data: Value) -> Result<T> {
        let item = instantiate_from_value::<T>(data)?;
        Ok(self.cache.add(item))
    }

    /// Shallow-merge `patch` into the item whose `id` field equals `id`.
    pub fn update(&self, id: impl Into<Value>, patch: &Value) -> Result<Option<T>> {
        self.update_by(DEFAULT_ID_FIELD, id, patch)
    }

    /// Shallow-merge `patch` into the first item whose `id_field` equals `id`.
    /// The replacement keeps the item's position in the partition.
    pub fn update_by(
        &self,
        id_field: &str,
        id: impl Into<Value>,
        patch: &Value,
    ) -> Result<Option<T>> {
        let id = id.into();
        let empty = Map::new();
        let patch = patch.as_object().unwrap_or(&empty);
        let updated = self.cache.with_partition_mut::<T, _>(|items| -> Result<Option<T>> {
            let Some(index) = position_of(items, id_field, &id) else {
                return Ok(None);
            };
            let merged = merge_patch(&items[index], patch)?;
            items[index] = merged.clone();
            Ok(Some(merged))
        })?;
        if updated.is_some() {
            let entity = EntityType::of::<T>();
            debug!(entity = %entity, id = %id, "simulated update applied");
        }
        Ok(updated)
    }

    /// Remove the item whose `id` field equals `id`.
    pub fn delete(&self, id: impl Into<Value>) -> bool {
        self.delete_by(DEFAULT_ID_FIELD, id)
    }

    /// Remove the first item whose `id_field` equals `id`. Returns whether
    /// anything was removed.
    pub fn delete_by(&self, id_field: &str, id: impl Into<Value>) -> bool {
        let id = id.into();
        self.cache.with_partition_mut::<T, _>(|items| {
            match position_of(items, id_field, &id) {
                Some(index) => {
                    items.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Size of the live partition, ignoring any chained stages.
    pub fn count(&self) -> usize {
        self.cache.size::<T>()
    }

    fn derive(&self, data: Vec<T>) -> Self {
        Self::with_data(self.cache, data)
    }
}

impl<T: Entity> Clone for DatabaseSimulator<'_, T> {
    fn clone(&self) -> Self {
        self.derive(self.data.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for DatabaseSimulator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSimulator")
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

fn position_of<T: Entity>(items: &[T], id_field: &str, id: &Value) -> Option<usize> {
    items
        .iter()
        .position(|item| field_of(item, id_field).as_ref() == Some(id))
}
