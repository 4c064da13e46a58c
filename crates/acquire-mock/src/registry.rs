use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use acquire_core::EntityType;

use crate::rule::FieldRule;

/// A field whose value is copied from an instance of another entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Copies the referenced instance's identity value.
    Identity { target: EntityType },
    /// Copies `field` from the referenced instance.
    Property { target: EntityType, field: String },
}

impl Relation {
    pub fn target(&self) -> EntityType {
        match self {
            Self::Identity { target } | Self::Property { target, .. } => *target,
        }
    }
}

/// Everything registered for one entity type.
#[derive(Debug, Clone)]
pub struct EntityRules {
    pub entity: EntityType,
    /// Field rules in first-registration order.
    pub fields: Vec<(String, FieldRule)>,
    pub identity: Option<String>,
    pub relations: HashMap<String, Relation>,
}

impl EntityRules {
    fn new(entity: EntityType) -> Self {
        Self {
            entity,
            fields: Vec::new(),
            identity: None,
            relations: HashMap::new(),
        }
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rule)| rule)
    }

    fn set_rule(&mut self, field: &str, rule: FieldRule) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = rule,
            None => self.fields.push((field.to_string(), rule)),
        }
    }
}

/// Metadata describing how to mock every registered entity type.
///
/// Shared by reference (usually behind an `Arc`) between the declaration
/// surface, generators and caches; all methods take `&self`.
#[derive(Debug, Default)]
pub struct MockRegistry {
    entities: RwLock<HashMap<EntityType, EntityRules>>,
    sequences: Mutex<HashMap<EntityType, u64>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rule for a field. Re-registering a field replaces its rule but
    /// keeps its original position.
    pub fn register_field(&self, entity: EntityType, field: &str, rule: FieldRule) {
        debug!(entity = %entity, field, rule = rule.kind(), "mock field registered");
        self.write()
            .entry(entity)
            .or_insert_with(|| EntityRules::new(entity))
            .set_rule(field, rule);
    }

    /// Mark `field` as the identity of `entity`.
    ///
    /// Only the first declaration per type takes effect; later ones are
    /// reported and ignored. Without an explicit rule the field uses the
    /// per-type sequence. Returns whether the declaration was applied.
    pub fn register_identity(
        &self,
        entity: EntityType,
        field: &str,
        rule: Option<FieldRule>,
    ) -> bool {
        {
            let mut entities = self.write();
            let rules = entities
                .entry(entity)
                .or_insert_with(|| EntityRules::new(entity));
            if let Some(existing) = &rules.identity {
                warn!(
                    entity = %entity,
                    existing = %existing,
                    rejected = field,
                    "duplicate identity declaration ignored; identity already set for '{existing}'"
                );
                return false;
            }
            rules.identity = Some(field.to_string());
        }
        self.register_field(entity, field, rule.unwrap_or(FieldRule::Sequence));
        true
    }

    /// Declare `field` as holding the identity of a `target` instance.
    pub fn register_relation_by_identity(
        &self,
        entity: EntityType,
        field: &str,
        target: EntityType,
    ) {
        self.register_relation(entity, field, Relation::Identity { target });
    }

    /// Declare `field` as a copy of `target_field` on the referenced `target`
    /// instance.
    pub fn register_relation_by_property(
        &self,
        entity: EntityType,
        field: &str,
        target: EntityType,
        target_field: &str,
    ) {
        self.register_relation(
            entity,
            field,
            Relation::Property {
                target,
                field: target_field.to_string(),
            },
        );
    }

    fn register_relation(&self, entity: EntityType, field: &str, relation: Relation) {
        self.write()
            .entry(entity)
            .or_insert_with(|| EntityRules::new(entity))
            .relations
            .insert(field.to_string(), relation);
        self.register_field(entity, field, FieldRule::Placeholder);
    }

    /// Restart every identity sequence; field rules are untouched.
    pub fn reset_counters(&self) {
        self.sequences().clear();
    }

    /// Forget every rule, identity, relation and counter.
    pub fn reset_all(&self) {
        self.write().clear();
        self.sequences().clear();
    }

    /// Advance and return the identity sequence of `entity`.
    pub fn next_sequence(&self, entity: EntityType) -> u64 {
        let mut sequences = self.sequences();
        let head = sequences.entry(entity).or_insert(0);
        *head += 1;
        *head
    }

    /// Copy of the rules registered for `entity`.
    pub fn rules(&self, entity: EntityType) -> Option<EntityRules> {
        self.read().get(&entity).cloned()
    }

    pub fn identity_field(&self, entity: EntityType) -> Option<String> {
        self.read()
            .get(&entity)
            .and_then(|rules| rules.identity.clone())
    }

    pub fn identity_rule(&self, entity: EntityType) -> Option<FieldRule> {
        let entities = self.read();
        let rules = entities.get(&entity)?;
        let identity = rules.identity.as_deref()?;
        rules.rule(identity).cloned()
    }

    pub fn field_names(&self, entity: EntityType) -> Vec<String> {
        self.read()
            .get(&entity)
            .map(|rules| rules.fields.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn is_registered(&self, entity: EntityType) -> bool {
        self.read()
            .get(&entity)
            .is_some_and(|rules| !rules.fields.is_empty())
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<EntityType, EntityRules>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<EntityType, EntityRules>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn sequences(&self) -> MutexGuard<'_, HashMap<EntityType, u64>> {
        self.sequences.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
