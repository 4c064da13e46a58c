use std::collections::HashMap;

use serde_json::{Map, Value};

use acquire_core::{EntityType, MockError, Result};

use crate::cache::MockCache;
use crate::registry::{MockRegistry, Relation};

/// Referenced instances chosen during one generation call.
///
/// Every relation field pointing at the same target type resolves against
/// the same instance.
#[derive(Debug, Default)]
pub(crate) struct RelationScratch {
    chosen: HashMap<EntityType, Map<String, Value>>,
}

impl RelationScratch {
    pub(crate) fn resolve(
        &mut self,
        registry: &MockRegistry,
        cache: &MockCache,
        entity: EntityType,
        field: &str,
        relation: &Relation,
    ) -> Result<Option<Value>> {
        let target = relation.target();
        let identity = registry
            .identity_field(target)
            .ok_or_else(|| MockError::MissingIdentity {
                entity: entity.name().to_string(),
                field: field.to_string(),
                target: target.name().to_string(),
            })?;

        if !self.chosen.contains_key(&target) {
            let referenced =
                cache
                    .pick_random(target)?
                    .ok_or_else(|| MockError::EmptyRelation {
                        entity: entity.name().to_string(),
                        field: field.to_string(),
                        target: target.name().to_string(),
                    })?;
            self.chosen.insert(target, referenced);
        }

        let referenced = self.chosen.get(&target);
        let key = match relation {
            Relation::Identity { .. } => identity.as_str(),
            Relation::Property { field, .. } => field.as_str(),
        };
        Ok(referenced.and_then(|fields| fields.get(key)).cloned())
    }
}
