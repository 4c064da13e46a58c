//! Conversion between typed entities and plain JSON data.
//!
//! Plain data is overlaid onto the entity's default representation, so a
//! partial object still produces a complete instance.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entity::{Entity, short_type_name};
use crate::error::{MockError, Result};

/// Build a `T` from named field values, defaulting every field not supplied.
pub fn instantiate<T: Entity>(fields: Map<String, Value>) -> Result<T> {
    let mut base = default_fields::<T>()?;
    base.extend(fields);
    serde_json::from_value(Value::Object(base)).map_err(|source| MockError::Coerce {
        entity: short_type_name::<T>().to_string(),
        source,
    })
}

/// Like [`instantiate`], but accepts any JSON value.
///
/// Objects are overlaid onto the default instance; other values must
/// deserialize into `T` directly.
pub fn instantiate_from_value<T: Entity>(value: Value) -> Result<T> {
    match value {
        Value::Object(fields) => instantiate(fields),
        other => serde_json::from_value(other).map_err(|source| MockError::Coerce {
            entity: short_type_name::<T>().to_string(),
            source,
        }),
    }
}

/// Named fields of an instance.
pub fn to_plain<T: Serialize>(item: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(item)? {
        Value::Object(map) => Ok(map),
        _ => Err(MockError::NotAnObject {
            entity: short_type_name::<T>().to_string(),
        }),
    }
}

/// Shallow-merge `patch` over `item` and rebuild the instance.
pub fn merge_patch<T: Entity>(item: &T, patch: &Map<String, Value>) -> Result<T> {
    let mut fields = to_plain(item)?;
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
    serde_json::from_value(Value::Object(fields)).map_err(|source| MockError::Coerce {
        entity: short_type_name::<T>().to_string(),
        source,
    })
}

fn default_fields<T: Entity>() -> Result<Map<String, Value>> {
    to_plain(&T::default())
}
