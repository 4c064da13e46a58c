use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A type whose instances can be mocked, cached and queried.
///
/// Instances are read and written field-by-field through their serde
/// representation, so any plain struct deriving the usual traits qualifies.
pub trait Entity:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static
{
}

impl<T> Entity for T where
    T: Serialize + DeserializeOwned + Default + Clone + PartialEq + Send + Sync + 'static
{
}

/// Runtime descriptor of an entity type.
///
/// Two descriptors are equal only when they describe the same Rust type; the
/// name is carried for diagnostics.
#[derive(Clone, Copy)]
pub struct EntityType {
    id: TypeId,
    name: &'static str,
}

impl EntityType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type name without its module path, e.g. `PostDto` for `app::api::PostDto`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod first {
        pub struct User;
    }

    mod second {
        pub struct User;
    }

    #[test]
    fn descriptors_compare_by_type_not_name() {
        let a = EntityType::of::<first::User>();
        let b = EntityType::of::<second::User>();
        assert_eq!(a.name(), b.name());
        assert_ne!(a, b);
        assert_eq!(a, EntityType::of::<first::User>());
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(short_type_name::<first::User>(), "User");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
