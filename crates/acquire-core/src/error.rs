use thiserror::Error;

/// Errors raised while generating or coercing mock data.
#[derive(Debug, Error)]
pub enum MockError {
    /// A relation points at an entity type that never declared an identity field.
    #[error(
        "field '{field}' on '{entity}' establishes a relation to '{target}', but '{target}' is missing a required identity field; declare one with `mock_id`"
    )]
    MissingIdentity {
        entity: String,
        field: String,
        target: String,
    },
    /// A relation was resolved while the referenced partition was empty.
    #[error(
        "cannot mock '{entity}' with relation to '{target}' (field '{field}'): no instances of '{target}' exist in the mock cache; pre-populate the cache first, e.g. `cache.fill::<{target}>(10)`"
    )]
    EmptyRelation {
        entity: String,
        field: String,
        target: String,
    },
    /// Plain data could not be turned into a typed instance.
    #[error("could not coerce plain data into '{entity}': {source}")]
    Coerce {
        entity: String,
        #[source]
        source: serde_json::Error,
    },
    /// The entity does not serialize to a JSON object, so it has no fields.
    #[error("'{entity}' does not serialize to an object with named fields")]
    NotAnObject { entity: String },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by Acquire crates.
pub type Result<T> = std::result::Result<T, MockError>;
