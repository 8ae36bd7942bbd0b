//! Registry and copier error types.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::registry::ModelRef;

/// Errors raised by an [`EntityRegistry`](crate::EntityRegistry) implementation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No record type is registered under this namespace/name pair.
    #[error("unknown model '{0}'")]
    UnknownModel(ModelRef),

    /// The record type exists but declares no primary key.
    #[error("model '{0}' has no primary key")]
    NoPrimaryKey(ModelRef),

    /// A field of `model` references a table that belongs to no known namespace.
    #[error("model '{model}' references table '{table}' outside the known namespaces")]
    UnknownTable { model: ModelRef, table: String },

    /// The storage layer rejected a new record.
    #[error("cannot save '{model}' record: {message}")]
    Write {
        model: ModelRef,
        message: String,
    },

    /// The registry's transaction was already finished.
    #[error("registry is closed")]
    Closed,

    /// Persistence error from the db crate.
    #[error("database error: {0}")]
    Storage(#[from] db::DbError),
}

/// Errors produced while copying records from one model to another.
#[derive(Debug, Error)]
pub enum CopyError {
    /// The source, destination or a referenced model cannot be resolved.
    /// Raised before anything is written.
    #[error("model '{0}' cannot be resolved")]
    Lookup(ModelRef),

    /// A reference field names a key with no matching record.
    #[error(
        "'{model}' record {record}: field '{field}' references missing '{target}' with key {key}"
    )]
    DanglingReference {
        model: ModelRef,
        record: Value,
        field: String,
        target: ModelRef,
        key: Value,
    },

    /// The destination storage refused a new record.
    #[error("write failed: {0}")]
    Write(#[source] RegistryError),

    /// Any other registry failure (reads, introspection, transaction handling).
    #[error("registry failure: {0}")]
    Registry(#[source] RegistryError),
}

impl CopyError {
    /// Classify a registry error raised while resolving a model.
    ///
    /// A model whose reference leads outside the registry cannot be described,
    /// so it fails the lookup too.
    pub(crate) fn from_lookup(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownModel(model) => Self::Lookup(model),
            RegistryError::UnknownTable { model, table } => {
                warn!("'{}' references table '{}' outside the known namespaces", model, table);
                Self::Lookup(model)
            }
            other => Self::Registry(other),
        }
    }
}
