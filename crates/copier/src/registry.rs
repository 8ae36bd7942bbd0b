//! The `EntityRegistry` trait and the record-type descriptors it hands out.
//!
//! A registry is the run-time catalogue of record types: it resolves a
//! `(namespace, type name)` pair to a [`RecordType`] describing the type's
//! fields, and offers the query/creation operations the copier needs.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::RegistryError;

// ---------------------------------------------------------------------------
// ModelRef
// ---------------------------------------------------------------------------

/// Identifies a record type inside a registry.
///
/// Type names compare case-insensitively (`Profile` and `profile` are the same
/// model); namespaces compare exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRef {
    pub namespace: String,
    pub type_name: String,
}

impl ModelRef {
    pub fn new(namespace: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
        }
    }

    /// Lookup key used by registries.
    pub fn key(&self) -> (String, String) {
        (self.namespace.clone(), self.type_name.to_lowercase())
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.type_name.to_lowercase() == other.type_name.to_lowercase()
    }
}

impl Eq for ModelRef {}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.type_name)
    }
}

// ---------------------------------------------------------------------------
// Field descriptors
// ---------------------------------------------------------------------------

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain scalar, text or date value.
    Scalar,
    /// The primary key of a record of another type.
    Reference(ModelRef),
}

/// One declared field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: FieldKind::Scalar }
    }

    pub fn reference(name: impl Into<String>, target: ModelRef) -> Self {
        Self { name: name.into(), kind: FieldKind::Reference(target) }
    }

    /// The referenced model, for reference fields.
    pub fn target(&self) -> Option<&ModelRef> {
        match &self.kind {
            FieldKind::Reference(target) => Some(target),
            FieldKind::Scalar => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RecordType
// ---------------------------------------------------------------------------

/// A reified record type: its identity, primary key and declared fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    pub model: ModelRef,
    /// Name of the primary-key field. It is also listed in `fields`.
    pub primary_key: String,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordType {
    /// A record type whose only field is the scalar primary key.
    pub fn new(model: ModelRef, primary_key: impl Into<String>) -> Self {
        let primary_key = primary_key.into();
        Self {
            model,
            fields: vec![FieldDescriptor::scalar(primary_key.clone())],
            primary_key,
        }
    }

    /// Builder: declare a scalar field.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDescriptor::scalar(name));
        self
    }

    /// Builder: declare a reference field.
    pub fn reference(mut self, name: impl Into<String>, target: ModelRef) -> Self {
        self.fields.push(FieldDescriptor::reference(name, target));
        self
    }

    /// Declared fields in declaration order.
    pub fn describe_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The field called `name`, if this type declares one.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One row: field values addressable by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub values: Map<String, Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    /// This record's primary key under `record_type`; `None` while unsaved.
    pub fn primary_key(&self, record_type: &RecordType) -> Option<&Value> {
        self.values
            .get(&record_type.primary_key)
            .filter(|v| !v.is_null())
    }
}

impl From<Map<String, Value>> for Record {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityRegistry
// ---------------------------------------------------------------------------

/// The live catalogue the copier reads from and writes to.
#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Look a record type up by namespace and name.
    async fn resolve(&self, model: &ModelRef) -> Result<RecordType, RegistryError>;

    /// Every record of `record_type`, in this registry's iteration order.
    async fn all_records(&self, record_type: &RecordType) -> Result<Vec<Record>, RegistryError>;

    /// A new, empty, unsaved record of `record_type`.
    fn new_record(&self, record_type: &RecordType) -> Record;

    /// The record of `record_type` whose primary key equals `key`.
    async fn get(
        &self,
        record_type: &RecordType,
        key: &Value,
    ) -> Result<Option<Record>, RegistryError>;

    /// Persist a new record of `record_type`.
    async fn save(&self, record_type: &RecordType, record: Record) -> Result<(), RegistryError>;
}
