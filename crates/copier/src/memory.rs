//! `MemoryRegistry` — an in-process test double for `EntityRegistry`.
//!
//! Record types are declared up front, records are kept in insertion order,
//! and every `save` is counted so tests can assert how many writes happened.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::registry::{EntityRegistry, ModelRef, Record, RecordType};
use crate::RegistryError;

struct MemoryModel {
    record_type: RecordType,
    records: Vec<Record>,
    reject_writes: bool,
}

#[derive(Default)]
struct State {
    models: HashMap<(String, String), MemoryModel>,
    saves: usize,
}

/// A registry that lives entirely in memory.
#[derive(Default)]
pub struct MemoryRegistry {
    state: Mutex<State>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a record type with no records.
    pub fn with_model(self, record_type: RecordType) -> Self {
        self.lock().models.insert(
            record_type.model.key(),
            MemoryModel {
                record_type,
                records: Vec::new(),
                reject_writes: false,
            },
        );
        self
    }

    /// Add a record directly, bypassing `save` and its counter.
    ///
    /// # Panics
    /// When `model` was never registered.
    pub fn seed(&self, model: &ModelRef, record: Record) {
        let mut state = self.lock();
        let entry = state
            .models
            .get_mut(&model.key())
            .unwrap_or_else(|| panic!("model '{model}' is not registered"));
        entry.records.push(record);
    }

    /// Make every later `save` into `model` fail.
    pub fn reject_writes(&self, model: &ModelRef) {
        if let Some(entry) = self.lock().models.get_mut(&model.key()) {
            entry.reject_writes = true;
        }
    }

    /// Snapshot of the records of `model`, in insertion order.
    pub fn records(&self, model: &ModelRef) -> Vec<Record> {
        self.lock()
            .models
            .get(&model.key())
            .map(|m| m.records.clone())
            .unwrap_or_default()
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl EntityRegistry for MemoryRegistry {
    async fn resolve(&self, model: &ModelRef) -> Result<RecordType, RegistryError> {
        self.lock()
            .models
            .get(&model.key())
            .map(|m| m.record_type.clone())
            .ok_or_else(|| RegistryError::UnknownModel(model.clone()))
    }

    async fn all_records(&self, record_type: &RecordType) -> Result<Vec<Record>, RegistryError> {
        self.lock()
            .models
            .get(&record_type.model.key())
            .map(|m| m.records.clone())
            .ok_or_else(|| RegistryError::UnknownModel(record_type.model.clone()))
    }

    fn new_record(&self, _record_type: &RecordType) -> Record {
        Record::default()
    }

    async fn get(
        &self,
        record_type: &RecordType,
        key: &Value,
    ) -> Result<Option<Record>, RegistryError> {
        let state = self.lock();
        let model = state
            .models
            .get(&record_type.model.key())
            .ok_or_else(|| RegistryError::UnknownModel(record_type.model.clone()))?;

        Ok(model
            .records
            .iter()
            .find(|r| r.primary_key(record_type) == Some(key))
            .cloned())
    }

    async fn save(&self, record_type: &RecordType, mut record: Record) -> Result<(), RegistryError> {
        let mut state = self.lock();
        let model = state
            .models
            .get_mut(&record_type.model.key())
            .ok_or_else(|| RegistryError::UnknownModel(record_type.model.clone()))?;

        if model.reject_writes {
            return Err(RegistryError::Write {
                model: record_type.model.clone(),
                message: "writes rejected".into(),
            });
        }

        match record.primary_key(record_type).cloned() {
            Some(key) => {
                if model.records.iter().any(|r| r.primary_key(record_type) == Some(&key)) {
                    return Err(RegistryError::Write {
                        model: record_type.model.clone(),
                        message: format!("duplicate primary key {key}"),
                    });
                }
            }
            None => {
                // Auto-increment, like an integer primary-key column.
                let next = model
                    .records
                    .iter()
                    .filter_map(|r| r.primary_key(record_type).and_then(Value::as_i64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                record.set(record_type.primary_key.clone(), Value::from(next));
            }
        }

        model.records.push(record);
        state.saves += 1;
        Ok(())
    }
}
