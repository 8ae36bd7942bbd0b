//! Copy every record of one model into another model.
//!
//! Used when a model moves from one namespace to another: each source record
//! becomes a new destination record. Scalar fields are copied by name,
//! reference fields are re-resolved against the registry, and fields the
//! destination does not declare are left behind.
//!
//! The primary key is an ordinary declared field, so it is carried over
//! whenever the destination declares it. Later moves rely on that to find
//! referenced records by the same key.
//!
//! Policy on a dangling reference: the copy aborts on the first one. Records
//! saved before the failure stay saved unless the registry is transactional.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::registry::{EntityRegistry, FieldDescriptor, FieldKind, ModelRef, Record, RecordType};
use crate::CopyError;

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

/// Caller-supplied execution guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    /// The caller runs inside a test suite.
    pub test_run: bool,
    /// Copy even inside a test suite.
    pub force_run: bool,
}

impl CopyOptions {
    /// Options for a test suite that wants the copy to happen.
    pub fn forced_test_run() -> Self {
        Self { test_run: true, force_run: true }
    }

    pub fn should_run(&self) -> bool {
        !self.test_run || self.force_run
    }
}

/// What a copy did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyReport {
    /// Number of destination records created.
    pub copied: usize,
    /// Source fields the destination does not declare.
    pub skipped_fields: Vec<String>,
    /// The guard turned the call into a no-op.
    pub skipped_run: bool,
}

// ---------------------------------------------------------------------------
// copy_model_data
// ---------------------------------------------------------------------------

/// Copy every `source` record into `destination`.
///
/// # Errors
/// - [`CopyError::Lookup`] when the source, the destination or a model
///   referenced by a source field is unknown. Nothing is written.
/// - [`CopyError::DanglingReference`] when a reference names a missing record.
/// - [`CopyError::Write`] when the registry refuses a new record.
/// - [`CopyError::Registry`] for any other registry failure.
#[instrument(skip_all, fields(source = %source, destination = %destination))]
pub async fn copy_model_data<R>(
    registry: &R,
    source: &ModelRef,
    destination: &ModelRef,
    options: CopyOptions,
) -> Result<CopyReport, CopyError>
where
    R: EntityRegistry + ?Sized,
{
    if !options.should_run() {
        info!("test run without force; copy skipped");
        return Ok(CopyReport { skipped_run: true, ..CopyReport::default() });
    }

    let source_type = resolve(registry, source).await?;
    let destination_type = resolve(registry, destination).await?;

    // Referenced models are resolved before the first write so an unknown
    // one aborts with nothing saved.
    let mut targets: HashMap<&str, RecordType> = HashMap::new();
    for field in source_type.describe_fields() {
        if let FieldKind::Reference(target) = &field.kind {
            targets.insert(field.name.as_str(), resolve(registry, target).await?);
        }
    }

    let skipped_fields: Vec<String> = source_type
        .describe_fields()
        .iter()
        .filter(|f| destination_type.field(&f.name).is_none())
        .map(|f| f.name.clone())
        .collect();
    if !skipped_fields.is_empty() {
        debug!(?skipped_fields, "fields absent on the destination are not copied");
    }

    let records = registry
        .all_records(&source_type)
        .await
        .map_err(CopyError::Registry)?;
    info!("copying {} records", records.len());

    let mut copied = 0usize;
    for old in &records {
        let mut new = registry.new_record(&destination_type);

        for field in source_type.describe_fields() {
            let value = old.get(&field.name).cloned().unwrap_or(Value::Null);

            let value = match targets.get(field.name.as_str()) {
                Some(target_type) => {
                    resolve_reference(registry, &source_type, old, field, target_type, value)
                        .await?
                }
                None => value,
            };

            if destination_type.field(&field.name).is_some() {
                new.set(field.name.clone(), value);
            }
        }

        registry
            .save(&destination_type, new)
            .await
            .map_err(CopyError::Write)?;
        copied += 1;
        debug!(
            "copied record {}",
            old.primary_key(&source_type).unwrap_or(&serde_json::Value::Null)
        );
    }

    info!("copied {} records", copied);

    Ok(CopyReport {
        copied,
        skipped_fields,
        skipped_run: false,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

async fn resolve<R>(registry: &R, model: &ModelRef) -> Result<RecordType, CopyError>
where
    R: EntityRegistry + ?Sized,
{
    registry.resolve(model).await.map_err(CopyError::from_lookup)
}

/// Map a reference value to the key of the matching record in the registry.
/// `null` stays `null`.
async fn resolve_reference<R>(
    registry: &R,
    source_type: &RecordType,
    record: &Record,
    field: &FieldDescriptor,
    target_type: &RecordType,
    key: Value,
) -> Result<Value, CopyError>
where
    R: EntityRegistry + ?Sized,
{
    if key.is_null() {
        return Ok(Value::Null);
    }

    let related = registry
        .get(target_type, &key)
        .await
        .map_err(CopyError::Registry)?;

    match related {
        Some(related) => Ok(related.primary_key(target_type).cloned().unwrap_or(key)),
        None => Err(CopyError::DanglingReference {
            model: source_type.model.clone(),
            record: record.primary_key(source_type).cloned().unwrap_or(Value::Null),
            field: field.name.clone(),
            target: target_type.model.clone(),
            key,
        }),
    }
}
