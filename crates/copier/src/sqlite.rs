//! `SqliteRegistry` — an `EntityRegistry` over the live SQLite schema.
//!
//! A model `namespace.Type` lives in the table `namespace_type`. Record types
//! are read from the schema itself (`PRAGMA table_info` and
//! `PRAGMA foreign_key_list`), so the registry needs no compiled-in model list,
//! only the namespaces that may own tables.
//!
//! All reads and writes share one transaction. Nothing is durable until
//! [`SqliteRegistry::commit`]; dropping the registry rolls everything back.

use async_trait::async_trait;
use db::repository::dynamic;
use db::{DbError, DbPool};
use serde_json::Value;
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;
use tracing::debug;

use crate::registry::{EntityRegistry, FieldDescriptor, ModelRef, Record, RecordType};
use crate::RegistryError;

pub struct SqliteRegistry {
    tx: Mutex<Option<Transaction<'static, Sqlite>>>,
    namespaces: Vec<String>,
}

impl SqliteRegistry {
    /// Open a transaction on `pool`. `namespaces` lists every namespace whose
    /// tables may be resolved or referenced.
    pub async fn begin(pool: &DbPool, namespaces: &[&str]) -> Result<Self, RegistryError> {
        let tx = pool.begin().await.map_err(DbError::from)?;
        Ok(Self {
            tx: Mutex::new(Some(tx)),
            namespaces: namespaces.iter().map(|ns| (*ns).to_owned()).collect(),
        })
    }

    /// Make every write durable.
    pub async fn commit(self) -> Result<(), RegistryError> {
        let tx = self.tx.into_inner().ok_or(RegistryError::Closed)?;
        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    /// Table backing `model`.
    pub fn table_name(model: &ModelRef) -> String {
        format!("{}_{}", model.namespace, model.type_name.to_lowercase())
    }

    /// Number of stored records of `model`.
    pub async fn count(&self, model: &ModelRef) -> Result<i64, RegistryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RegistryError::Closed)?;
        Ok(dynamic::count_rows(&mut **tx, &Self::table_name(model)).await?)
    }

    /// The model stored in `table`, picking the longest matching namespace.
    fn model_for_table(&self, table: &str) -> Option<ModelRef> {
        self.namespaces
            .iter()
            .filter_map(|ns| {
                table
                    .strip_prefix(ns.as_str())
                    .and_then(|rest| rest.strip_prefix('_'))
                    .filter(|name| !name.is_empty())
                    .map(|name| (ns, name))
            })
            .max_by_key(|(ns, _)| ns.len())
            .map(|(ns, name)| ModelRef::new(ns.clone(), name))
    }
}

#[async_trait]
impl EntityRegistry for SqliteRegistry {
    async fn resolve(&self, model: &ModelRef) -> Result<RecordType, RegistryError> {
        if !self.namespaces.contains(&model.namespace) {
            return Err(RegistryError::UnknownModel(model.clone()));
        }

        let table = Self::table_name(model);
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RegistryError::Closed)?;

        let columns = dynamic::table_columns(&mut **tx, &table).await?;
        if columns.is_empty() {
            return Err(RegistryError::UnknownModel(model.clone()));
        }
        let foreign_keys = dynamic::foreign_keys(&mut **tx, &table).await?;

        let primary_key = columns
            .iter()
            .find(|c| c.primary_key)
            .map(|c| c.name.clone())
            .ok_or_else(|| RegistryError::NoPrimaryKey(model.clone()))?;

        let mut fields = Vec::with_capacity(columns.len());
        for column in &columns {
            let field = match foreign_keys.iter().find(|fk| fk.column == column.name) {
                Some(fk) => {
                    let target = self
                        .model_for_table(&fk.table)
                        .ok_or_else(|| RegistryError::UnknownTable {
                            model: model.clone(),
                            table: fk.table.clone(),
                        })?;
                    FieldDescriptor::reference(column.name.clone(), target)
                }
                None => FieldDescriptor::scalar(column.name.clone()),
            };
            fields.push(field);
        }

        debug!("resolved {} from table {} ({} fields)", model, table, fields.len());

        Ok(RecordType {
            model: model.clone(),
            primary_key,
            fields,
        })
    }

    async fn all_records(&self, record_type: &RecordType) -> Result<Vec<Record>, RegistryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RegistryError::Closed)?;

        let rows = dynamic::fetch_rows(
            &mut **tx,
            &Self::table_name(&record_type.model),
            &record_type.primary_key,
        )
        .await?;

        Ok(rows.into_iter().map(Record::from).collect())
    }

    fn new_record(&self, _record_type: &RecordType) -> Record {
        Record::default()
    }

    async fn get(
        &self,
        record_type: &RecordType,
        key: &Value,
    ) -> Result<Option<Record>, RegistryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RegistryError::Closed)?;

        let row = dynamic::fetch_row(
            &mut **tx,
            &Self::table_name(&record_type.model),
            &record_type.primary_key,
            key,
        )
        .await?;

        Ok(row.map(Record::from))
    }

    async fn save(&self, record_type: &RecordType, record: Record) -> Result<(), RegistryError> {
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or(RegistryError::Closed)?;

        dynamic::insert_row(&mut **tx, &Self::table_name(&record_type.model), &record.values)
            .await
            .map_err(|err| match err {
                DbError::Sqlx(e) => RegistryError::Write {
                    model: record_type.model.clone(),
                    message: e.to_string(),
                },
                other => RegistryError::Storage(other),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{copy_model_data, CopyError, CopyOptions};
    use db::pool::create_memory_pool;
    use db::repository::{profiles, users};
    use serde_json::json;

    const NAMESPACES: &[&str] = &["auth", "oc_lettings_site", "lettings", "profiles"];

    #[tokio::test]
    async fn resolves_fields_and_references_from_the_schema() {
        let pool = create_memory_pool().await.expect("pool");
        let registry = SqliteRegistry::begin(&pool, NAMESPACES).await.expect("registry");

        let profile = registry
            .resolve(&ModelRef::new("oc_lettings_site", "Profile"))
            .await
            .expect("resolve");

        assert_eq!(profile.primary_key, "id");
        assert_eq!(
            profile.describe_fields(),
            &[
                FieldDescriptor::scalar("id"),
                FieldDescriptor::scalar("favorite_city"),
                FieldDescriptor::reference("user_id", ModelRef::new("auth", "user")),
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tables_and_namespaces_are_unknown_models() {
        let pool = create_memory_pool().await.expect("pool");
        let registry = SqliteRegistry::begin(&pool, NAMESPACES).await.expect("registry");

        assert!(matches!(
            registry.resolve(&ModelRef::new("lettings", "Castle")).await,
            Err(RegistryError::UnknownModel(_))
        ));
        assert!(matches!(
            registry.resolve(&ModelRef::new("billing", "Invoice")).await,
            Err(RegistryError::UnknownModel(_))
        ));
    }

    #[tokio::test]
    async fn reference_outside_the_namespaces_is_a_lookup_failure() {
        let pool = create_memory_pool().await.expect("pool");
        let registry = SqliteRegistry::begin(&pool, &["oc_lettings_site", "profiles"])
            .await
            .expect("registry");
        let legacy = ModelRef::new("oc_lettings_site", "Profile");

        assert!(matches!(
            registry.resolve(&legacy).await,
            Err(RegistryError::UnknownTable { ref table, .. }) if table == "auth_user"
        ));

        let destination = ModelRef::new("profiles", "Profile");
        let result = copy_model_data(&registry, &legacy, &destination, CopyOptions::default()).await;
        assert!(matches!(result, Err(CopyError::Lookup(m)) if m == legacy));
    }

    #[test]
    fn longest_namespace_prefix_wins() {
        let registry = SqliteRegistry {
            tx: Mutex::new(None),
            namespaces: vec!["oc".into(), "oc_lettings_site".into()],
        };
        assert_eq!(
            registry.model_for_table("oc_lettings_site_address"),
            Some(ModelRef::new("oc_lettings_site", "address"))
        );
        assert_eq!(registry.model_for_table("billing_invoice"), None);
    }

    #[tokio::test]
    async fn writes_are_dropped_without_commit() {
        let pool = create_memory_pool().await.expect("pool");
        let user = users::create_user(&pool, "alice", "Alice", "A", "a@example.com")
            .await
            .expect("user");

        {
            let registry = SqliteRegistry::begin(&pool, NAMESPACES).await.expect("registry");
            let profile = registry
                .resolve(&ModelRef::new("profiles", "Profile"))
                .await
                .expect("resolve");
            let record: Record = [("user_id", json!(user.id)), ("favorite_city", json!("Oslo"))]
                .into_iter()
                .collect();
            registry.save(&profile, record).await.expect("save");
            assert_eq!(registry.count(&profile.model).await.expect("count"), 1);
        }

        assert!(profiles::list_profiles(&pool).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let pool = create_memory_pool().await.expect("pool");
        let user = users::create_user(&pool, "bob", "Bob", "B", "b@example.com")
            .await
            .expect("user");

        let registry = SqliteRegistry::begin(&pool, NAMESPACES).await.expect("registry");
        let profile = registry
            .resolve(&ModelRef::new("profiles", "profile"))
            .await
            .expect("resolve");
        let record: Record = [("user_id", json!(user.id)), ("favorite_city", json!("Rome"))]
            .into_iter()
            .collect();
        registry.save(&profile, record).await.expect("save");

        let stored = registry
            .get(&profile, &json!(1))
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.get("favorite_city"), Some(&json!("Rome")));

        registry.commit().await.expect("commit");

        let detail = profiles::get_profile_by_username(&pool, "bob").await.expect("detail");
        assert_eq!(detail.profile.favorite_city, "Rome");
    }

    #[tokio::test]
    async fn constraint_violations_are_write_errors() {
        let pool = create_memory_pool().await.expect("pool");
        let registry = SqliteRegistry::begin(&pool, NAMESPACES).await.expect("registry");
        let profile = registry
            .resolve(&ModelRef::new("profiles", "Profile"))
            .await
            .expect("resolve");

        let orphan: Record = [("user_id", json!(404)), ("favorite_city", json!("Lima"))]
            .into_iter()
            .collect();
        assert!(matches!(
            registry.save(&profile, orphan).await,
            Err(RegistryError::Write { .. })
        ));
    }
}
