//! In-memory store: same contract as the PostgreSQL store, used by tests and
//! as the fallback backend when no database is configured.

use super::{Query, Store, StoreError};
use crate::model::{self, ColumnDef, ColumnKind, EntityDef, IncludeKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

type Table = Vec<Map<String, Value>>;

#[derive(Default)]
pub struct MemStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore::default()
    }
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

/// Canonicalize a stored value by column kind so equality filters match
/// regardless of the spelling the client used.
fn canon(col: &ColumnDef, value: &Value) -> Value {
    match (col.kind, value) {
        (ColumnKind::Uuid, Value::String(s)) => Uuid::parse_str(s)
            .map(|u| Value::String(u.to_string()))
            .unwrap_or_else(|_| value.clone()),
        (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Value::String(t.with_timezone(&Utc).to_rfc3339()))
            .unwrap_or_else(|_| value.clone()),
        _ => value.clone(),
    }
}

fn row_id(row: &Map<String, Value>) -> &str {
    row.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn matches(entity: &EntityDef, row: &Map<String, Value>, query: &Query) -> bool {
    query.filters.iter().all(|(name, value)| {
        let Some(col) = entity.column(name) else { return false };
        row.get(*name).map(|v| *v == canon(col, value)).unwrap_or(false)
    })
}

fn check_references(
    entity: &EntityDef,
    data: &Map<String, Value>,
    tables: &HashMap<&'static str, Table>,
) -> Result<(), StoreError> {
    for (col, target) in entity.references {
        let Some(value) = data.get(*col) else { continue };
        if value.is_null() {
            continue;
        }
        let id = value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| StoreError::Constraint(format!("{} is not a valid id", col)))?;
        let exists = tables
            .get(target)
            .map(|t| t.iter().any(|r| row_id(r) == id.to_string()))
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::Constraint(format!(
                "{} references missing {}",
                col, target
            )));
        }
    }
    Ok(())
}

/// Referencing rows block a delete, mirroring the FK NO ACTION behavior of
/// the PostgreSQL schema.
fn check_referenced_by(
    entity: &EntityDef,
    id: &str,
    tables: &HashMap<&'static str, Table>,
) -> Result<(), StoreError> {
    for other in model::ENTITIES {
        for (col, target) in other.references {
            if *target != entity.name {
                continue;
            }
            let referenced = tables
                .get(other.name)
                .map(|t| t.iter().any(|r| r.get(*col).and_then(Value::as_str) == Some(id)))
                .unwrap_or(false);
            if referenced {
                return Err(StoreError::Constraint(format!(
                    "{} {} is still referenced by {}",
                    entity.name, id, other.name
                )));
            }
        }
    }
    Ok(())
}

fn expand_includes(
    entity: &EntityDef,
    row: &Map<String, Value>,
    query: &Query,
    tables: &HashMap<&'static str, Table>,
) -> Map<String, Value> {
    let mut out = row.clone();
    let mut counts = Map::new();
    for inc in &query.includes {
        let related = tables.get(inc.related).map(Vec::as_slice).unwrap_or(&[]);
        let our = row.get(inc.our_key).cloned().unwrap_or(Value::Null);
        match inc.kind {
            IncludeKind::ToOne => {
                let found = if our.is_null() {
                    Value::Null
                } else {
                    related
                        .iter()
                        .find(|r| r.get(inc.their_key) == Some(&our))
                        .map(|r| Value::Object(r.clone()))
                        .unwrap_or(Value::Null)
                };
                out.insert(inc.name.to_string(), found);
            }
            IncludeKind::ToMany => {
                let rows: Vec<Value> = related
                    .iter()
                    .filter(|r| r.get(inc.their_key) == Some(&our))
                    .map(|r| Value::Object(r.clone()))
                    .collect();
                if inc.counted {
                    counts.insert(inc.name.to_string(), Value::Number((rows.len() as u64).into()));
                }
                out.insert(inc.name.to_string(), Value::Array(rows));
            }
        }
    }
    if !counts.is_empty() {
        out.insert("_count".to_string(), Value::Object(counts));
    }
    out
}

#[async_trait]
impl Store for MemStore {
    async fn find_first(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Option<Value>, StoreError>
    {
        // Same shape as the SQL backend: limit 1, pagination dropped.
        let mut first = query.clone();
        first.limit = Some(1);
        first.offset = None;
        Ok(self.list(entity, &first).await?.into_iter().next())
    }

    async fn list(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Vec<Value>, StoreError>
    {
        let tables = self.tables.read().expect("store lock");
        let mut rows: Vec<&Map<String, Value>> = tables
            .get(entity.name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .filter(|r| matches(entity, r, query))
            .collect();
        rows.sort_by_key(|r| row_id(r).to_string());
        Ok(rows
            .into_iter()
            .skip(query.effective_offset() as usize)
            .take(query.effective_limit() as usize)
            .map(|r| Value::Object(expand_includes(entity, r, query, &tables)))
            .collect())
    }

    async fn create(&self, entity: &'static EntityDef, data: &Map<String, Value>)
        -> Result<Value, StoreError>
    {
        let mut tables = self.tables.write().expect("store lock");
        check_references(entity, data, &tables)?;
        let mut row = Map::new();
        for col in entity.columns {
            if col.server_assigned {
                continue;
            }
            let value = data.get(col.name).map(|v| canon(col, v)).unwrap_or(Value::Null);
            row.insert(col.name.to_string(), value);
        }
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        let created = now();
        row.insert("created_at".to_string(), created.clone());
        row.insert("updated_at".to_string(), created);
        tables.entry(entity.name).or_default().push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(&self, entity: &'static EntityDef, id: Uuid, data: &Map<String, Value>)
        -> Result<Value, StoreError>
    {
        let mut tables = self.tables.write().expect("store lock");
        let id = id.to_string();
        // Existence first: a missing row is NotFound even when the payload
        // carries a dangling reference, matching the SQL backend.
        let index = tables
            .get(entity.name)
            .and_then(|t| t.iter().position(|r| row_id(r) == id))
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity.name, id)))?;
        check_references(entity, data, &tables)?;
        let table = tables.get_mut(entity.name).expect("table exists");
        let mut row = table[index].clone();
        for col in entity.columns {
            if col.server_assigned {
                continue;
            }
            if let Some(value) = data.get(col.name) {
                row.insert(col.name.to_string(), canon(col, value));
            }
        }
        row.insert("updated_at".to_string(), now());
        table[index] = row.clone();
        Ok(Value::Object(row))
    }

    async fn delete(&self, entity: &'static EntityDef, id: Uuid)
        -> Result<Value, StoreError>
    {
        let mut tables = self.tables.write().expect("store lock");
        let id = id.to_string();
        check_referenced_by(entity, &id, &tables)?;
        let table = tables.entry(entity.name).or_default();
        let index = table
            .iter()
            .position(|r| row_id(r) == id)
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity.name, id)))?;
        Ok(Value::Object(table.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn id_of(row: &Value) -> Uuid {
        row["id"].as_str().and_then(|s| Uuid::parse_str(s).ok()).unwrap()
    }

    #[tokio::test]
    async fn create_then_find_roundtrip() {
        let store = MemStore::new();
        let row = store
            .create(&model::car::DEF, &body(json!({"model": "Model 3", "location": "Berlin"})))
            .await
            .unwrap();
        assert!(row["created_at"].is_string());
        let found = store
            .find_first(&model::car::DEF, &Query::by_id(id_of(&row)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["model"], "Model 3");
        assert_eq!(found["company_id"], Value::Null);
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_and_missing_id_is_not_found() {
        let store = MemStore::new();
        let row = store
            .create(&model::car::DEF, &body(json!({"model": "i3", "location": "Hamburg"})))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let updated = store
            .update(&model::car::DEF, id_of(&row), &body(json!({"model": "i4"})))
            .await
            .unwrap();
        assert_eq!(updated["model"], "i4");
        assert_eq!(updated["location"], "Hamburg");
        assert!(updated["updated_at"].as_str() > row["updated_at"].as_str());

        let err = store
            .update(&model::car::DEF, Uuid::new_v4(), &body(json!({"model": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found_before_reference_checks() {
        let store = MemStore::new();
        let err = store
            .update(
                &model::car::DEF,
                Uuid::new_v4(),
                &body(json!({"company_id": Uuid::new_v4().to_string()})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn find_first_drops_pagination() {
        let store = MemStore::new();
        for name in ["Acme Rentals", "Borough Cars"] {
            store
                .create(&model::company::DEF, &body(json!({"name": name})))
                .await
                .unwrap();
        }
        let query = Query {
            offset: Some(5),
            ..Query::default()
        };
        let found = store.find_first(&model::company::DEF, &query).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn dangling_foreign_key_is_a_constraint_error() {
        let store = MemStore::new();
        let err = store
            .create(
                &model::car::DEF,
                &body(json!({
                    "model": "Model 3",
                    "location": "Berlin",
                    "company_id": Uuid::new_v4().to_string()
                })),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn delete_blocked_while_referenced() {
        let store = MemStore::new();
        let company = store
            .create(&model::company::DEF, &body(json!({"name": "Acme Rentals"})))
            .await
            .unwrap();
        store
            .create(
                &model::car::DEF,
                &body(json!({
                    "model": "Model 3",
                    "location": "Berlin",
                    "company_id": company["id"]
                })),
            )
            .await
            .unwrap();
        let err = store.delete(&model::company::DEF, id_of(&company)).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn includes_expand_relations_and_counts() {
        let store = MemStore::new();
        let company = store
            .create(&model::company::DEF, &body(json!({"name": "Acme Rentals"})))
            .await
            .unwrap();
        let car = store
            .create(
                &model::car::DEF,
                &body(json!({
                    "model": "Model 3",
                    "location": "Berlin",
                    "company_id": company["id"]
                })),
            )
            .await
            .unwrap();
        store
            .create(
                &model::booking::DEF,
                &body(json!({
                    "start_time": "2030-01-01T10:00:00Z",
                    "end_time": "2030-01-02T10:00:00Z",
                    "car_id": car["id"]
                })),
            )
            .await
            .unwrap();

        let query = Query {
            includes: vec![
                model::car::DEF.include("company").unwrap(),
                model::car::DEF.include("bookings").unwrap(),
            ],
            ..Query::by_id(id_of(&car))
        };
        let found = store.find_first(&model::car::DEF, &query).await.unwrap().unwrap();
        assert_eq!(found["company"]["name"], "Acme Rentals");
        assert_eq!(found["bookings"].as_array().unwrap().len(), 1);
        assert_eq!(found["_count"]["bookings"], 1);
    }
}
