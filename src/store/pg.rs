//! PostgreSQL store: executes the SQL builder's queries over a sqlx pool and
//! decodes rows back into JSON records by declared column kind.

use super::sql::{self, Bind, QueryBuf};
use super::{Query, Store, StoreError};
use crate::model::{self, ColumnKind, EntityDef};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    async fn fetch_optional(&self, entity: &'static EntityDef, query: &Query, q: &QueryBuf)
        -> Result<Option<Value>, StoreError>
    {
        tracing::debug!(sql = %q.sql, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(|r| row_to_record(entity, query, &r)))
    }
}

fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    binds: &'q [Bind],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for b in binds {
        query = match b {
            Bind::Null => query.bind(Option::<String>::None),
            Bind::Text(s) => query.bind(s.as_str()),
            Bind::Uuid(u) => query.bind(*u),
            Bind::Timestamp(t) => query.bind(*t),
        };
    }
    query
}

/// FK and unique violations surface as `Constraint`; everything else stays a
/// database error.
fn map_db_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if let Some(code) = db.code() {
            if code == "23503" || code == "23505" {
                return StoreError::Constraint(db.message().to_string());
            }
        }
    }
    StoreError::Db(e)
}

fn row_to_record(entity: &'static EntityDef, query: &Query, row: &PgRow) -> Value {
    let mut map = Map::new();
    for col in entity.columns {
        let value = match col.kind {
            ColumnKind::Uuid => row
                .try_get::<Option<Uuid>, _>(col.name)
                .ok()
                .flatten()
                .map(|u| Value::String(u.to_string())),
            ColumnKind::Timestamp => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(col.name)
                .ok()
                .flatten()
                .map(|t| Value::String(t.to_rfc3339())),
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(col.name)
                .ok()
                .flatten()
                .map(Value::String),
        };
        map.insert(col.name.to_string(), value.unwrap_or(Value::Null));
    }

    let mut counts = Map::new();
    for inc in &query.includes {
        if let Ok(v) = row.try_get::<Option<Value>, _>(inc.name) {
            map.insert(inc.name.to_string(), v.unwrap_or(Value::Null));
        }
        if inc.counted {
            let key = format!("_count_{}", inc.name);
            if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(key.as_str()) {
                counts.insert(inc.name.to_string(), Value::Number(n.into()));
            }
        }
    }
    if !counts.is_empty() {
        map.insert("_count".to_string(), Value::Object(counts));
    }
    Value::Object(map)
}

#[async_trait]
impl Store for PgStore {
    async fn find_first(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Option<Value>, StoreError>
    {
        let mut first = query.clone();
        first.limit = Some(1);
        first.offset = None;
        let q = sql::select(entity, &first);
        self.fetch_optional(entity, &first, &q).await
    }

    async fn list(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Vec<Value>, StoreError>
    {
        let q = sql::select(entity, query);
        tracing::debug!(sql = %q.sql, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.binds)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(rows.iter().map(|r| row_to_record(entity, query, r)).collect())
    }

    async fn create(&self, entity: &'static EntityDef, data: &Map<String, Value>)
        -> Result<Value, StoreError>
    {
        let q = sql::insert(entity, data);
        let plain = Query::default();
        self.fetch_optional(entity, &plain, &q)
            .await?
            .ok_or(StoreError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, entity: &'static EntityDef, id: Uuid, data: &Map<String, Value>)
        -> Result<Value, StoreError>
    {
        let q = sql::update(entity, id, data);
        let plain = Query::default();
        self.fetch_optional(entity, &plain, &q)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity.name, id)))
    }

    async fn delete(&self, entity: &'static EntityDef, id: Uuid)
        -> Result<Value, StoreError>
    {
        let q = sql::delete(entity, id);
        let plain = Query::default();
        self.fetch_optional(entity, &plain, &q)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", entity.name, id)))
    }
}

/// Create the entity tables if they do not exist, FKs included. DDL is
/// generated from the registry, in dependency order.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), StoreError> {
    for name in ["company", "user", "car", "booking"] {
        let entity = model::entity_by_name(name).expect("registry entity");
        let ddl = create_table_sql(entity);
        tracing::debug!(sql = %ddl, "ddl");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

fn create_table_sql(entity: &EntityDef) -> String {
    let mut defs: Vec<String> = Vec::new();
    for c in entity.columns {
        let ty = match c.kind {
            ColumnKind::Uuid => "UUID",
            ColumnKind::Text => "TEXT",
            ColumnKind::Timestamp => "TIMESTAMPTZ",
        };
        let mut def = format!("\"{}\" {}", c.name, ty);
        if !c.nullable {
            def.push_str(" NOT NULL");
        }
        match c.name {
            "id" => def.push_str(" DEFAULT gen_random_uuid()"),
            "created_at" | "updated_at" => def.push_str(" DEFAULT NOW()"),
            _ => {}
        }
        defs.push(def);
    }
    defs.push("PRIMARY KEY (\"id\")".to_string());
    for (col, target) in entity.references {
        defs.push(format!(
            "FOREIGN KEY (\"{}\") REFERENCES \"{}\" (\"id\")",
            col, target
        ));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n  {}\n)",
        entity.name,
        defs.join(",\n  ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_ddl_has_fks_and_defaults() {
        let ddl = create_table_sql(&model::booking::DEF);
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"booking\""));
        assert!(ddl.contains("\"id\" UUID NOT NULL DEFAULT gen_random_uuid()"));
        assert!(ddl.contains("FOREIGN KEY (\"user_id\") REFERENCES \"user\" (\"id\")"));
        assert!(ddl.contains("FOREIGN KEY (\"car_id\") REFERENCES \"car\" (\"id\")"));
        assert!(ddl.contains("\"updated_at\" TIMESTAMPTZ NOT NULL DEFAULT NOW()"));
    }
}
