//! Safe SQL builder: identifiers come only from the static registry, values
//! are always bound parameters.

use crate::model::{ColumnDef, ColumnKind, EntityDef, IncludeKind};
use crate::store::Query;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

const MAIN_ALIAS: &str = "m";

/// A typed bind parameter. String values for uuid/timestamp columns are
/// carried as text and converted by the SQL cast on the placeholder.
#[derive(Clone, Debug)]
pub enum Bind {
    Null,
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

pub struct QueryBuf {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            binds: Vec::new(),
        }
    }

    fn push_bind(&mut self, b: Bind) -> usize {
        self.binds.push(b);
        self.binds.len()
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn cast_suffix(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Uuid => "::uuid",
        ColumnKind::Timestamp => "::timestamptz",
        ColumnKind::Text => "",
    }
}

fn bind_for(col: &ColumnDef, value: &Value) -> Bind {
    match value {
        Value::Null => Bind::Null,
        Value::String(s) => match col.kind {
            ColumnKind::Uuid => Uuid::parse_str(s)
                .map(Bind::Uuid)
                .unwrap_or_else(|_| Bind::Text(s.clone())),
            ColumnKind::Timestamp => DateTime::parse_from_rfc3339(s)
                .map(|t| Bind::Timestamp(t.with_timezone(&Utc)))
                .unwrap_or_else(|_| Bind::Text(s.clone())),
            ColumnKind::Text => Bind::Text(s.clone()),
        },
        other => Bind::Text(other.to_string()),
    }
}

fn column_list(entity: &EntityDef, alias: Option<&str>) -> String {
    entity
        .columns
        .iter()
        .map(|c| match alias {
            Some(a) => format!("{}.{}", a, quoted(c.name)),
            None => quoted(c.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT with filters, include subqueries (`row_to_json` for to-one,
/// `json_agg` for to-many, `COUNT(*)` for counted relations), stable id
/// order and pagination.
pub fn select(entity: &'static EntityDef, query: &Query) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(entity.name);

    let mut select_parts: Vec<String> = entity
        .columns
        .iter()
        .map(|c| format!("{}.{} AS {}", MAIN_ALIAS, quoted(c.name), quoted(c.name)))
        .collect();

    for inc in &query.includes {
        let related = crate::model::entity_by_name(inc.related)
            .expect("registry include points at known entity");
        let rel_table = quoted(related.name);
        let rel_cols = column_list(related, None);
        let join = format!(
            "{} WHERE {} = {}.{}",
            rel_table,
            quoted(inc.their_key),
            MAIN_ALIAS,
            quoted(inc.our_key)
        );
        let subquery = match inc.kind {
            IncludeKind::ToOne => format!(
                "(SELECT row_to_json(sub) FROM (SELECT {} FROM {}) sub)",
                rel_cols, join
            ),
            IncludeKind::ToMany => format!(
                "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM (SELECT {} FROM {}) sub)",
                rel_cols, join
            ),
        };
        select_parts.push(format!("{} AS {}", subquery, quoted(inc.name)));
        if inc.counted {
            select_parts.push(format!(
                "(SELECT COUNT(*) FROM {}) AS {}",
                join,
                quoted(&format!("_count_{}", inc.name))
            ));
        }
    }

    let mut where_parts = Vec::new();
    for (name, value) in &query.filters {
        let Some(col) = entity.column(name) else { continue };
        let n = q.push_bind(bind_for(col, value));
        where_parts.push(format!(
            "{}.{} = ${}{}",
            MAIN_ALIAS,
            quoted(col.name),
            n,
            cast_suffix(col.kind)
        ));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    q.sql = format!(
        "SELECT {} FROM {} {}{} ORDER BY {}.{} LIMIT {} OFFSET {}",
        select_parts.join(", "),
        table,
        MAIN_ALIAS,
        where_clause,
        MAIN_ALIAS,
        quoted("id"),
        query.effective_limit(),
        query.effective_offset()
    );
    q
}

/// INSERT from the write payload; server-assigned columns are left to their
/// database defaults. Returns the full row.
pub fn insert(entity: &'static EntityDef, data: &serde_json::Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in entity.columns {
        if c.server_assigned {
            continue;
        }
        let value = data.get(c.name).cloned().unwrap_or(Value::Null);
        let n = q.push_bind(bind_for(c, &value));
        cols.push(quoted(c.name));
        placeholders.push(format!("${}{}", n, cast_suffix(c.kind)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(entity.name),
        cols.join(", "),
        placeholders.join(", "),
        column_list(entity, None)
    );
    q
}

/// UPDATE by id: SET only columns present in the payload, always refreshing
/// updated_at. Returns the full row.
pub fn update(entity: &'static EntityDef, id: Uuid, data: &serde_json::Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in entity.columns {
        if c.server_assigned {
            continue;
        }
        let Some(value) = data.get(c.name) else { continue };
        let n = q.push_bind(bind_for(c, value));
        sets.push(format!("{} = ${}{}", quoted(c.name), n, cast_suffix(c.kind)));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_bind(Bind::Uuid(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        quoted(entity.name),
        sets.join(", "),
        quoted("id"),
        id_param,
        column_list(entity, None)
    );
    q
}

/// DELETE by id, returning the removed row.
pub fn delete(entity: &'static EntityDef, id: Uuid) -> QueryBuf {
    let mut q = QueryBuf::new();
    let id_param = q.push_bind(Bind::Uuid(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${} RETURNING {}",
        quoted(entity.name),
        quoted("id"),
        id_param,
        column_list(entity, None)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model;
    use serde_json::json;

    #[test]
    fn select_filters_only_known_columns() {
        let query = Query::default()
            .filter("location", json!("Berlin"))
            .filter("bogus", json!("x"));
        let q = select(&model::car::DEF, &query);
        assert!(q.sql.contains("WHERE m.\"location\" = $1"));
        assert!(!q.sql.contains("bogus"));
        assert_eq!(q.binds.len(), 1);
        assert!(q.sql.ends_with("LIMIT 100 OFFSET 0"));
    }

    #[test]
    fn select_with_includes_builds_subqueries() {
        let query = Query {
            includes: vec![
                model::car::DEF.include("company").unwrap(),
                model::car::DEF.include("bookings").unwrap(),
            ],
            ..Query::default()
        };
        let q = select(&model::car::DEF, &query);
        assert!(q.sql.contains("row_to_json"));
        assert!(q.sql.contains("json_agg"));
        assert!(q.sql.contains("AS \"_count_bookings\""));
        assert!(q.sql.contains("\"car_id\" = m.\"id\""));
    }

    #[test]
    fn insert_skips_server_assigned_columns() {
        let data = json!({"model": "Model 3", "location": "Berlin"});
        let q = insert(&model::car::DEF, data.as_object().unwrap());
        assert!(q.sql.starts_with("INSERT INTO \"car\""));
        assert!(!q.sql.contains("(\"id\""));
        assert!(q.sql.contains("$3::uuid"));
        assert!(q.sql.contains("RETURNING"));
        // model, location, company_id (null)
        assert_eq!(q.binds.len(), 3);
        assert!(matches!(q.binds[2], Bind::Null));
    }

    #[test]
    fn update_sets_present_columns_and_touches_updated_at() {
        let id = Uuid::new_v4();
        let data = json!({"model": "Model Y"});
        let q = update(&model::car::DEF, id, data.as_object().unwrap());
        assert!(q.sql.contains("SET \"model\" = $1, \"updated_at\" = NOW()"));
        assert!(q.sql.contains("WHERE \"id\" = $2"));
        assert_eq!(q.binds.len(), 2);
    }

    #[test]
    fn delete_returns_row() {
        let q = delete(&model::car::DEF, Uuid::new_v4());
        assert!(q.sql.starts_with("DELETE FROM \"car\" WHERE \"id\" = $1 RETURNING"));
    }
}
