//! Generic entity CRUD handlers. Every request runs the same sequence:
//! authenticate, authorize against the record or collection, validate on the
//! write paths, then execute against the store.

use crate::auth::{Operation, RecordScope, Session};
use crate::error::AppError;
use crate::model::{self, ColumnKind, EntityDef};
use crate::state::AppState;
use crate::store::Query as StoreQuery;
use axum::{
    extract::{Path, Query, State},
    http::Method,
    Json,
};
use chrono::DateTime;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

fn resolve_entity(segment: &str) -> Result<&'static EntityDef, AppError> {
    model::entity_by_segment(segment)
        .ok_or_else(|| AppError::NotFound(model::route_to_entity(segment).to_string()))
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::BadRequest(format!("invalid id: {}", id)))
}

async fn authorize(
    state: &AppState,
    session: &Session,
    entity: &EntityDef,
    scope: RecordScope,
    operation: Operation,
) -> Result<(), AppError> {
    let allowed = state
        .access
        .has_access(session, entity.name, &scope, operation)
        .await?;
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Coerce a raw query-string value by the column's kind; anything that does
/// not parse is rejected rather than passed through to the store.
fn coerce_filter(entity: &EntityDef, name: &'static str, raw: &str) -> Result<Value, AppError> {
    let col = entity
        .column(name)
        .ok_or_else(|| AppError::BadRequest(format!("unknown filter: {}", name)))?;
    match col.kind {
        ColumnKind::Uuid => Uuid::parse_str(raw)
            .map(|u| Value::String(u.to_string()))
            .map_err(|_| AppError::BadRequest(format!("{} must be a valid id", name))),
        ColumnKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|_| Value::String(raw.to_string()))
            .map_err(|_| AppError::BadRequest(format!("{} must be a valid date", name))),
        ColumnKind::Text => Ok(Value::String(raw.to_string())),
    }
}

/// Build the typed store query from raw query parameters. Filter keys are
/// matched against the entity's enumerated filterable columns; unknown keys
/// are an error, not a silent no-op.
fn build_query(entity: &'static EntityDef, params: &HashMap<String, String>)
    -> Result<StoreQuery, AppError>
{
    let mut query = StoreQuery::default();
    for (key, value) in params {
        match key.as_str() {
            "limit" => {
                let limit = value
                    .parse()
                    .map_err(|_| AppError::BadRequest("limit must be an integer".into()))?;
                query.limit = Some(limit);
            }
            "offset" => {
                let offset = value
                    .parse()
                    .map_err(|_| AppError::BadRequest("offset must be an integer".into()))?;
                query.offset = Some(offset);
            }
            "include" => {
                for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let include = entity
                        .include(name)
                        .ok_or_else(|| AppError::BadRequest(format!("unknown include: {}", name)))?;
                    query.includes.push(include);
                }
            }
            other => {
                if !entity.is_filterable(other) {
                    return Err(AppError::BadRequest(format!("unknown filter: {}", other)));
                }
                // is_filterable guarantees the column exists.
                let col = entity.column(other).expect("filterable column");
                query.filters.push((col.name, coerce_filter(entity, col.name, value)?));
            }
        }
    }
    Ok(query)
}

/// Request body must be a JSON object; server-assigned columns are stripped
/// so clients can never supply id or timestamps. Create and update both run
/// the full schema.
fn write_payload(entity: &'static EntityDef, body: Value) -> Result<Map<String, Value>, AppError> {
    let mut map = match body {
        Value::Object(m) => m,
        _ => return Err(AppError::BadRequest("body must be a JSON object".into())),
    };
    for col in entity.columns {
        if col.server_assigned {
            map.remove(col.name);
        }
    }
    (entity.schema)()
        .validate(&map)
        .map_err(AppError::Validation)?;
    Ok(map)
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Path(segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve_entity(&segment)?;
    authorize(&state, &session, entity, RecordScope::Collection, Operation::Read).await?;
    let query = build_query(entity, &params)?;
    let rows = state.store.list(entity, &query).await?;
    Ok(Json(Value::Array(rows)))
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve_entity(&segment)?;
    authorize(&state, &session, entity, RecordScope::Collection, Operation::Create).await?;
    let payload = write_payload(entity, body)?;
    let row = state.store.create(entity, &payload).await?;
    Ok(Json(row))
}

pub async fn read(
    State(state): State<AppState>,
    session: Session,
    Path((segment, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve_entity(&segment)?;
    let id = parse_id(&id)?;
    authorize(&state, &session, entity, RecordScope::Record(id), Operation::Read).await?;
    let mut query = build_query(entity, &params)?;
    query.filters.push(("id", Value::String(id.to_string())));
    let row = state
        .store
        .find_first(entity, &query)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", entity.name, id)))?;
    Ok(Json(row))
}

pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path((segment, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve_entity(&segment)?;
    let id = parse_id(&id)?;
    authorize(&state, &session, entity, RecordScope::Record(id), Operation::Update).await?;
    let payload = write_payload(entity, body)?;
    let row = state.store.update(entity, id, &payload).await?;
    Ok(Json(row))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path((segment, id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let entity = resolve_entity(&segment)?;
    let id = parse_id(&id)?;
    authorize(&state, &session, entity, RecordScope::Record(id), Operation::Delete).await?;
    let row = state.store.delete(entity, id).await?;
    Ok(Json(row))
}

/// Fallback for verbs outside the CRUD mapping. The caller still has to
/// authenticate first; no operation maps to the verb, so no access check or
/// store work happens.
pub async fn method_not_allowed(_session: Session, method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}
