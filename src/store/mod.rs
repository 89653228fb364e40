//! Data-store collaborator: typed CRUD over entity records, with an
//! in-memory and a PostgreSQL implementation behind one trait.

pub mod mem;
pub mod pg;
mod sql;

pub use mem::MemStore;
pub use pg::PgStore;

use crate::error::AppError;
use crate::model::{EntityDef, IncludeDef};
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::Constraint(what) => AppError::Constraint(what),
            StoreError::Db(e) => AppError::Db(e),
        }
    }
}

/// Query for list/detail reads: equality filters over enumerated columns,
/// resolved relation includes, pagination. Built by the handlers, never
/// directly from raw query strings.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub filters: Vec<(&'static str, Value)>,
    pub includes: Vec<&'static IncludeDef>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query {
    pub fn by_id(id: Uuid) -> Self {
        Query {
            filters: vec![("id", Value::String(id.to_string()))],
            ..Query::default()
        }
    }

    pub fn filter(mut self, column: &'static str, value: Value) -> Self {
        self.filters.push((column, value));
        self
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// The store contract the handlers program against. Records cross this
/// boundary as JSON objects keyed by column name; includes appear as nested
/// objects/arrays plus a `_count` object for counted to-many relations.
#[async_trait]
pub trait Store: Send + Sync {
    /// First row matching the query, includes applied.
    async fn find_first(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Option<Value>, StoreError>;

    /// All rows matching the query, in stable id order.
    async fn list(&self, entity: &'static EntityDef, query: &Query)
        -> Result<Vec<Value>, StoreError>;

    /// Insert one row; the store assigns id, created_at and updated_at.
    async fn create(&self, entity: &'static EntityDef, data: &Map<String, Value>)
        -> Result<Value, StoreError>;

    /// Overwrite columns present in `data`; refreshes updated_at. Missing id
    /// is `NotFound`.
    async fn update(&self, entity: &'static EntityDef, id: Uuid, data: &Map<String, Value>)
        -> Result<Value, StoreError>;

    /// Hard delete; returns the removed row. Missing id is `NotFound`.
    async fn delete(&self, entity: &'static EntityDef, id: Uuid)
        -> Result<Value, StoreError>;
}
