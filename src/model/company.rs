//! Company entity: owner organization for cars.

use super::{Car, ColumnDef, ColumnKind, EntityDef, IncludeDef, IncludeKind};
use crate::schema::{Predicate, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

pub static DEF: EntityDef = EntityDef {
    name: "company",
    segment: "companies",
    columns: &[
        ColumnDef { name: "id", kind: ColumnKind::Uuid, nullable: false, server_assigned: true },
        ColumnDef { name: "name", kind: ColumnKind::Text, nullable: false, server_assigned: false },
        ColumnDef { name: "description", kind: ColumnKind::Text, nullable: true, server_assigned: false },
        ColumnDef { name: "created_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
        ColumnDef { name: "updated_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
    ],
    filterable: &["id", "name"],
    includes: &[
        IncludeDef { name: "cars", kind: IncludeKind::ToMany, related: "car", our_key: "id", their_key: "company_id", counted: true },
    ],
    references: &[],
    schema,
};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field("name", &[
            (Predicate::Required, "name is required"),
            (Predicate::NonEmptyString, "name must be a non-empty string"),
        ])
        .field("description", &[(Predicate::NullableString, "description must be a string")])
});

pub fn schema() -> &'static Schema {
    &SCHEMA
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cars: Option<Vec<Car>>,
    #[serde(default, rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<CompanyCount>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanyCount {
    pub cars: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CompanyListQuery {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub include: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CompanyListQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if !self.include.is_empty() {
            pairs.push(("include", self.include.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}
