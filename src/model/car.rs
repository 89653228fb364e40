//! Car entity: a vehicle at a location, optionally owned by a company.

use super::{Booking, ColumnDef, ColumnKind, Company, EntityDef, IncludeDef, IncludeKind};
use crate::schema::{Predicate, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

pub static DEF: EntityDef = EntityDef {
    name: "car",
    segment: "cars",
    columns: &[
        ColumnDef { name: "id", kind: ColumnKind::Uuid, nullable: false, server_assigned: true },
        ColumnDef { name: "model", kind: ColumnKind::Text, nullable: false, server_assigned: false },
        ColumnDef { name: "location", kind: ColumnKind::Text, nullable: false, server_assigned: false },
        ColumnDef { name: "company_id", kind: ColumnKind::Uuid, nullable: true, server_assigned: false },
        ColumnDef { name: "created_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
        ColumnDef { name: "updated_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
    ],
    filterable: &["id", "model", "location", "company_id"],
    includes: &[
        IncludeDef { name: "company", kind: IncludeKind::ToOne, related: "company", our_key: "company_id", their_key: "id", counted: false },
        IncludeDef { name: "bookings", kind: IncludeKind::ToMany, related: "booking", our_key: "id", their_key: "car_id", counted: true },
    ],
    references: &[("company_id", "company")],
    schema,
};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field("model", &[
            (Predicate::Required, "model is required"),
            (Predicate::NonEmptyString, "model must be a non-empty string"),
        ])
        .field("location", &[
            (Predicate::Required, "location is required"),
            (Predicate::NonEmptyString, "location must be a non-empty string"),
        ])
        .field("company_id", &[(Predicate::NullableUuid, "company_id must be a valid id")])
});

pub fn schema() -> &'static Schema {
    &SCHEMA
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub model: String,
    pub location: String,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<CarCount>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarCount {
    pub bookings: u64,
}

/// Editable attributes, used for both create and full-replace update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CarInput {
    pub model: String,
    pub location: String,
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct CarListQuery {
    pub id: Option<Uuid>,
    pub model: Option<String>,
    pub location: Option<String>,
    pub company_id: Option<Uuid>,
    pub include: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CarListQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(model) = &self.model {
            pairs.push(("model", model.clone()));
        }
        if let Some(location) = &self.location {
            pairs.push(("location", location.clone()));
        }
        if let Some(company_id) = &self.company_id {
            pairs.push(("company_id", company_id.to_string()));
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
