//! Booking entity: a time window on a car, optionally tied to a user.

use super::{Car, ColumnDef, ColumnKind, EntityDef, IncludeDef, IncludeKind, User};
use crate::schema::{Predicate, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use uuid::Uuid;

pub static DEF: EntityDef = EntityDef {
    name: "booking",
    segment: "bookings",
    columns: &[
        ColumnDef { name: "id", kind: ColumnKind::Uuid, nullable: false, server_assigned: true },
        ColumnDef { name: "start_time", kind: ColumnKind::Timestamp, nullable: false, server_assigned: false },
        ColumnDef { name: "end_time", kind: ColumnKind::Timestamp, nullable: false, server_assigned: false },
        ColumnDef { name: "user_id", kind: ColumnKind::Uuid, nullable: true, server_assigned: false },
        ColumnDef { name: "car_id", kind: ColumnKind::Uuid, nullable: true, server_assigned: false },
        ColumnDef { name: "created_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
        ColumnDef { name: "updated_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
    ],
    filterable: &["id", "user_id", "car_id"],
    includes: &[
        IncludeDef { name: "user", kind: IncludeKind::ToOne, related: "user", our_key: "user_id", their_key: "id", counted: false },
        IncludeDef { name: "car", kind: IncludeKind::ToOne, related: "car", our_key: "car_id", their_key: "id", counted: false },
    ],
    references: &[("user_id", "user"), ("car_id", "car")],
    schema,
};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field("start_time", &[
            (Predicate::Required, "start_time is required"),
            (Predicate::Date, "start_time must be a valid date"),
        ])
        .field("end_time", &[
            (Predicate::Required, "end_time is required"),
            (Predicate::Date, "end_time must be a valid date"),
        ])
        .field("user_id", &[(Predicate::NullableUuid, "user_id must be a valid id")])
        .field("car_id", &[(Predicate::NullableUuid, "car_id must be a valid id")])
        .record_rule("end_time", "end_time must not precede start_time", end_after_start)
});

pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn end_after_start(body: &Map<String, Value>) -> bool {
    let parse = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    };
    match (parse("start_time"), parse("end_time")) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Box<Car>>,
}

/// Editable attributes, used for both create and full-replace update.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingInput {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub car_id: Option<Uuid>,
}

#[derive(Clone, Debug, Default)]
pub struct BookingListQuery {
    pub id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub car_id: Option<Uuid>,
    pub include: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl BookingListQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(user_id) = &self.user_id {
            pairs.push(("user_id", user_id.to_string()));
        }
        if let Some(car_id) = &self.car_id {
            pairs.push(("car_id", car_id.to_string()));
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
