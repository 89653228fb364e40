//! User entity: a person who can hold bookings.

use super::{Booking, ColumnDef, ColumnKind, EntityDef, IncludeDef, IncludeKind};
use crate::schema::{Predicate, Schema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

pub static DEF: EntityDef = EntityDef {
    name: "user",
    segment: "users",
    columns: &[
        ColumnDef { name: "id", kind: ColumnKind::Uuid, nullable: false, server_assigned: true },
        ColumnDef { name: "email", kind: ColumnKind::Text, nullable: false, server_assigned: false },
        ColumnDef { name: "first_name", kind: ColumnKind::Text, nullable: true, server_assigned: false },
        ColumnDef { name: "last_name", kind: ColumnKind::Text, nullable: true, server_assigned: false },
        ColumnDef { name: "created_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
        ColumnDef { name: "updated_at", kind: ColumnKind::Timestamp, nullable: false, server_assigned: true },
    ],
    filterable: &["id", "email"],
    includes: &[
        IncludeDef { name: "bookings", kind: IncludeKind::ToMany, related: "booking", our_key: "id", their_key: "user_id", counted: true },
    ],
    references: &[],
    schema,
};

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new()
        .field("email", &[
            (Predicate::Required, "email is required"),
            (Predicate::NonEmptyString, "email must be a non-empty string"),
        ])
        .field("first_name", &[(Predicate::NullableString, "first_name must be a string")])
        .field("last_name", &[(Predicate::NullableString, "last_name must be a string")])
});

pub fn schema() -> &'static Schema {
    &SCHEMA
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookings: Option<Vec<Booking>>,
    #[serde(default, rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<UserCount>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserCount {
    pub bookings: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInput {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UserListQuery {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub include: Vec<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl UserListQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.id {
            pairs.push(("id", id.to_string()));
        }
        if let Some(email) = &self.email {
            pairs.push(("email", email.clone()));
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
