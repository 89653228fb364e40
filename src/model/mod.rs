//! Static entity registry: table shapes, filterable columns, relation
//! includes, and validation schemas for the four admin entities.

pub mod booking;
pub mod car;
pub mod company;
pub mod user;

pub use booking::{Booking, BookingInput, BookingListQuery};
pub use car::{Car, CarCount, CarInput, CarListQuery};
pub use company::{Company, CompanyInput, CompanyListQuery};
pub use user::{User, UserInput, UserListQuery};

use crate::schema::Schema;

/// Column kind drives SQL casts, parameter binding, and row decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Timestamp,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// Assigned by the store (id, created_at, updated_at); stripped from
    /// client write payloads.
    pub server_assigned: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncludeKind {
    ToOne,
    ToMany,
}

/// A relation that can be expanded via the `include` query parameter.
#[derive(Clone, Copy, Debug)]
pub struct IncludeDef {
    /// Name as it appears in `include=` and in the response body.
    pub name: &'static str,
    pub kind: IncludeKind,
    /// Singular entity name of the related side, for registry lookup.
    pub related: &'static str,
    pub our_key: &'static str,
    pub their_key: &'static str,
    /// To-many only: also surface the row count under `_count`.
    pub counted: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct EntityDef {
    /// Singular entity name, also the table name.
    pub name: &'static str,
    /// Plural URL segment.
    pub segment: &'static str,
    pub columns: &'static [ColumnDef],
    /// Columns accepted as equality filters in list/detail queries. Anything
    /// else in the query string is rejected, not silently matched.
    pub filterable: &'static [&'static str],
    pub includes: &'static [IncludeDef],
    /// Foreign keys: (column, referenced entity name).
    pub references: &'static [(&'static str, &'static str)],
    pub schema: fn() -> &'static Schema,
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn include(&self, name: &str) -> Option<&'static IncludeDef> {
        self.includes.iter().find(|i| i.name == name)
    }

    pub fn is_filterable(&self, name: &str) -> bool {
        self.filterable.contains(&name)
    }
}

pub static ENTITIES: [&EntityDef; 4] = [&booking::DEF, &car::DEF, &company::DEF, &user::DEF];

pub fn entity_by_segment(segment: &str) -> Option<&'static EntityDef> {
    ENTITIES.iter().copied().find(|e| e.segment == segment)
}

pub fn entity_by_name(name: &str) -> Option<&'static EntityDef> {
    ENTITIES.iter().copied().find(|e| e.name == name)
}

/// Map a plural route segment to its singular entity name. Unknown segments
/// pass through unchanged.
pub fn route_to_entity(segment: &str) -> &str {
    match segment {
        "bookings" => "booking",
        "cars" => "car",
        "companies" => "company",
        "users" => "user",
        other => other,
    }
}

/// Generic detail-query options: relation expansion only.
#[derive(Clone, Debug, Default)]
pub struct GetQuery {
    pub include: Vec<String>,
}

impl GetQuery {
    pub fn include(names: &[&str]) -> Self {
        GetQuery {
            include: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        if self.include.is_empty() {
            Vec::new()
        } else {
            vec![("include", self.include.join(","))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_segments_to_entity_names() {
        assert_eq!(route_to_entity("bookings"), "booking");
        assert_eq!(route_to_entity("cars"), "car");
        assert_eq!(route_to_entity("companies"), "company");
        assert_eq!(route_to_entity("users"), "user");
    }

    #[test]
    fn unknown_segment_passes_through() {
        assert_eq!(route_to_entity("garages"), "garages");
        assert_eq!(route_to_entity(""), "");
    }

    #[test]
    fn registry_segments_resolve() {
        for e in ENTITIES {
            assert_eq!(entity_by_segment(e.segment).unwrap().name, e.name);
            assert_eq!(route_to_entity(e.segment), e.name);
        }
        assert!(entity_by_segment("garages").is_none());
    }

    #[test]
    fn references_point_at_registered_entities() {
        for e in ENTITIES {
            for (col, target) in e.references {
                assert!(e.column(col).is_some(), "{}: missing fk column {}", e.name, col);
                assert!(entity_by_name(target).is_some(), "{}: dangling reference {}", e.name, target);
            }
            for inc in e.includes {
                assert!(entity_by_name(inc.related).is_some());
            }
        }
    }
}
