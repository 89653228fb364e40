//! Declarative validation schemas: per-field predicate chains plus optional
//! record-level rules, evaluated before any write reaches the store.

use crate::error::FieldError;
use chrono::DateTime;
use serde_json::{Map, Value};

/// A single field check. Predicates other than `Required` are skipped when the
/// field is absent or null.
#[derive(Clone, Copy, Debug)]
pub enum Predicate {
    /// Present and not null.
    Required,
    /// RFC 3339 date-time string.
    Date,
    /// String with non-whitespace content.
    NonEmptyString,
    /// String when present.
    NullableString,
    /// UUID string when present.
    NullableUuid,
}

impl Predicate {
    fn holds(&self, value: Option<&Value>) -> bool {
        let present = match value {
            None | Some(Value::Null) => false,
            Some(_) => true,
        };
        if let Predicate::Required = self {
            return present;
        }
        if !present {
            return true;
        }
        let value = value.unwrap();
        match self {
            Predicate::Required => unreachable!(),
            Predicate::Date => value
                .as_str()
                .map(|s| DateTime::parse_from_rfc3339(s).is_ok())
                .unwrap_or(false),
            Predicate::NonEmptyString => value
                .as_str()
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false),
            Predicate::NullableString => value.is_string(),
            Predicate::NullableUuid => value
                .as_str()
                .map(|s| uuid::Uuid::parse_str(s).is_ok())
                .unwrap_or(false),
        }
    }
}

struct FieldRules {
    field: &'static str,
    rules: Vec<(Predicate, &'static str)>,
}

/// Cross-field rule, checked only once every field-level rule has passed.
struct RecordRule {
    field: &'static str,
    message: &'static str,
    holds: fn(&Map<String, Value>) -> bool,
}

/// Ordered rule set for one entity. Evaluation visits every field, collecting
/// the first failing rule per field, so a reject enumerates all offending
/// fields at once.
pub struct Schema {
    fields: Vec<FieldRules>,
    record_rules: Vec<RecordRule>,
}

impl Schema {
    pub fn new() -> Self {
        Schema {
            fields: Vec::new(),
            record_rules: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, rules: &[(Predicate, &'static str)]) -> Self {
        self.fields.push(FieldRules {
            field: name,
            rules: rules.to_vec(),
        });
        self
    }

    pub fn record_rule(
        mut self,
        field: &'static str,
        message: &'static str,
        holds: fn(&Map<String, Value>) -> bool,
    ) -> Self {
        self.record_rules.push(RecordRule {
            field,
            message,
            holds,
        });
        self
    }

    pub fn validate(&self, body: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        for fr in &self.fields {
            let value = body.get(fr.field);
            for (predicate, message) in &fr.rules {
                if !predicate.holds(value) {
                    errors.push(FieldError::new(fr.field, *message));
                    break;
                }
            }
        }
        if errors.is_empty() {
            for rr in &self.record_rules {
                if !(rr.holds)(body) {
                    errors.push(FieldError::new(rr.field, rr.message));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn car_schema_accepts_valid_payload() {
        let schema = (model::car::DEF.schema)();
        let b = body(json!({"model": "Model 3", "location": "Berlin", "company_id": null}));
        assert!(schema.validate(&b).is_ok());
    }

    #[test]
    fn car_schema_rejects_missing_and_empty_fields() {
        let schema = (model::car::DEF.schema)();
        let b = body(json!({"model": "  ", "company_id": "not-a-uuid"}));
        let errors = schema.validate(&b).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["model", "location", "company_id"]);
    }

    #[test]
    fn booking_schema_requires_both_times() {
        let schema = (model::booking::DEF.schema)();
        let b = body(json!({"user_id": null}));
        let errors = schema.validate(&b).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["start_time", "end_time"]);
    }

    #[test]
    fn booking_schema_rejects_malformed_date() {
        let schema = (model::booking::DEF.schema)();
        let b = body(json!({"start_time": "tomorrow", "end_time": "2030-01-02T10:00:00Z"}));
        let errors = schema.validate(&b).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "start_time");
        assert!(errors[0].message.contains("valid date"));
    }

    #[test]
    fn booking_schema_rejects_end_before_start() {
        let schema = (model::booking::DEF.schema)();
        let b = body(json!({
            "start_time": "2030-01-02T10:00:00Z",
            "end_time": "2030-01-01T10:00:00Z"
        }));
        let errors = schema.validate(&b).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "end_time");
    }

    #[test]
    fn record_rule_skipped_while_field_errors_exist() {
        let schema = (model::booking::DEF.schema)();
        let b = body(json!({"start_time": "2030-01-02T10:00:00Z"}));
        let errors = schema.validate(&b).unwrap_err();
        // Only the missing end_time, not the ordering rule on top of it.
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "end_time");
    }
}
