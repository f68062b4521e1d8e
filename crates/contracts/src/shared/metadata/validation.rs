//! Validation rules for metadata fields

use serde::Serialize;
use thiserror::Error;

use crate::domain::common::AggregateId;

/// Kind of constraint a value failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    #[error("value is required")]
    Required,

    #[error("length {actual} exceeds the maximum of {max} characters")]
    MaxLength { max: usize, actual: usize },

    #[error("'{value}' is not a valid identifier")]
    InvalidIdentifier { value: String },

    #[error("referenced {entity} does not exist")]
    MissingReference { entity: String },

    #[error("still referenced by {count} {dependent} row(s) through {via}")]
    ReferencedBy {
        dependent: String,
        via: String,
        count: u64,
    },
}

/// A violation bound to the field it was raised for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {kind}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn new(field: &'static str, kind: ViolationKind) -> Self {
        Self { field, kind }
    }
}

/// Validation rules for a field
/// Copy trait for efficient passing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ValidationRules {
    pub required: bool,
    pub max_length: Option<usize>,
}

impl ValidationRules {
    /// Create empty validation rules (optional, no length bound)
    pub const fn none() -> Self {
        Self {
            required: false,
            max_length: None,
        }
    }

    /// Create validation rules for required field
    pub const fn required() -> Self {
        Self {
            required: true,
            max_length: None,
        }
    }

    pub const fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Validate an optional text value against the rules.
    ///
    /// Length is counted in characters, not bytes.
    pub fn validate_text(&self, value: Option<&str>) -> Result<(), ViolationKind> {
        let Some(value) = value else {
            return if self.required {
                Err(ViolationKind::Required)
            } else {
                Ok(())
            };
        };

        if let Some(max) = self.max_length {
            let actual = value.chars().count();
            if actual > max {
                return Err(ViolationKind::MaxLength { max, actual });
            }
        }

        Ok(())
    }
}

/// Unwrap a required DTO field
pub fn require<'a>(
    field: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, FieldViolation> {
    value
        .as_deref()
        .ok_or_else(|| FieldViolation::new(field, ViolationKind::Required))
}

/// Parse an identifier carried as text in a DTO
pub fn parse_id<Id: AggregateId>(field: &'static str, value: &str) -> Result<Id, FieldViolation> {
    Id::from_string(value).map_err(|_| {
        FieldViolation::new(
            field,
            ViolationKind::InvalidIdentifier {
                value: value.to_string(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_absent_value() {
        let rules = ValidationRules::required().with_max_length(255);
        assert_eq!(rules.validate_text(None), Err(ViolationKind::Required));
        assert_eq!(rules.validate_text(Some("octocat")), Ok(()));
    }

    #[test]
    fn test_optional_accepts_absent_value() {
        assert_eq!(ValidationRules::none().validate_text(None), Ok(()));
    }

    #[test]
    fn test_max_length_counts_characters() {
        let rules = ValidationRules::none().with_max_length(3);
        // 3 characters, 6 bytes
        assert_eq!(rules.validate_text(Some("äöü")), Ok(()));
        assert_eq!(
            rules.validate_text(Some("abcd")),
            Err(ViolationKind::MaxLength { max: 3, actual: 4 })
        );
    }

    #[test]
    fn test_violation_serializes_with_kind_tag() {
        let violation = FieldViolation::new("username", ViolationKind::MaxLength { max: 255, actual: 300 });
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["field"], "username");
        assert_eq!(json["kind"]["kind"], "max_length");
        assert_eq!(json["kind"]["max"], 255);
    }

    #[test]
    fn test_parse_id_reports_invalid_value() {
        let err = parse_id::<uuid::Uuid>("source_id", "not-a-uuid").unwrap_err();
        assert_eq!(err.field, "source_id");
        assert!(matches!(err.kind, ViolationKind::InvalidIdentifier { .. }));
    }
}
