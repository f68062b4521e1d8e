//! Explicit constraint checks applied before every write.
//!
//! Required-ness and length bounds of every text and reference column are
//! checked against the registered schema, whatever the storage engine
//! enforces on its own.

use contracts::shared::metadata::{FieldType, FieldValues, FieldViolation, ViolationKind};
use uuid::Uuid;

use super::model::{ColumnSchema, EntitySchema};

fn check_column<R: FieldValues + ?Sized>(
    column: &ColumnSchema,
    record: &R,
) -> Result<(), FieldViolation> {
    let value = record.field_value(column.name);

    column
        .rules
        .validate_text(value.as_deref())
        .map_err(|kind| FieldViolation::new(column.name, kind))?;

    if column.field_type == FieldType::AggregateRef {
        if let Some(value) = value {
            if Uuid::parse_str(&value).is_err() {
                return Err(FieldViolation::new(
                    column.name,
                    ViolationKind::InvalidIdentifier {
                        value: value.into_owned(),
                    },
                ));
            }
        }
    }

    Ok(())
}

impl EntitySchema {
    /// First violation in column order, if any
    pub fn validate<R: FieldValues + ?Sized>(&self, record: &R) -> Result<(), FieldViolation> {
        self.columns
            .iter()
            .filter(|c| c.field_type.is_validated())
            .try_for_each(|column| check_column(column, record))
    }

    /// Every violation, in column order
    pub fn violations<R: FieldValues + ?Sized>(&self, record: &R) -> Vec<FieldViolation> {
        self.columns
            .iter()
            .filter(|c| c.field_type.is_validated())
            .filter_map(|column| check_column(column, record).err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::schema::ModelSchemas;
    use contracts::domain::a001_source::aggregate::SourceId;
    use contracts::domain::a002_contributor::aggregate::{Contributor, ContributorDto};
    use contracts::domain::common::AggregateId;

    fn valid_dto() -> ContributorDto {
        ContributorDto {
            external_id: Some("ext-1".into()),
            source_id: Some(SourceId::new_v4().as_string()),
            username: Some("octocat".into()),
            ..Default::default()
        }
    }

    fn with_schema(check: impl FnOnce(&EntitySchema)) {
        let schemas = ModelSchemas::build().unwrap();
        check(schemas.of::<Contributor>().unwrap());
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        with_schema(|schema| {
            assert_eq!(schema.validate(&valid_dto()), Ok(()));
        });
    }

    #[test]
    fn test_absent_external_id_is_a_required_violation() {
        with_schema(|schema| {
            let dto = ContributorDto {
                external_id: None,
                ..valid_dto()
            };
            assert_eq!(
                schema.validate(&dto),
                Err(FieldViolation::new("external_id", ViolationKind::Required))
            );
        });
    }

    #[test]
    fn test_overlong_email_is_rejected() {
        with_schema(|schema| {
            let dto = ContributorDto {
                email: Some(format!("{}@example.com", "a".repeat(250))),
                ..valid_dto()
            };
            assert_eq!(
                schema.validate(&dto),
                Err(FieldViolation::new(
                    "email",
                    ViolationKind::MaxLength {
                        max: 255,
                        actual: 262
                    }
                ))
            );
        });
    }

    #[test]
    fn test_avatar_url_has_no_length_bound() {
        with_schema(|schema| {
            let dto = ContributorDto {
                avatar_url: Some(format!("https://avatars.example.com/{}", "x".repeat(1000))),
                ..valid_dto()
            };
            assert_eq!(schema.validate(&dto), Ok(()));
        });
    }

    #[test]
    fn test_boundary_length_is_accepted() {
        with_schema(|schema| {
            let dto = ContributorDto {
                username: Some("u".repeat(255)),
                ..valid_dto()
            };
            assert_eq!(schema.validate(&dto), Ok(()));
        });
    }

    #[test]
    fn test_malformed_source_id_is_rejected() {
        with_schema(|schema| {
            let dto = ContributorDto {
                source_id: Some("github".into()),
                ..valid_dto()
            };
            assert!(matches!(
                schema.validate(&dto),
                Err(FieldViolation {
                    field: "source_id",
                    kind: ViolationKind::InvalidIdentifier { .. }
                })
            ));
        });
    }

    #[test]
    fn test_violations_reports_every_field() {
        with_schema(|schema| {
            let fields: Vec<&str> = schema
                .violations(&ContributorDto::default())
                .into_iter()
                .map(|v| v.field)
                .collect();
            assert_eq!(fields, vec!["external_id", "source_id", "username"]);
        });
    }
}
