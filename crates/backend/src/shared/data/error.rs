use contracts::shared::metadata::{FieldViolation, ViolationKind};
use sea_orm::DbErr;
use thiserror::Error;

use crate::shared::schema::{EntitySchema, SchemaError};

/// Ошибки слоя хранения
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid schema configuration: {0}")]
    Schema(#[from] SchemaError),

    #[error("{entity} constraint violated on {violation}")]
    ConstraintViolation {
        entity: &'static str,
        violation: FieldViolation,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("no schema registered for {0}")]
    Unregistered(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

impl StorageError {
    pub fn constraint(entity: &'static str, violation: FieldViolation) -> Self {
        Self::ConstraintViolation { entity, violation }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Violated field, for constraint violations
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::ConstraintViolation { violation, .. } => Some(violation.field),
            _ => None,
        }
    }

    pub fn violation_kind(&self) -> Option<&ViolationKind> {
        match self {
            Self::ConstraintViolation { violation, .. } => Some(&violation.kind),
            _ => None,
        }
    }
}

/// Map an engine failure on insert/update into the constraint taxonomy.
///
/// SQLite reports `NOT NULL constraint failed: <table>.<column>` and
/// `FOREIGN KEY constraint failed`; anything else stays a database error.
pub fn classify_write_error(schema: &EntitySchema, err: DbErr) -> StorageError {
    let message = err.to_string();

    if let Some(rest) = message.split("NOT NULL constraint failed: ").nth(1) {
        let column: String = rest
            .split('.')
            .nth(1)
            .unwrap_or_default()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if let Some(column) = schema.column(&column) {
            return StorageError::constraint(
                schema.entity,
                FieldViolation::new(column.name, ViolationKind::Required),
            );
        }
    }

    if message.contains("FOREIGN KEY constraint failed") {
        if let Some(fk) = schema.foreign_keys.first() {
            return StorageError::constraint(
                schema.entity,
                FieldViolation::new(
                    fk.column,
                    ViolationKind::MissingReference {
                        entity: fk.principal_entity.to_string(),
                    },
                ),
            );
        }
    }

    StorageError::Database(err)
}

/// Map an engine failure on delete of a principal row
pub fn classify_delete_error(
    schema: &EntitySchema,
    dependent: &str,
    via: &str,
    err: DbErr,
) -> StorageError {
    if err.to_string().contains("FOREIGN KEY constraint failed") {
        let key = schema.primary_key().map(|c| c.name).unwrap_or("id");
        return StorageError::constraint(
            schema.entity,
            FieldViolation::new(
                key,
                ViolationKind::ReferencedBy {
                    dependent: dependent.to_string(),
                    via: via.to_string(),
                    count: 0,
                },
            ),
        );
    }
    StorageError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::schema::ModelSchemas;

    #[test]
    fn test_not_null_failure_maps_to_required() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a002_contributor").unwrap();
        let err = DbErr::Custom(
            "error returned from database: (code: 1299) NOT NULL constraint failed: a002_contributor.external_id"
                .into(),
        );
        let mapped = classify_write_error(schema, err);
        assert_eq!(mapped.field(), Some("external_id"));
        assert_eq!(mapped.violation_kind(), Some(&ViolationKind::Required));
    }

    #[test]
    fn test_foreign_key_failure_maps_to_missing_reference() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a002_contributor").unwrap();
        let err = DbErr::Custom("(code: 787) FOREIGN KEY constraint failed".into());
        let mapped = classify_write_error(schema, err);
        assert_eq!(mapped.field(), Some("source_id"));
        assert_eq!(
            mapped.violation_kind(),
            Some(&ViolationKind::MissingReference {
                entity: "Source".into()
            })
        );
    }

    #[test]
    fn test_engine_rejected_delete_maps_to_referenced_by() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a001_source").unwrap();
        let err = DbErr::Custom("(code: 787) FOREIGN KEY constraint failed".into());
        let mapped = classify_delete_error(schema, "Contributor", "source_id", err);
        assert!(matches!(
            mapped,
            StorageError::ConstraintViolation { entity: "Source", .. }
        ));
        assert_eq!(mapped.field(), Some("id"));
        assert_eq!(
            mapped.violation_kind(),
            Some(&ViolationKind::ReferencedBy {
                dependent: "Contributor".into(),
                via: "source_id".into(),
                count: 0,
            })
        );
    }

    #[test]
    fn test_other_delete_failures_stay_database_errors() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a001_source").unwrap();
        let err = DbErr::Custom("database is locked".into());
        let mapped = classify_delete_error(schema, "Contributor", "source_id", err);
        assert!(matches!(mapped, StorageError::Database(_)));
    }

    #[test]
    fn test_other_failures_stay_database_errors() {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a001_source").unwrap();
        let mapped = classify_write_error(schema, DbErr::Custom("disk I/O error".into()));
        assert!(matches!(mapped, StorageError::Database(_)));
    }
}
