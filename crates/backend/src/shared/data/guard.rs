//! Pre-delete referential check.
//!
//! For relationships declared `NoAction`/`Restrict`, deleting a principal row
//! that still has dependents is rejected before the engine is asked to do it.
//! Must run on the same transaction as the delete.

use contracts::shared::metadata::{FieldViolation, ViolationKind};
use sea_orm::{ConnectionTrait, DbErr, Statement};

use super::error::StorageError;
use crate::shared::schema::{EntitySchema, ModelSchemas};

async fn count_dependents<C: ConnectionTrait>(
    db: &C,
    table: &str,
    column: &str,
    id: &str,
) -> Result<u64, DbErr> {
    let sql = format!(
        "SELECT COUNT(*) AS cnt FROM \"{}\" WHERE \"{}\" = ?",
        table, column
    );
    let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, [id.into()]);

    let row = db
        .query_one(stmt)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("count over {}", table)))?;
    let count: i64 = row.try_get("", "cnt")?;

    Ok(count.max(0) as u64)
}

pub async fn ensure_no_blocking_dependents<C: ConnectionTrait>(
    db: &C,
    schemas: &ModelSchemas,
    principal: &EntitySchema,
    id: &str,
) -> Result<(), StorageError> {
    let key = principal.primary_key().map(|c| c.name).unwrap_or("id");

    for (dependent, fk) in schemas.dependents_of(&principal.table) {
        if !fk.on_delete.blocks_delete() {
            continue;
        }

        let count = count_dependents(db, &dependent.table, fk.column, id).await?;
        if count > 0 {
            tracing::warn!(
                "Rejected delete of {} {}: {} {} row(s) reference it ({})",
                principal.entity,
                id,
                count,
                dependent.entity,
                fk.on_delete
            );
            return Err(StorageError::constraint(
                principal.entity,
                FieldViolation::new(
                    key,
                    ViolationKind::ReferencedBy {
                        dependent: dependent.entity.to_string(),
                        via: fk.column.to_string(),
                        count,
                    },
                ),
            ));
        }
    }

    Ok(())
}
