//! Table and index statements generated from registered schemas.
//!
//! Every statement is `IF NOT EXISTS`, so applying the same schemas to an
//! already initialized database changes nothing.

use contracts::shared::metadata::FieldType;
use sea_orm::sea_query::{
    Alias, ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DbErr};

use super::model::{ColumnSchema, EntitySchema};
use super::registrar::ModelSchemas;

fn column_def(column: &ColumnSchema) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column.name));
    match column.field_type {
        FieldType::Key | FieldType::AggregateRef => {
            def.string();
        }
        FieldType::Text => match column.rules.max_length {
            Some(max) => {
                def.string_len(max as u32);
            }
            None => {
                def.text();
            }
        },
        FieldType::Timestamp => {
            def.timestamp_with_time_zone();
        }
    }

    if column.rules.required {
        def.not_null();
    } else {
        def.null();
    }
    if column.primary_key {
        def.primary_key();
    }
    def
}

pub fn create_table_statement(schema: &EntitySchema) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(schema.table.as_str())).if_not_exists();

    for column in &schema.columns {
        stmt.col(&mut column_def(column));
    }

    for fk in &schema.foreign_keys {
        stmt.foreign_key(
            ForeignKey::create()
                .name(fk.name.as_str())
                .from(Alias::new(schema.table.as_str()), Alias::new(fk.column))
                .to(
                    Alias::new(fk.principal_table.as_str()),
                    Alias::new(fk.principal_column),
                )
                .on_delete(fk.on_delete.to_foreign_key_action())
                .on_update(ForeignKeyAction::NoAction),
        );
    }

    stmt
}

pub fn create_index_statements(schema: &EntitySchema) -> Vec<IndexCreateStatement> {
    schema
        .indexes
        .iter()
        .map(|index| {
            let mut stmt = Index::create();
            stmt.if_not_exists()
                .name(index.name.as_str())
                .table(Alias::new(schema.table.as_str()));
            for column in &index.columns {
                stmt.col(Alias::new(*column));
            }
            if index.unique {
                stmt.unique();
            }
            stmt
        })
        .collect()
}

/// Create every registered table and index, principals first
pub async fn apply<C: ConnectionTrait>(db: &C, schemas: &ModelSchemas) -> Result<(), DbErr> {
    let backend = db.get_database_backend();

    for schema in schemas.iter() {
        db.execute(backend.build(&create_table_statement(schema)))
            .await?;

        for index in create_index_statements(schema) {
            db.execute(backend.build(&index)).await?;
        }

        tracing::info!("Ensured table {}", schema.table);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::SqliteQueryBuilder;

    fn contributor_sql() -> (String, Vec<String>) {
        let schemas = ModelSchemas::build().unwrap();
        let schema = schemas.get("a002_contributor").unwrap();
        let table = create_table_statement(schema).to_string(SqliteQueryBuilder);
        let indexes = create_index_statements(schema)
            .iter()
            .map(|stmt| stmt.to_string(SqliteQueryBuilder))
            .collect();
        (table, indexes)
    }

    #[test]
    fn test_contributor_table_declares_no_action_foreign_key() {
        let (table, _) = contributor_sql();
        assert!(table.contains("IF NOT EXISTS"));
        assert!(table.contains("\"a001_source\""));
        assert!(table.contains("ON DELETE NO ACTION"));
        assert!(!table.contains("CASCADE"));
    }

    #[test]
    fn test_required_columns_are_not_null() {
        let (table, _) = contributor_sql();
        for column in ["external_id", "source_id", "username"] {
            let definition = table
                .split(',')
                .find(|part| part.contains(&format!("\"{}\"", column)))
                .unwrap();
            assert!(definition.contains("NOT NULL"), "{column}: {definition}");
        }
    }

    #[test]
    fn test_lookup_index_is_not_unique() {
        let (_, indexes) = contributor_sql();
        assert_eq!(indexes.len(), 1);
        assert!(indexes[0].contains("ix_a002_contributor_external_id_source_id_username"));
        assert!(!indexes[0].contains("UNIQUE"));
    }
}
