//! Storage schema registration for every mapped aggregate.
//!
//! `ModelSchemas::build()` runs once per storage engine instance, before any
//! read or write. The result is immutable and shared read-only afterwards.

use contracts::domain::a001_source::aggregate::Source;
use contracts::domain::a002_contributor::aggregate::Contributor;
use contracts::domain::common::AggregateRoot;
use serde::Serialize;

use super::builder::EntityTypeBuilder;
use super::error::SchemaError;
use super::model::{DeleteBehavior, EntitySchema, ForeignKeySchema};

/// Upper bound for bounded text columns
pub const MAX_TEXT_LENGTH: usize = 255;

pub fn register_source_schema(builder: &mut EntityTypeBuilder) {
    builder
        .property("name")
        .has_max_length(MAX_TEXT_LENGTH)
        .is_required();

    builder.property("url").is_required();
}

pub fn register_contributor_schema(builder: &mut EntityTypeBuilder) {
    builder
        .property("external_id")
        .has_max_length(MAX_TEXT_LENGTH)
        .is_required();

    builder.property("source_id").is_required();

    builder
        .property("username")
        .has_max_length(MAX_TEXT_LENGTH)
        .is_required();

    builder.property("name").has_max_length(MAX_TEXT_LENGTH);

    builder.property("email").has_max_length(MAX_TEXT_LENGTH);

    builder.property("avatar_url").is_optional();

    // Lookup accelerator only: identical triples are not rejected
    builder
        .has_index(&["external_id", "source_id", "username"])
        .is_unique(false);

    builder
        .has_one::<Source>()
        .with_many("contributors")
        .has_foreign_key("source_id")
        .on_delete(DeleteBehavior::NoAction);
}

/// Registered schemas in registration order (principals before dependents)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ModelSchemas {
    schemas: Vec<EntitySchema>,
}

impl ModelSchemas {
    pub fn build() -> Result<Self, SchemaError> {
        let mut schemas = Self::default();
        schemas.register::<Source>(register_source_schema)?;
        schemas.register::<Contributor>(register_contributor_schema)?;
        Ok(schemas)
    }

    fn register<T: AggregateRoot>(
        &mut self,
        configure: fn(&mut EntityTypeBuilder),
    ) -> Result<(), SchemaError> {
        let mut builder = EntityTypeBuilder::for_aggregate::<T>();
        configure(&mut builder);
        let schema = builder.build()?;

        if self.get(&schema.table).is_some() {
            return Err(SchemaError::DuplicateEntity {
                entity: schema.entity,
            });
        }
        for fk in &schema.foreign_keys {
            if self.get(&fk.principal_table).is_none() {
                return Err(SchemaError::UnregisteredPrincipal {
                    entity: schema.entity,
                    principal: fk.principal_entity,
                });
            }
        }

        tracing::debug!(
            "Registered schema {} ({} columns, {} indexes, {} foreign keys)",
            schema.table,
            schema.columns.len(),
            schema.indexes.len(),
            schema.foreign_keys.len()
        );
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, table: &str) -> Option<&EntitySchema> {
        self.schemas.iter().find(|s| s.table == table)
    }

    pub fn of<T: AggregateRoot>(&self) -> Option<&EntitySchema> {
        self.get(&T::table_name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Foreign keys in other schemas that point at `table`
    pub fn dependents_of<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = (&'a EntitySchema, &'a ForeignKeySchema)> + 'a {
        self.schemas.iter().flat_map(move |schema| {
            schema
                .foreign_keys
                .iter()
                .filter(move |fk| fk.principal_table == table)
                .map(move |fk| (schema, fk))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::metadata::ValidationRules;

    fn contributor_schema() -> EntitySchema {
        let mut builder = EntityTypeBuilder::for_aggregate::<Contributor>();
        register_contributor_schema(&mut builder);
        builder.build().unwrap()
    }

    #[test]
    fn test_contributor_column_constraints() {
        let schema = contributor_schema();
        let rules = |name: &str| schema.column(name).unwrap().rules;

        assert_eq!(rules("external_id"), ValidationRules::required().with_max_length(255));
        assert_eq!(rules("source_id"), ValidationRules::required());
        assert_eq!(rules("username"), ValidationRules::required().with_max_length(255));
        assert_eq!(rules("name"), ValidationRules::none().with_max_length(255));
        assert_eq!(rules("email"), ValidationRules::none().with_max_length(255));
        assert_eq!(rules("avatar_url"), ValidationRules::none());
    }

    #[test]
    fn test_contributor_lookup_index_is_not_unique() {
        let schema = contributor_schema();
        assert_eq!(schema.indexes.len(), 1);
        let index = &schema.indexes[0];
        assert_eq!(index.columns, vec!["external_id", "source_id", "username"]);
        assert!(!index.unique);
    }

    #[test]
    fn test_contributor_source_relationship_uses_no_action() {
        let schema = contributor_schema();
        assert_eq!(schema.foreign_keys.len(), 1);
        let fk = &schema.foreign_keys[0];
        assert_eq!(fk.column, "source_id");
        assert_eq!(fk.principal_table, "a001_source");
        assert_eq!(fk.navigation, Some("contributors"));
        assert_eq!(fk.on_delete, DeleteBehavior::NoAction);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let once = contributor_schema();

        let mut builder = EntityTypeBuilder::for_aggregate::<Contributor>();
        register_contributor_schema(&mut builder);
        register_contributor_schema(&mut builder);
        let twice = builder.build().unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_model_schemas_orders_principal_first() {
        let schemas = ModelSchemas::build().unwrap();
        let tables: Vec<&str> = schemas.iter().map(|s| s.table.as_str()).collect();
        assert_eq!(tables, vec!["a001_source", "a002_contributor"]);
        assert!(schemas.of::<Contributor>().is_some());
    }

    #[test]
    fn test_dependents_of_source() {
        let schemas = ModelSchemas::build().unwrap();
        let dependents: Vec<(&str, &str)> = schemas
            .dependents_of("a001_source")
            .map(|(schema, fk)| (schema.entity, fk.column))
            .collect();
        assert_eq!(dependents, vec![("Contributor", "source_id")]);
        assert_eq!(schemas.dependents_of("a002_contributor").count(), 0);
    }

    #[test]
    fn test_dependent_before_principal_is_rejected() {
        let mut schemas = ModelSchemas::default();
        let err = schemas
            .register::<Contributor>(register_contributor_schema)
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnregisteredPrincipal {
                entity: "Contributor",
                principal: "Source"
            }
        );
    }

    #[test]
    fn test_entity_registered_twice_is_rejected() {
        let mut schemas = ModelSchemas::default();
        schemas.register::<Source>(register_source_schema).unwrap();
        assert!(matches!(
            schemas.register::<Source>(register_source_schema),
            Err(SchemaError::DuplicateEntity { entity: "Source" })
        ));
    }
}
