//! Schema-definition handle scoped to one aggregate.
//!
//! Registrars declare constraints through the fluent builders below; every
//! declaration is idempotent, so running a registrar twice leaves the
//! resulting `EntitySchema` unchanged. Contradicting declarations are
//! collected and reported by `build()`.

use contracts::domain::common::AggregateRoot;
use contracts::shared::metadata::{find_field, FieldMetadata, FieldType, ValidationRules};

use super::error::SchemaError;
use super::model::{ColumnSchema, DeleteBehavior, EntitySchema, ForeignKeySchema, IndexSchema};

#[derive(Debug, Clone, Default)]
struct PropertyDraft {
    required: Option<bool>,
    max_length: Option<usize>,
}

#[derive(Debug, Clone)]
struct IndexDraft {
    columns: Vec<&'static str>,
    unique: Option<bool>,
    name: Option<String>,
}

#[derive(Debug, Clone)]
struct RelationshipDraft {
    principal_entity: &'static str,
    principal_index: &'static str,
    principal_table: String,
    principal_key: &'static str,
    navigation: Option<&'static str>,
    foreign_key: Option<&'static str>,
    on_delete: Option<DeleteBehavior>,
}

pub struct EntityTypeBuilder {
    entity: &'static str,
    table: String,
    fields: &'static [FieldMetadata],
    properties: Vec<PropertyDraft>,
    indexes: Vec<IndexDraft>,
    relationships: Vec<RelationshipDraft>,
    errors: Vec<SchemaError>,
}

impl EntityTypeBuilder {
    pub fn for_aggregate<T: AggregateRoot>() -> Self {
        let fields = T::field_metadata();
        Self {
            entity: T::element_name(),
            table: T::table_name(),
            fields,
            properties: vec![PropertyDraft::default(); fields.len()],
            indexes: Vec::new(),
            relationships: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Configure a single column
    pub fn property(&mut self, name: &str) -> PropertyBuilder<'_> {
        let slot = self.fields.iter().position(|f| f.name == name);
        if slot.is_none() {
            self.record(SchemaError::UnknownProperty {
                entity: self.entity,
                property: name.to_string(),
            });
        }
        PropertyBuilder {
            builder: self,
            slot,
        }
    }

    /// Declare an index over the given columns, in order.
    ///
    /// Declaring the same column list again returns the existing index.
    pub fn has_index(&mut self, columns: &[&str]) -> IndexBuilder<'_> {
        if columns.is_empty() {
            self.record(SchemaError::EmptyIndex {
                entity: self.entity,
            });
        }

        let mut resolved = Vec::with_capacity(columns.len());
        for column in columns {
            match find_field(self.fields, column) {
                Some(field) => resolved.push(field.name),
                None => self.record(SchemaError::UnknownProperty {
                    entity: self.entity,
                    property: column.to_string(),
                }),
            }
        }

        let slot = match self.indexes.iter().position(|ix| ix.columns == resolved) {
            Some(slot) => slot,
            None => {
                self.indexes.push(IndexDraft {
                    columns: resolved,
                    unique: None,
                    name: None,
                });
                self.indexes.len() - 1
            }
        };
        IndexBuilder {
            builder: self,
            slot,
        }
    }

    /// Start a many-to-one relationship towards principal `P`
    pub fn has_one<P: AggregateRoot>(&mut self) -> RelationshipBuilder<'_> {
        let principal_key = P::field_metadata()
            .iter()
            .find(|f| f.is_key())
            .map(|f| f.name)
            .unwrap_or("id");
        self.relationships.push(RelationshipDraft {
            principal_entity: P::element_name(),
            principal_index: P::aggregate_index(),
            principal_table: P::table_name(),
            principal_key,
            navigation: None,
            foreign_key: None,
            on_delete: None,
        });
        let slot = self.relationships.len() - 1;
        RelationshipBuilder {
            builder: self,
            slot,
        }
    }

    fn record(&mut self, error: SchemaError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    fn conflict(
        &mut self,
        property: impl Into<String>,
        constraint: &'static str,
        first: impl ToString,
        second: impl ToString,
    ) {
        self.record(SchemaError::ConflictingConstraint {
            entity: self.entity,
            property: property.into(),
            constraint,
            first: first.to_string(),
            second: second.to_string(),
        });
    }

    /// Freeze the declarations into an `EntitySchema`.
    ///
    /// Columns are optional unless declared required; the primary key is
    /// always required. A relationship without an explicit delete behavior
    /// cascades when its column is required and nulls out otherwise.
    pub fn build(self) -> Result<EntitySchema, SchemaError> {
        let Self {
            entity,
            table,
            fields,
            properties,
            indexes,
            relationships,
            errors,
        } = self;

        if let Some(error) = errors.into_iter().next() {
            return Err(error);
        }

        let mut columns = Vec::with_capacity(fields.len());
        for (field, draft) in fields.iter().zip(&properties) {
            let required = if field.is_key() {
                if draft.required == Some(false) {
                    return Err(SchemaError::OptionalPrimaryKey {
                        entity,
                        property: field.name,
                    });
                }
                true
            } else {
                draft.required.unwrap_or(false)
            };

            columns.push(ColumnSchema {
                name: field.name,
                field_type: field.field_type,
                primary_key: field.is_key(),
                rules: ValidationRules {
                    required,
                    max_length: draft.max_length,
                },
            });
        }

        let indexes = indexes
            .into_iter()
            .map(|draft| IndexSchema {
                name: draft
                    .name
                    .unwrap_or_else(|| format!("ix_{}_{}", table, draft.columns.join("_"))),
                columns: draft.columns,
                unique: draft.unique.unwrap_or(false),
            })
            .collect();

        let mut foreign_keys = Vec::with_capacity(relationships.len());
        for relationship in relationships {
            let column = relationship
                .foreign_key
                .ok_or(SchemaError::MissingForeignKey {
                    entity,
                    principal: relationship.principal_entity,
                })?;

            let required = columns
                .iter()
                .find(|c: &&ColumnSchema| c.name == column)
                .map(|c| c.rules.required)
                .unwrap_or(false);

            let on_delete = relationship.on_delete.unwrap_or(if required {
                DeleteBehavior::Cascade
            } else {
                DeleteBehavior::SetNull
            });
            if on_delete == DeleteBehavior::SetNull && required {
                return Err(SchemaError::SetNullOnRequired {
                    entity,
                    property: column,
                });
            }

            foreign_keys.push(ForeignKeySchema {
                name: format!("fk_{}_{}", table, column),
                column,
                principal_entity: relationship.principal_entity,
                principal_table: relationship.principal_table,
                principal_column: relationship.principal_key,
                navigation: relationship.navigation,
                on_delete,
            });
        }

        Ok(EntitySchema {
            entity,
            table,
            columns,
            indexes,
            foreign_keys,
        })
    }
}

pub struct PropertyBuilder<'a> {
    builder: &'a mut EntityTypeBuilder,
    slot: Option<usize>,
}

impl PropertyBuilder<'_> {
    /// Bound the value length in characters. Text columns only.
    pub fn has_max_length(self, max: usize) -> Self {
        let Some(slot) = self.slot else {
            return self;
        };
        let builder = &mut *self.builder;
        let fields = builder.fields;
        let field = &fields[slot];

        if field.field_type != FieldType::Text {
            builder.record(SchemaError::LengthOnNonText {
                entity: builder.entity,
                property: field.name,
                field_type: field.field_type.as_str(),
            });
            return self;
        }

        match builder.properties[slot].max_length {
            Some(existing) if existing != max => {
                builder.conflict(field.name, "max length", existing, max)
            }
            _ => builder.properties[slot].max_length = Some(max),
        }
        self
    }

    pub fn is_required(self) -> Self {
        self.set_required(true)
    }

    /// Explicitly mark the column optional (`NULL` allowed)
    pub fn is_optional(self) -> Self {
        self.set_required(false)
    }

    fn set_required(self, required: bool) -> Self {
        let Some(slot) = self.slot else {
            return self;
        };
        let builder = &mut *self.builder;
        let fields = builder.fields;
        let field = &fields[slot];

        match builder.properties[slot].required {
            Some(existing) if existing != required => {
                builder.conflict(field.name, "required", existing, required)
            }
            _ => builder.properties[slot].required = Some(required),
        }
        self
    }
}

pub struct IndexBuilder<'a> {
    builder: &'a mut EntityTypeBuilder,
    slot: usize,
}

impl IndexBuilder<'_> {
    pub fn is_unique(self, unique: bool) -> Self {
        let builder = &mut *self.builder;
        match builder.indexes[self.slot].unique {
            Some(existing) if existing != unique => {
                let columns = builder.indexes[self.slot].columns.join(", ");
                builder.conflict(format!("({})", columns), "unique", existing, unique)
            }
            _ => builder.indexes[self.slot].unique = Some(unique),
        }
        self
    }

    pub fn has_name(self, name: &str) -> Self {
        let builder = &mut *self.builder;
        match builder.indexes[self.slot].name.clone() {
            Some(existing) if existing != name => {
                let columns = builder.indexes[self.slot].columns.join(", ");
                builder.conflict(format!("({})", columns), "index name", existing, name)
            }
            _ => builder.indexes[self.slot].name = Some(name.to_string()),
        }
        self
    }
}

pub struct RelationshipBuilder<'a> {
    builder: &'a mut EntityTypeBuilder,
    slot: usize,
}

impl RelationshipBuilder<'_> {
    /// Name the collection on the principal side
    pub fn with_many(self, navigation: &'static str) -> Self {
        let builder = &mut *self.builder;
        let draft = &mut builder.relationships[self.slot];
        match draft.navigation {
            Some(existing) if existing != navigation => {
                let principal = draft.principal_entity;
                builder.conflict(principal, "navigation", existing, navigation)
            }
            _ => draft.navigation = Some(navigation),
        }
        self
    }

    /// Bind the relationship to a dependent column.
    ///
    /// A relationship already declared over the same column and principal is
    /// reused, so repeated registration does not add a second foreign key.
    pub fn has_foreign_key(mut self, column: &str) -> Self {
        let builder = &mut *self.builder;
        let Some(field) = find_field(builder.fields, column) else {
            builder.record(SchemaError::UnknownProperty {
                entity: builder.entity,
                property: column.to_string(),
            });
            return self;
        };

        let principal = builder.relationships[self.slot].principal_entity;
        if field.referenced_aggregate() != Some(builder.relationships[self.slot].principal_index) {
            builder.record(SchemaError::InvalidForeignKey {
                entity: builder.entity,
                property: field.name.to_string(),
                principal,
            });
            return self;
        }

        let existing = builder
            .relationships
            .iter()
            .enumerate()
            .position(|(i, r)| {
                i != self.slot && r.principal_entity == principal && r.foreign_key == Some(field.name)
            });

        match existing {
            Some(existing) => {
                // has_one() always appends, so the pending draft is the last one
                let pending = builder.relationships.remove(self.slot);
                self.slot = existing;
                if let Some(navigation) = pending.navigation {
                    self = self.with_many(navigation);
                }
                if let Some(on_delete) = pending.on_delete {
                    self = self.on_delete(on_delete);
                }
            }
            None => match builder.relationships[self.slot].foreign_key {
                Some(existing) if existing != field.name => {
                    builder.conflict(principal, "foreign key", existing, field.name)
                }
                _ => builder.relationships[self.slot].foreign_key = Some(field.name),
            },
        }
        self
    }

    pub fn on_delete(self, behavior: DeleteBehavior) -> Self {
        let builder = &mut *self.builder;
        let draft = &mut builder.relationships[self.slot];
        match draft.on_delete {
            Some(existing) if existing != behavior => {
                let property = draft.foreign_key.unwrap_or(draft.principal_entity);
                builder.conflict(property, "delete behavior", existing, behavior)
            }
            _ => draft.on_delete = Some(behavior),
        }
        self
    }
}
