//! Storage schema: registration, validation and table creation
//!
//! Aggregates describe their persisted fields (`contracts::shared::metadata`);
//! registrars attach storage constraints to them through `EntityTypeBuilder`.

pub mod builder;
pub mod ddl;
pub mod error;
pub mod model;
pub mod registrar;
pub mod validator;

pub use builder::EntityTypeBuilder;
pub use error::SchemaError;
pub use model::{ColumnSchema, DeleteBehavior, EntitySchema, ForeignKeySchema, IndexSchema};
pub use registrar::{register_contributor_schema, register_source_schema, ModelSchemas};
