use std::sync::Arc;

use contracts::domain::common::AggregateRoot;
use sea_orm::DatabaseConnection;

use super::error::StorageError;
use crate::shared::schema::{EntitySchema, ModelSchemas};

/// Database connection paired with the schemas registered for it.
///
/// Cheap to clone; the schemas are shared read-only.
#[derive(Debug, Clone)]
pub struct StorageBroker {
    conn: DatabaseConnection,
    schemas: Arc<ModelSchemas>,
}

impl StorageBroker {
    pub fn new(conn: DatabaseConnection, schemas: Arc<ModelSchemas>) -> Self {
        Self { conn, schemas }
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub fn schemas(&self) -> &ModelSchemas {
        &self.schemas
    }

    pub fn schema_of<T: AggregateRoot>(&self) -> Result<&EntitySchema, StorageError> {
        self.schemas
            .of::<T>()
            .ok_or_else(|| StorageError::Unregistered(T::element_name().to_string()))
    }
}
