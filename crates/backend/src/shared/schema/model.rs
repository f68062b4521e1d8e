//! Registered storage schema: the immutable result of running a registrar
//! against an `EntityTypeBuilder`.

use contracts::shared::metadata::{FieldType, ValidationRules};
use sea_orm::sea_query::ForeignKeyAction;
use serde::Serialize;

/// What the storage engine does to dependent rows when a principal row is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteBehavior {
    /// Reject the delete while dependents exist; nothing is changed automatically
    NoAction,
    Restrict,
    Cascade,
    SetNull,
}

impl DeleteBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAction => "NoAction",
            Self::Restrict => "Restrict",
            Self::Cascade => "Cascade",
            Self::SetNull => "SetNull",
        }
    }

    /// Whether existing dependents make a principal delete fail
    pub fn blocks_delete(&self) -> bool {
        matches!(self, Self::NoAction | Self::Restrict)
    }

    pub fn to_foreign_key_action(self) -> ForeignKeyAction {
        match self {
            Self::NoAction => ForeignKeyAction::NoAction,
            Self::Restrict => ForeignKeyAction::Restrict,
            Self::Cascade => ForeignKeyAction::Cascade,
            Self::SetNull => ForeignKeyAction::SetNull,
        }
    }
}

impl std::fmt::Display for DeleteBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub primary_key: bool,
    pub rules: ValidationRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSchema {
    pub name: String,
    pub columns: Vec<&'static str>,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeySchema {
    pub name: String,
    /// Dependent column holding the reference
    pub column: &'static str,
    pub principal_entity: &'static str,
    pub principal_table: String,
    pub principal_column: &'static str,
    /// Collection name on the principal side (e.g. "contributors")
    pub navigation: Option<&'static str>,
    pub on_delete: DeleteBehavior,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: String,
    pub columns: Vec<ColumnSchema>,
    pub indexes: Vec<IndexSchema>,
    pub foreign_keys: Vec<ForeignKeySchema>,
}

impl EntitySchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKeySchema> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}
