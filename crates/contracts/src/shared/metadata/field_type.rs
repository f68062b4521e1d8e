//! Field type enumeration for metadata system

use serde::Serialize;

/// Storage category of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Key,          // Primary key, UUID stored as text
    #[default]
    Text,         // String / Option<String>
    AggregateRef, // Reference to another aggregate by ID
    Timestamp,    // DateTime<Utc>
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Text => "text",
            Self::AggregateRef => "aggregate_ref",
            Self::Timestamp => "timestamp",
        }
    }

    /// Fields whose values come from the caller and pass through validation
    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Text | Self::AggregateRef)
    }
}
