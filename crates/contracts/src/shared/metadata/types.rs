//! Core metadata types for aggregates
//!
//! All types use 'static lifetimes for zero-cost compile-time constants.

use super::field_type::FieldType;

/// Metadata for a single field
/// Copy trait enabled for efficient passing by value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMetadata {
    pub name: &'static str,
    pub field_type: FieldType,
    pub ref_aggregate: Option<&'static str>,
}

impl FieldMetadata {
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::Key,
            ref_aggregate: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::Text,
            ref_aggregate: None,
        }
    }

    pub const fn reference(name: &'static str, aggregate_index: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::AggregateRef,
            ref_aggregate: Some(aggregate_index),
        }
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self {
            name,
            field_type: FieldType::Timestamp,
            ref_aggregate: None,
        }
    }

    pub fn is_key(&self) -> bool {
        self.field_type == FieldType::Key
    }

    /// Get referenced aggregate index (for AggregateRef)
    pub fn referenced_aggregate(&self) -> Option<&'static str> {
        self.ref_aggregate
    }
}

/// Lookup a field by name in a static field list
pub fn find_field(fields: &'static [FieldMetadata], name: &str) -> Option<&'static FieldMetadata> {
    fields.iter().find(|f| f.name == name)
}
