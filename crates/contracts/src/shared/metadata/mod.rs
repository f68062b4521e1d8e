//! Metadata types for describing aggregates
//!
//! Every aggregate exposes a static list of its persisted fields. The storage
//! layer attaches constraints to those fields when it registers the schema,
//! and validates records through the rules defined here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use contracts::shared::metadata::FieldMetadata;
//!
//! for field in Contributor::field_metadata() {
//!     println!("{}: {}", field.name, field.field_type.as_str());
//! }
//! ```

mod field_type;
mod types;
mod validation;

pub use field_type::FieldType;
pub use types::{find_field, FieldMetadata};
pub use validation::{parse_id, require, FieldViolation, ValidationRules, ViolationKind};

use std::borrow::Cow;

/// Read access to a record's raw field values by name.
///
/// `None` means the field is absent.
pub trait FieldValues {
    fn field_value(&self, field: &str) -> Option<Cow<'_, str>>;
}
