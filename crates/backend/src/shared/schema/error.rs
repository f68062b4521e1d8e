use thiserror::Error;

/// Malformed schema declarations. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{entity}: unknown property '{property}'")]
    UnknownProperty {
        entity: &'static str,
        property: String,
    },

    #[error("{entity}.{property}: max length cannot be set on a {field_type} column")]
    LengthOnNonText {
        entity: &'static str,
        property: &'static str,
        field_type: &'static str,
    },

    #[error("{entity}.{property}: conflicting {constraint} declarations ({first} vs {second})")]
    ConflictingConstraint {
        entity: &'static str,
        property: String,
        constraint: &'static str,
        first: String,
        second: String,
    },

    #[error("{entity}: the primary key '{property}' cannot be optional")]
    OptionalPrimaryKey {
        entity: &'static str,
        property: &'static str,
    },

    #[error("{entity}: index declared without columns")]
    EmptyIndex { entity: &'static str },

    #[error("{entity}: relationship to {principal} has no foreign key")]
    MissingForeignKey {
        entity: &'static str,
        principal: &'static str,
    },

    #[error("{entity}.{property} cannot hold a reference to {principal}")]
    InvalidForeignKey {
        entity: &'static str,
        property: String,
        principal: &'static str,
    },

    #[error("{entity}.{property}: SetNull delete behavior on a required column")]
    SetNullOnRequired {
        entity: &'static str,
        property: &'static str,
    },

    #[error("{entity} is registered more than once")]
    DuplicateEntity { entity: &'static str },

    #[error("{entity} references {principal}, which is not registered before it")]
    UnregisteredPrincipal {
        entity: &'static str,
        principal: &'static str,
    },
}
