//! Errors raised while setting up property types and schemas.

use thiserror::Error;

/// Configuration errors. All of them are fatal at setup time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    /// A type name was registered twice
    #[error("Property type '{0}' is already registered")]
    DuplicateType(String),

    /// A lookup named a type that was never registered
    #[error("Unknown property type: {0}")]
    UnknownType(String),

    /// A declared default does not have the shape its type expects
    #[error("Invalid default for property '{property}' of type '{type_name}': {value}")]
    InvalidDefault {
        property: String,
        type_name: String,
        value: String,
    },

    /// A schema declared the same property twice
    #[error("Property '{0}' is declared more than once")]
    DuplicateProperty(String),
}
