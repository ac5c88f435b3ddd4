use crate::catalog::PropertyType;
use crate::model::RowId;
use thiserror::Error;

/// Errors raised while constructing catalog definitions or binding values to them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Invalid definition: {0}")]
    Invalid(String),

    #[error("Property '{property}' expects a {expected} value, but found '{found}'")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: String,
    },

    #[error("Property '{0}' is not optional and must have a value")]
    MissingValue(String),

    #[error("Value '{value}' is not one of the valid values of property '{property}'")]
    NotAValidValue { property: String, value: String },

    #[error("Value '{value}' rejected for property '{property}': {message}")]
    Rejected {
        property: String,
        value: String,
        message: String,
    },

    #[error("Duplicate property '{property}' on '{owner}'")]
    DuplicateProperty { owner: String, property: String },

    #[error("Analytic '{analytic}' has no property named '{property}'")]
    UnknownProperty { analytic: String, property: String },
}

/// Errors raised by the metadata catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown analytic '{0}'")]
    UnknownAnalytic(String),

    #[error("Analytic '{0}' is defined more than once")]
    DuplicateAnalytic(String),

    #[error("Failed to parse catalog JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Errors raised when a `Row` or `Config` invariant would be violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Row {0} is already part of this config")]
    DuplicateRow(RowId),

    #[error("Row {0} is not part of this config")]
    RowNotFound(RowId),

    #[error("Index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Row holds at most {max} transformers, but {count} were given")]
    RowCapacityExceeded { max: usize, count: usize },

    #[error("Row transformer capacity must be positive")]
    ZeroCapacity,

    #[error("Failed to (de)serialize config JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Errors raised while reading the text configuration format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Configuration has no name: a non-empty '\\\\ Name:' line is required")]
    MissingName,

    #[error("Syntax error on line {line_number}: '{line}'")]
    MalformedLine { line_number: usize, line: String },

    #[error("Malformed property block '{block}' for analytic '{analytic}': {message}")]
    MalformedPropertyBlock {
        analytic: String,
        block: String,
        message: String,
    },

    #[error(
        "Value '{value}' of property '{property}' on analytic '{analytic}' must be of type {expected}"
    )]
    PropertyTypeMismatch {
        value: String,
        analytic: String,
        property: String,
        expected: PropertyType,
    },

    #[error("Analytic '{analytic}' has no property named '{property}'")]
    UnknownProperty { analytic: String, property: String },

    #[error("Invalid property on analytic '{analytic}': {source}")]
    InvalidProperty {
        analytic: String,
        source: DefinitionError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while writing the text configuration format.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    #[error("Transformer must have a name (row {row}, position {position})")]
    UnnamedTransformer { row: usize, position: usize },

    #[error("Value of the '{key}' marker must not contain line breaks")]
    MultilineMarker { key: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
