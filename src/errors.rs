//! Typed failure values for schema parsing, reference resolution, and
//! instance validation.

use thiserror::Error;

/// Every way a schema can fail to parse or an instance can fail to validate.
///
/// Strings carried here are for human display only; match on the variant to
/// act on a failure programmatically.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The parser could not lift a keyword out of the schema document.
    #[error("failed to extract field '{field}': {cause}")]
    Extract { field: String, cause: Box<Error> },

    /// A keyword was present with the wrong JSON shape.
    #[error("invalid value for field '{name}' (got {kind})")]
    InvalidFieldValue {
        name: String,
        kind: &'static str,
        message: Option<String>,
    },

    #[error("invalid value: expected array of string")]
    InvalidStringArray,

    #[error("invalid schema list")]
    InvalidSchemaList,

    #[error("'dependencies' entries must be an array of strings or a schema")]
    DependencyItemType,

    /// A `$ref` could not be followed to a schema.
    #[error("failed to resolve reference '{reference}': {message}")]
    InvalidReference { reference: String, message: String },

    /// The non-fragment part of a `$ref` named no known schema document.
    #[error("schema not found: '{id}'")]
    SchemaNotFound { id: String },

    #[error("invalid type")]
    InvalidType,

    #[error("invalid enum value")]
    InvalidEnum,

    #[error("invalid format")]
    InvalidFormat,

    #[error("invalid hostname")]
    InvalidHostname,

    #[error("invalid IPv4 address")]
    InvalidIpv4,

    #[error("invalid IPv6 address")]
    InvalidIpv6,

    #[error("required field '{name}' not found")]
    RequiredField { name: String },

    #[error("required minimum length not met: {observed} < {bound}")]
    MinLengthValidationFailed { observed: i64, bound: i64 },

    #[error("required maximum length not met: {observed} > {bound}")]
    MaxLengthValidationFailed { observed: i64, bound: i64 },

    #[error("required minimum item count not met: {observed} < {bound}")]
    MinItemsValidationFailed { observed: i64, bound: i64 },

    #[error("required maximum item count not met: {observed} > {bound}")]
    MaxItemsValidationFailed { observed: i64, bound: i64 },

    #[error("number of properties fewer than minimum number: {observed} < {bound}")]
    MinPropertiesValidationFailed { observed: i64, bound: i64 },

    #[error("number of properties exceeds maximum number: {observed} > {bound}")]
    MaxPropertiesValidationFailed { observed: i64, bound: i64 },

    #[error("value exceeds minimum: {observed} (minimum {bound}, exclusive {exclusive})")]
    MinimumValidationFailed {
        observed: f64,
        bound: f64,
        exclusive: bool,
    },

    #[error("value exceeds maximum: {observed} (maximum {bound}, exclusive {exclusive})")]
    MaximumValidationFailed {
        observed: f64,
        bound: f64,
        exclusive: bool,
    },

    #[error("pattern did not match: '{string}' does not match '{pattern}'")]
    PatternValidationFailed { string: String, pattern: String },

    #[error("'uniqueItems' validation failed")]
    UniqueItemsValidationFailed,

    #[error("'multipleOf' validation failed")]
    MultipleOfValidationFailed,

    #[error("additional properties are not allowed")]
    AdditionalProperties,

    #[error("'array' item validation failed")]
    ArrayItemValidationFailed,

    #[error("'allOf' validation failed")]
    AllOfValidationFailed,

    #[error("'anyOf' validation failed")]
    AnyOfValidationFailed,

    #[error("'oneOf' validation failed")]
    OneOfValidationFailed,

    #[error("'not' validation failed")]
    NotValidationFailed,
}

impl Error {
    /// Wrap a keyword-level failure so the caller can pinpoint the field.
    pub(crate) fn extract(field: &str, cause: Error) -> Error {
        Error::Extract {
            field: field.to_string(),
            cause: Box::new(cause),
        }
    }

    pub(crate) fn invalid_field(name: &str, kind: &'static str) -> Error {
        Error::InvalidFieldValue {
            name: name.to_string(),
            kind,
            message: None,
        }
    }

    pub(crate) fn invalid_field_msg(name: &str, kind: &'static str, message: &str) -> Error {
        Error::InvalidFieldValue {
            name: name.to_string(),
            kind,
            message: Some(message.to_string()),
        }
    }

    /// The keyword a parse failure points at, if this is a parse failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Extract { field, .. } => Some(field),
            _ => None,
        }
    }
}
