//! Conversion error types
//!
//! Every failure surfaces synchronously to the caller. Nothing is retried,
//! substituted with a default, or swallowed inside the conversion layer.

use thiserror::Error;

/// Errors produced while converting a markup string to a typed value
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A marker named a converter that is not in the table
    #[error("Unknown converter type: {0}")]
    UnknownConverter(String),

    /// A converter factory failed to construct its converter
    #[error("Failed to construct converter '{0}': {1}")]
    Construction(String, String),

    /// A converter ran and reported a failure
    #[error("Converter failed: {0}")]
    ConverterFailed(String),

    /// Malformed integer literal
    #[error("Invalid integer: {0}")]
    InvalidInteger(String),

    /// Malformed floating-point literal
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Boolean literal other than true/false
    #[error("Invalid boolean: {0}")]
    InvalidBoolean(String),

    /// Duration literal not in [-][d.]hh:mm[:ss[.fffffff]] form
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Date-time literal not in a recognized invariant format
    #[error("Invalid date-time: {0}")]
    InvalidDateTime(String),

    /// Name is not a member of the enumeration
    #[error("Unknown member '{0}' of enum {1}")]
    UnknownEnumMember(String, String),

    /// No conversion rule applies to the target type (strict mode only)
    #[error("No conversion available for target type: {0}")]
    UnsupportedTarget(String),

    /// Declared converter names left unresolved after linking
    #[error("Unresolved converter names: {0}")]
    UnresolvedConverters(String),
}

impl ConvertError {
    /// Failure reported from inside a custom converter
    pub fn custom(msg: impl Into<String>) -> Self {
        ConvertError::ConverterFailed(msg.into())
    }
}
