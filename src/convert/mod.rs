//! Markup value conversion
//!
//! Control flow for one attribute value: discovery resolves a converter
//! marker, invocation runs the converter by capability, and only when no
//! converter applies does the built-in fallback take over.

pub mod builtin;
pub mod invoke;
pub mod registry;

use std::any::Any;

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::metadata::{MetadataSource, TypeDescriptor};
use crate::services::ServiceContext;

use builtin::convert_builtin;
use invoke::invoke;
use registry::{resolve_converter, ConverterRef, ConverterTable};

/// A type-erased converted value
pub type AnyValue = Box<dyn Any>;

/// One markup attribute conversion, immutable for the duration of the call
pub struct ConversionRequest<'a> {
    /// Raw attribute value; `None` converts to `None`
    pub raw: Option<&'a str>,
    /// Statically known target type
    pub target: &'a TypeDescriptor,
    /// Metadata for the member or parameter receiving the value
    pub source: MetadataSource<'a>,
    /// Ambient services for context-aware converters
    pub services: &'a ServiceContext,
}

/// Converts raw markup strings into typed values
pub struct ConversionEngine {
    table: ConverterTable,
    config: ConversionConfig,
}

impl ConversionEngine {
    pub fn new(table: ConverterTable) -> Self {
        Self::with_config(table, ConversionConfig::default())
    }

    pub fn with_config(table: ConverterTable, config: ConversionConfig) -> Self {
        Self { table, config }
    }

    /// The converter table, for registration after construction
    pub fn table_mut(&mut self) -> &mut ConverterTable {
        &mut self.table
    }

    /// Convert a raw attribute value into a value of the target type.
    ///
    /// A null input converts to null without consulting converters or the
    /// built-in rules. Once a converter capability has been invoked, its
    /// result is final, success or failure; the built-in fallback only runs
    /// when no converter applied at all.
    pub fn convert(&self, request: &ConversionRequest<'_>) -> Result<Option<AnyValue>, ConvertError> {
        let raw = match request.raw {
            Some(raw) => raw,
            None => return Ok(None),
        };

        if let Some(reference) =
            resolve_converter(request.target, request.source, &self.config.marker_aliases)
        {
            let factory = match reference {
                ConverterRef::Named(name) => match self.table.resolve(name) {
                    Some(factory) => factory.clone(),
                    None => return Err(ConvertError::UnknownConverter(name.to_string())),
                },
                ConverterRef::Factory(factory) => factory.clone(),
            };

            let converter = factory.create()?;
            if let Some(result) = invoke(converter.as_ref(), raw, request.services) {
                return result.map(Some);
            }
            // The instance exposes no capability; proceed as if no converter
            // had been found.
        }

        convert_builtin(raw, request.target, &self.table, self.config.strict_unsupported).map(Some)
    }
}
