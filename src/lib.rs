//! Markup type conversion for the Fennec UI toolkit
//!
//! When the markup loader meets an attribute value it has a raw string and
//! the statically known target type, nothing more. This crate turns that
//! string into a typed runtime value: converter markers declared on types,
//! members, and parameters select a converter from an explicit registration
//! table, and when no marker applies a fixed list of built-in string
//! conversions takes over.
//!
//! The pieces, in the order a request flows through them:
//! - [`metadata`] describes target types and the markers attached to them
//! - [`convert::registry`] resolves a marker to a converter factory
//! - [`convert::invoke`] runs a constructed converter by capability
//! - [`convert::builtin`] parses primitives when no converter applies
//!
//! Everything is request-scoped and read-only during conversion, so one
//! engine can serve concurrent loaders without coordination.

#[macro_use]
pub mod log;

pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod services;

pub use config::{ConfigError, ConversionConfig, MarkupConfig};
pub use convert::builtin::convert_builtin;
pub use convert::invoke::{
    converter_factory, invoke, ConvertFromStr, ConvertWithServices, Converter, ConverterFactory,
    InvariantStringConvert,
};
pub use convert::registry::{resolve_converter, ConverterRef, ConverterTable, ImplicitCast};
pub use convert::{AnyValue, ConversionEngine, ConversionRequest};
pub use error::ConvertError;
pub use metadata::{
    EnumDescriptor, Marker, MarkerArg, MemberDescriptor, MetadataSource, ParameterDescriptor,
    TypeDescriptor, TypeKind, VariantCtor, RECOGNIZED_MARKERS,
};
pub use services::ServiceContext;
