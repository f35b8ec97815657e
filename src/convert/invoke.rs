//! Converter capabilities and invocation
//!
//! A converter instance is built by its factory once per conversion attempt
//! and probed for capabilities in strict priority order: context-aware
//! first, then context-free, then the legacy named method. The probes are
//! declared on the [`Converter`] trait itself, so every strategy a converter
//! supports is visible in its impl block.

use std::sync::Arc;

use crate::convert::AnyValue;
use crate::error::ConvertError;
use crate::services::ServiceContext;

/// Context-aware conversion, for converters that need ambient lookups
/// (resource catalogs, asset resolvers)
pub trait ConvertWithServices {
    fn convert_with_services(
        &self,
        value: &str,
        services: &ServiceContext,
    ) -> Result<AnyValue, ConvertError>;
}

/// Context-free conversion from a raw string
pub trait ConvertFromStr {
    fn convert_from_str(&self, value: &str) -> Result<AnyValue, ConvertError>;
}

/// Legacy named-method convention
///
/// Converters that predate the capability traits exposed a single
/// `convert_from_invariant_string` method. The convention survives as an
/// explicitly declared capability rather than a structural probe.
pub trait InvariantStringConvert {
    fn convert_from_invariant_string(&self, value: &str) -> Result<AnyValue, ConvertError>;
}

/// A constructed converter instance
///
/// Implementations override the probe for each capability they support. A
/// converter may expose more than one; dispatch picks the highest-priority
/// capability present.
pub trait Converter {
    fn as_context_aware(&self) -> Option<&dyn ConvertWithServices> {
        None
    }

    fn as_context_free(&self) -> Option<&dyn ConvertFromStr> {
        None
    }

    fn as_legacy_named(&self) -> Option<&dyn InvariantStringConvert> {
        None
    }
}

/// Builds converter instances, one per conversion attempt
pub trait ConverterFactory: Send + Sync {
    /// Fully-qualified converter type name
    fn type_name(&self) -> &str;

    /// Construct a fresh converter. Failure here is fatal to the conversion.
    fn create(&self) -> Result<Box<dyn Converter>, ConvertError>;
}

struct FnFactory {
    name: String,
    ctor: fn() -> Result<Box<dyn Converter>, ConvertError>,
}

impl ConverterFactory for FnFactory {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn create(&self) -> Result<Box<dyn Converter>, ConvertError> {
        (self.ctor)()
    }
}

/// Wrap a plain constructor function as a shareable factory
pub fn converter_factory(
    name: impl Into<String>,
    ctor: fn() -> Result<Box<dyn Converter>, ConvertError>,
) -> Arc<dyn ConverterFactory> {
    Arc::new(FnFactory {
        name: name.into(),
        ctor,
    })
}

/// Invoke `converter` on `value`, dispatching by capability priority.
///
/// Returns `None` when the instance exposes no capability at all; the
/// caller then proceeds as if no converter had been found.
pub fn invoke(
    converter: &dyn Converter,
    value: &str,
    services: &ServiceContext,
) -> Option<Result<AnyValue, ConvertError>> {
    if let Some(capable) = converter.as_context_aware() {
        return Some(capable.convert_with_services(value, services));
    }
    if let Some(capable) = converter.as_context_free() {
        return Some(capable.convert_from_str(value));
    }
    if let Some(capable) = converter.as_legacy_named() {
        return Some(capable.convert_from_invariant_string(value));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Implements both string capabilities with distinguishable results
    struct DualConverter;

    impl ConvertWithServices for DualConverter {
        fn convert_with_services(
            &self,
            value: &str,
            _services: &ServiceContext,
        ) -> Result<AnyValue, ConvertError> {
            Ok(Box::new(format!("aware:{}", value)))
        }
    }

    impl ConvertFromStr for DualConverter {
        fn convert_from_str(&self, value: &str) -> Result<AnyValue, ConvertError> {
            Ok(Box::new(format!("free:{}", value)))
        }
    }

    impl Converter for DualConverter {
        fn as_context_aware(&self) -> Option<&dyn ConvertWithServices> {
            Some(self)
        }

        fn as_context_free(&self) -> Option<&dyn ConvertFromStr> {
            Some(self)
        }
    }

    struct LegacyOnly;

    impl InvariantStringConvert for LegacyOnly {
        fn convert_from_invariant_string(&self, value: &str) -> Result<AnyValue, ConvertError> {
            Ok(Box::new(format!("legacy:{}", value)))
        }
    }

    impl Converter for LegacyOnly {
        fn as_legacy_named(&self) -> Option<&dyn InvariantStringConvert> {
            Some(self)
        }
    }

    struct Inert;

    impl Converter for Inert {}

    fn invoked(converter: &dyn Converter, value: &str) -> Option<String> {
        let services = ServiceContext::new();
        invoke(converter, value, &services)
            .map(|result| *result.unwrap().downcast::<String>().unwrap())
    }

    #[test]
    fn test_context_aware_wins_over_context_free() {
        assert_eq!(invoked(&DualConverter, "x").as_deref(), Some("aware:x"));
    }

    #[test]
    fn test_legacy_named_method_is_last_resort() {
        assert_eq!(invoked(&LegacyOnly, "x").as_deref(), Some("legacy:x"));
    }

    #[test]
    fn test_no_capability_yields_none() {
        assert!(invoked(&Inert, "x").is_none());
    }

    #[test]
    fn test_factory_constructs_fresh_instances() {
        let factory = converter_factory("fennec.test.DualConverter", || Ok(Box::new(DualConverter)));
        assert_eq!(factory.type_name(), "fennec.test.DualConverter");
        assert!(factory.create().is_ok());
    }
}
