//! Converter table and marker discovery
//!
//! The table replaces runtime attribute scanning with explicit startup
//! registration: converter names map to factories, historical names map to
//! current ones, and markup passes may declare names before the matching
//! converters exist. `link` is the second resolution phase that checks
//! every declared name once registration is complete.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::convert::invoke::{converter_factory, Converter, ConverterFactory};
use crate::convert::AnyValue;
use crate::error::ConvertError;
use crate::metadata::{Marker, MarkerArg, MetadataSource, TypeDescriptor, RECOGNIZED_MARKERS};

/// Upper bound on alias chains, guards against alias cycles
const MAX_ALIAS_HOPS: usize = 8;

/// Implicit conversion from a raw string to a boxed target value
pub type ImplicitCast = Box<dyn Fn(&str) -> AnyValue + Send + Sync>;

/// Registration table mapping converter names to factories
#[derive(Default)]
pub struct ConverterTable {
    factories: HashMap<String, Arc<dyn ConverterFactory>>,
    aliases: HashMap<String, String>,
    declared: HashSet<String>,
    implicit: HashMap<TypeId, ImplicitCast>,
}

impl ConverterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter factory under its type name
    pub fn register(&mut self, factory: Arc<dyn ConverterFactory>) {
        self.factories.insert(factory.type_name().to_string(), factory);
    }

    /// Register a plain constructor function under `name`
    pub fn register_fn(
        &mut self,
        name: &str,
        ctor: fn() -> Result<Box<dyn Converter>, ConvertError>,
    ) {
        self.register(converter_factory(name, ctor));
    }

    /// Map a historical converter name onto the current one
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases.insert(alias.to_string(), canonical.to_string());
    }

    /// Record a converter name seen during a markup pass.
    ///
    /// The name does not need to be registered yet; forward references stay
    /// symbolic until [`ConverterTable::link`] runs.
    pub fn declare(&mut self, name: &str) {
        self.declared.insert(name.to_string());
    }

    /// Second resolution phase: verify every declared name now resolves.
    ///
    /// Reports all missing names at once rather than failing on the first.
    pub fn link(&mut self) -> Result<(), ConvertError> {
        let mut missing: Vec<String> = self
            .declared
            .iter()
            .filter(|name| self.resolve(name).is_none())
            .cloned()
            .collect();

        if missing.is_empty() {
            log!(
                "converter table linked, {} declared names resolved",
                self.declared.len()
            );
            self.declared.clear();
            Ok(())
        } else {
            missing.sort();
            let missing = missing.join(", ");
            log!("converter table link failed: {}", missing);
            Err(ConvertError::UnresolvedConverters(missing))
        }
    }

    /// Alias-chasing factory lookup
    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn ConverterFactory>> {
        let mut key = name;
        for _ in 0..MAX_ALIAS_HOPS {
            if let Some(factory) = self.factories.get(key) {
                return Some(factory);
            }
            match self.aliases.get(key) {
                Some(next) => key = next.as_str(),
                None => return None,
            }
        }
        None
    }

    /// Register an implicit conversion producing a `T` from a raw string
    pub fn register_implicit<T: Any>(&mut self, cast: fn(&str) -> T) {
        self.implicit
            .insert(TypeId::of::<T>(), Box::new(move |raw| Box::new(cast(raw))));
    }

    /// Implicit conversion whose result type matches `target`, if declared
    pub fn implicit_cast(&self, target: TypeId) -> Option<&ImplicitCast> {
        self.implicit.get(&target)
    }
}

impl fmt::Debug for ConverterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterTable")
            .field("factories", &self.factories.len())
            .field("aliases", &self.aliases.len())
            .field("declared", &self.declared.len())
            .field("implicit", &self.implicit.len())
            .finish()
    }
}

/// A converter reference discovered from markers
pub enum ConverterRef<'a> {
    /// Fully-qualified name, resolved through the table at conversion time
    Named(&'a str),
    /// Direct factory reference from the marker
    Factory(&'a Arc<dyn ConverterFactory>),
}

impl ConverterRef<'_> {
    /// The converter's fully-qualified name
    pub fn name(&self) -> &str {
        match self {
            ConverterRef::Named(name) => name,
            ConverterRef::Factory(factory) => factory.type_name(),
        }
    }
}

impl fmt::Debug for ConverterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConverterRef").field(&self.name()).finish()
    }
}

/// Resolve which converter applies for `target` given the request metadata.
///
/// Markers on the member or parameter take precedence; the target type's
/// own markers are only consulted when the source has none, or when the
/// source marker names an empty string.
pub fn resolve_converter<'a>(
    target: &'a TypeDescriptor,
    source: MetadataSource<'a>,
    extra_aliases: &[String],
) -> Option<ConverterRef<'a>> {
    if let Some(found) = find_marker(source.markers(), extra_aliases) {
        return Some(found);
    }
    find_marker(&target.markers, extra_aliases)
}

fn find_marker<'a>(markers: &'a [Marker], extra_aliases: &[String]) -> Option<ConverterRef<'a>> {
    for marker in markers {
        if !is_recognized(&marker.attribute, extra_aliases) {
            continue;
        }
        // First recognized marker decides for this level; an empty name
        // counts as no marker at all.
        return match &marker.arg {
            MarkerArg::TypeName(name) if name.is_empty() => None,
            MarkerArg::TypeName(name) => Some(ConverterRef::Named(name)),
            MarkerArg::Factory(factory) => Some(ConverterRef::Factory(factory)),
        };
    }
    None
}

fn is_recognized(attribute: &str, extra_aliases: &[String]) -> bool {
    RECOGNIZED_MARKERS.contains(&attribute) || extra_aliases.iter().any(|alias| alias == attribute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ParameterDescriptor;

    struct Inert;

    impl Converter for Inert {}

    fn inert() -> Result<Box<dyn Converter>, ConvertError> {
        Ok(Box::new(Inert))
    }

    #[test]
    fn test_register_and_resolve() {
        let mut table = ConverterTable::new();
        table.register_fn("fennec.ui.ColorConverter", inert);

        assert!(table.resolve("fennec.ui.ColorConverter").is_some());
        assert!(table.resolve("fennec.ui.Missing").is_none());
    }

    #[test]
    fn test_alias_chain_resolves() {
        let mut table = ConverterTable::new();
        table.register_fn("fennec.ui.ColorConverter", inert);
        table.register_alias("fennec.compat.ColourConverter", "fennec.legacy.ColorConverter");
        table.register_alias("fennec.legacy.ColorConverter", "fennec.ui.ColorConverter");

        let factory = table.resolve("fennec.compat.ColourConverter").unwrap();
        assert_eq!(factory.type_name(), "fennec.ui.ColorConverter");
    }

    #[test]
    fn test_alias_cycle_terminates() {
        let mut table = ConverterTable::new();
        table.register_alias("a", "b");
        table.register_alias("b", "a");
        assert!(table.resolve("a").is_none());
    }

    #[test]
    fn test_link_reports_missing_names() {
        let mut table = ConverterTable::new();
        table.declare("fennec.ui.ColorConverter");
        table.declare("fennec.ui.FontConverter");
        table.register_fn("fennec.ui.ColorConverter", inert);

        let err = table.link().unwrap_err();
        assert!(err.to_string().contains("fennec.ui.FontConverter"));

        // Forward reference satisfied after late registration
        table.register_fn("fennec.ui.FontConverter", inert);
        assert!(table.link().is_ok());
    }

    #[test]
    fn test_parameter_marker_beats_type_marker() {
        let target = TypeDescriptor::float64()
            .with_marker(Marker::named(RECOGNIZED_MARKERS[0], "fennec.ui.TypeLevel"));
        let parameter = ParameterDescriptor::new("width")
            .with_marker(Marker::named(RECOGNIZED_MARKERS[0], "fennec.ui.ParameterLevel"));

        let found = resolve_converter(&target, MetadataSource::Parameter(&parameter), &[]).unwrap();
        assert_eq!(found.name(), "fennec.ui.ParameterLevel");
    }

    #[test]
    fn test_empty_source_name_falls_back_to_type_marker() {
        let target = TypeDescriptor::float64()
            .with_marker(Marker::named(RECOGNIZED_MARKERS[0], "fennec.ui.TypeLevel"));
        let parameter = ParameterDescriptor::new("width")
            .with_marker(Marker::named(RECOGNIZED_MARKERS[0], ""));

        let found = resolve_converter(&target, MetadataSource::Parameter(&parameter), &[]).unwrap();
        assert_eq!(found.name(), "fennec.ui.TypeLevel");
    }

    #[test]
    fn test_unrecognized_attribute_is_ignored() {
        let target = TypeDescriptor::float64()
            .with_marker(Marker::named("fennec.unrelated.Note", "fennec.ui.NotAConverter"));
        assert!(resolve_converter(&target, MetadataSource::None, &[]).is_none());
    }

    #[test]
    fn test_configured_alias_is_recognized() {
        let target = TypeDescriptor::float64()
            .with_marker(Marker::named("fennec.compat.Converter", "fennec.ui.TypeLevel"));

        assert!(resolve_converter(&target, MetadataSource::None, &[]).is_none());

        let aliases = vec!["fennec.compat.Converter".to_string()];
        let found = resolve_converter(&target, MetadataSource::None, &aliases).unwrap();
        assert_eq!(found.name(), "fennec.ui.TypeLevel");
    }

    #[test]
    fn test_legacy_marker_name_is_recognized() {
        let target = TypeDescriptor::float64()
            .with_marker(Marker::named("fennec.ui.TypeConverter", "fennec.ui.TypeLevel"));
        assert!(resolve_converter(&target, MetadataSource::None, &[]).is_some());
    }

    #[test]
    fn test_factory_marker_carries_its_own_reference() {
        let factory = converter_factory("fennec.ui.ColorConverter", inert);
        let target =
            TypeDescriptor::float64().with_marker(Marker::factory(RECOGNIZED_MARKERS[0], factory));

        let found = resolve_converter(&target, MetadataSource::None, &[]).unwrap();
        assert!(matches!(found, ConverterRef::Factory(_)));
        assert_eq!(found.name(), "fennec.ui.ColorConverter");
    }

    #[test]
    fn test_implicit_cast_registration() {
        #[derive(Debug, PartialEq)]
        struct FontSize(f64);

        let mut table = ConverterTable::new();
        table.register_implicit::<FontSize>(|raw| FontSize(raw.parse().unwrap_or(0.0)));

        let cast = table.implicit_cast(TypeId::of::<FontSize>()).unwrap();
        let value = cast("12.5");
        assert_eq!(value.downcast_ref::<FontSize>(), Some(&FontSize(12.5)));
        assert!(table.implicit_cast(TypeId::of::<i32>()).is_none());
    }
}
