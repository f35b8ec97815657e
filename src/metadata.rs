//! Target-type and converter-marker metadata
//!
//! The markup loader hands these descriptors to the conversion engine. A
//! descriptor carries the statically known shape of a target type plus the
//! converter markers declared on the type itself, on the member being
//! assigned, or on the constructor parameter being filled. Markers are
//! attached through an explicit builder API at registration time; there is
//! no runtime attribute scanning.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::convert::invoke::ConverterFactory;
use crate::convert::AnyValue;
use crate::error::ConvertError;

/// Marker attribute names recognized by converter discovery.
///
/// Both the current name and the pre-1.0 name are accepted so metadata
/// generated by older tooling keeps resolving.
pub const RECOGNIZED_MARKERS: &[&str] = &["fennec.markup.ValueConverter", "fennec.ui.TypeConverter"];

/// A converter marker declared on a type, member, or parameter
#[derive(Clone, Debug)]
pub struct Marker {
    /// Full name of the declaring marker attribute, matched against
    /// [`RECOGNIZED_MARKERS`] (plus any configured aliases)
    pub attribute: String,
    /// The converter the marker points at
    pub arg: MarkerArg,
}

/// How a marker identifies its converter
#[derive(Clone)]
pub enum MarkerArg {
    /// Fully-qualified converter name. May be declared before the converter
    /// is registered; the name stays symbolic until the table is linked.
    TypeName(String),
    /// Direct reference to a converter factory
    Factory(Arc<dyn ConverterFactory>),
}

impl fmt::Debug for MarkerArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerArg::TypeName(name) => f.debug_tuple("TypeName").field(name).finish(),
            MarkerArg::Factory(factory) => f.debug_tuple("Factory").field(&factory.type_name()).finish(),
        }
    }
}

impl Marker {
    /// Marker naming its converter by fully-qualified name
    pub fn named(attribute: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            arg: MarkerArg::TypeName(type_name.into()),
        }
    }

    /// Marker holding a direct converter factory reference
    pub fn factory(attribute: impl Into<String>, factory: Arc<dyn ConverterFactory>) -> Self {
        Self {
            attribute: attribute.into(),
            arg: MarkerArg::Factory(factory),
        }
    }
}

/// Constructor for one enum variant's boxed value
pub type VariantCtor = fn() -> AnyValue;

/// Explicit variant table for an enumeration target type
#[derive(Clone, Debug)]
pub struct EnumDescriptor {
    variants: Vec<(&'static str, VariantCtor)>,
}

impl EnumDescriptor {
    pub fn new(variants: &[(&'static str, VariantCtor)]) -> Self {
        Self {
            variants: variants.to_vec(),
        }
    }

    /// Case-sensitive member-name lookup. Unknown names fail.
    pub fn parse(&self, name: &str, enum_name: &str) -> Result<AnyValue, ConvertError> {
        for (variant, ctor) in &self.variants {
            if *variant == name {
                return Ok(ctor());
            }
        }
        Err(ConvertError::UnknownEnumMember(
            name.to_string(),
            enum_name.to_string(),
        ))
    }
}

/// Shape of a conversion target, drives the built-in fallback rules
#[derive(Clone, Debug)]
pub enum TypeKind {
    Int32,
    Float32,
    Float64,
    Bool,
    Str,
    Duration,
    DateTime,
    Enum(EnumDescriptor),
    /// Optional wrapper; a non-null input converts to the underlying type
    Nullable(Box<TypeDescriptor>),
    /// No built-in rule; resolved via implicit casts or passthrough
    Other,
}

/// The statically-known target type of an attribute value
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    /// Fully-qualified type name, used in diagnostics
    pub name: String,
    /// Runtime identity of the target type
    pub id: TypeId,
    pub kind: TypeKind,
    /// Converter markers declared on the type itself
    pub markers: Vec<Marker>,
}

impl TypeDescriptor {
    fn of<T: 'static>(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            id: TypeId::of::<T>(),
            kind,
            markers: Vec::new(),
        }
    }

    pub fn int32() -> Self {
        Self::of::<i32>("i32", TypeKind::Int32)
    }

    pub fn float32() -> Self {
        Self::of::<f32>("f32", TypeKind::Float32)
    }

    pub fn float64() -> Self {
        Self::of::<f64>("f64", TypeKind::Float64)
    }

    pub fn boolean() -> Self {
        Self::of::<bool>("bool", TypeKind::Bool)
    }

    pub fn string() -> Self {
        Self::of::<String>("String", TypeKind::Str)
    }

    pub fn duration() -> Self {
        Self::of::<chrono::Duration>("Duration", TypeKind::Duration)
    }

    pub fn date_time() -> Self {
        Self::of::<chrono::NaiveDateTime>("DateTime", TypeKind::DateTime)
    }

    /// Enumeration target with an explicit variant table
    pub fn enumeration<T: 'static>(name: impl Into<String>, variants: EnumDescriptor) -> Self {
        Self::of::<T>(name, TypeKind::Enum(variants))
    }

    /// Optional wrapper around `inner`. `T` is the full wrapper type,
    /// e.g. `Option<i32>`.
    pub fn nullable<T: 'static>(inner: TypeDescriptor) -> Self {
        let name = format!("Option<{}>", inner.name);
        Self::of::<T>(name, TypeKind::Nullable(Box::new(inner)))
    }

    /// Target with no built-in conversion rule
    pub fn other<T: 'static>(name: impl Into<String>) -> Self {
        Self::of::<T>(name, TypeKind::Other)
    }

    /// Attach a converter marker to the type
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// Metadata for the member (property/field) a value is assigned to
#[derive(Clone, Debug, Default)]
pub struct MemberDescriptor {
    pub name: String,
    pub markers: Vec<Marker>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// Metadata for the constructor parameter a value is bound to
#[derive(Clone, Debug, Default)]
pub struct ParameterDescriptor {
    pub name: String,
    pub markers: Vec<Marker>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            markers: Vec::new(),
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// Where a conversion request's member/parameter metadata comes from
#[derive(Clone, Copy, Debug, Default)]
pub enum MetadataSource<'a> {
    #[default]
    None,
    Member(&'a MemberDescriptor),
    Parameter(&'a ParameterDescriptor),
}

impl<'a> MetadataSource<'a> {
    /// Markers declared on the member or parameter, if any
    pub fn markers(self) -> &'a [Marker] {
        match self {
            MetadataSource::None => &[],
            MetadataSource::Member(member) => &member.markers,
            MetadataSource::Parameter(parameter) => &parameter.markers,
        }
    }
}
