//! Metadata facade consumed by the path resolver.
//!
//! A data source describes itself through resource types (entity or complex),
//! their properties and the resource sets entities live in. The engine only
//! reads this model: it is built once by the host and shared by every request.
//!
//! The [`MetadataProvider`] trait is the seam. [`Metadata`] is a ready-made
//! in-memory provider built with `with_*` methods.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// Primitive types a terminal path property can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdmType {
    Binary,
    Boolean,
    Byte,
    DateTime,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
}

impl EdmType {
    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            EdmType::Byte | EdmType::SByte | EdmType::Int16 | EdmType::Int32 | EdmType::Int64
        )
    }

    /// Decimal, Double and Single.
    #[must_use]
    pub fn is_fractional(self) -> bool {
        matches!(self, EdmType::Decimal | EdmType::Double | EdmType::Single)
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdmType::Binary => "Edm.Binary",
            EdmType::Boolean => "Edm.Boolean",
            EdmType::Byte => "Edm.Byte",
            EdmType::DateTime => "Edm.DateTime",
            EdmType::Decimal => "Edm.Decimal",
            EdmType::Double => "Edm.Double",
            EdmType::Guid => "Edm.Guid",
            EdmType::Int16 => "Edm.Int16",
            EdmType::Int32 => "Edm.Int32",
            EdmType::Int64 => "Edm.Int64",
            EdmType::SByte => "Edm.SByte",
            EdmType::Single => "Edm.Single",
            EdmType::String => "Edm.String",
        };
        f.write_str(name)
    }
}

/// Combinable property kind flags, e.g. `PRIMITIVE | KEY`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourcePropertyKind(u16);

impl ResourcePropertyKind {
    pub const PRIMITIVE: Self = Self(1);
    pub const COMPLEX: Self = Self(1 << 1);
    pub const NAVIGATION_TO_ONE: Self = Self(1 << 2);
    pub const NAVIGATION_TO_MANY: Self = Self(1 << 3);
    pub const BAG: Self = Self(1 << 4);
    pub const BINARY: Self = Self(1 << 5);
    pub const KEY: Self = Self(1 << 6);
    pub const ETAG: Self = Self(1 << 7);

    const NAMES: [(Self, &'static str); 8] = [
        (Self::PRIMITIVE, "Primitive"),
        (Self::COMPLEX, "Complex"),
        (Self::NAVIGATION_TO_ONE, "NavigationToOne"),
        (Self::NAVIGATION_TO_MANY, "NavigationToMany"),
        (Self::BAG, "Bag"),
        (Self::BINARY, "Binary"),
        (Self::KEY, "Key"),
        (Self::ETAG, "ETag"),
    ];

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for ResourcePropertyKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Debug for ResourcePropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("(empty)")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// One property of a resource type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceProperty {
    name: String,
    kind: ResourcePropertyKind,
    primitive_type: Option<EdmType>,
    target_type: Option<String>,
    target_set: Option<String>,
}

impl ResourceProperty {
    fn new(name: impl Into<String>, kind: ResourcePropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            primitive_type: None,
            target_type: None,
            target_set: None,
        }
    }

    /// A primitive property. Binary primitives also carry the `BINARY` flag.
    #[must_use]
    pub fn primitive(name: impl Into<String>, edm_type: EdmType) -> Self {
        let mut kind = ResourcePropertyKind::PRIMITIVE;
        if edm_type == EdmType::Binary {
            kind = kind | ResourcePropertyKind::BINARY;
        }
        Self {
            primitive_type: Some(edm_type),
            ..Self::new(name, kind)
        }
    }

    /// A primitive key property.
    #[must_use]
    pub fn key(name: impl Into<String>, edm_type: EdmType) -> Self {
        let mut prop = Self::primitive(name, edm_type);
        prop.kind = prop.kind | ResourcePropertyKind::KEY;
        prop
    }

    #[must_use]
    pub fn complex(name: impl Into<String>, complex_type: impl Into<String>) -> Self {
        Self {
            target_type: Some(complex_type.into()),
            ..Self::new(name, ResourcePropertyKind::COMPLEX)
        }
    }

    /// A navigation property pointing to a single entity in `target_set`.
    #[must_use]
    pub fn navigation_to_one(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        target_set: impl Into<String>,
    ) -> Self {
        Self {
            target_type: Some(entity_type.into()),
            target_set: Some(target_set.into()),
            ..Self::new(name, ResourcePropertyKind::NAVIGATION_TO_ONE)
        }
    }

    /// A navigation property pointing to a collection of entities in `target_set`.
    #[must_use]
    pub fn navigation_to_many(
        name: impl Into<String>,
        entity_type: impl Into<String>,
        target_set: impl Into<String>,
    ) -> Self {
        Self {
            target_type: Some(entity_type.into()),
            target_set: Some(target_set.into()),
            ..Self::new(name, ResourcePropertyKind::NAVIGATION_TO_MANY)
        }
    }

    #[must_use]
    pub fn primitive_bag(name: impl Into<String>, edm_type: EdmType) -> Self {
        Self {
            primitive_type: Some(edm_type),
            ..Self::new(
                name,
                ResourcePropertyKind::PRIMITIVE | ResourcePropertyKind::BAG,
            )
        }
    }

    #[must_use]
    pub fn complex_bag(name: impl Into<String>, complex_type: impl Into<String>) -> Self {
        Self {
            target_type: Some(complex_type.into()),
            ..Self::new(name, ResourcePropertyKind::COMPLEX | ResourcePropertyKind::BAG)
        }
    }

    /// Mark the property as taking part in the entity's ETag.
    #[must_use]
    pub fn with_etag(mut self) -> Self {
        self.kind = self.kind | ResourcePropertyKind::ETAG;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ResourcePropertyKind {
        self.kind
    }

    #[must_use]
    pub fn is_kind_of(&self, kind: ResourcePropertyKind) -> bool {
        self.kind.contains(kind)
    }

    #[must_use]
    pub fn primitive_type(&self) -> Option<EdmType> {
        self.primitive_type
    }

    /// Complex type or entity type this property leads into.
    #[must_use]
    pub fn target_type(&self) -> Option<&str> {
        self.target_type.as_deref()
    }

    /// Resource set a navigation property points into.
    #[must_use]
    pub fn target_set(&self) -> Option<&str> {
        self.target_set.as_deref()
    }

    #[must_use]
    pub fn is_bag(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::BAG)
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::BINARY) || self.primitive_type == Some(EdmType::Binary)
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::COMPLEX)
    }

    #[must_use]
    pub fn is_navigation_to_one(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::NAVIGATION_TO_ONE)
    }

    #[must_use]
    pub fn is_navigation_to_many(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::NAVIGATION_TO_MANY)
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.is_kind_of(ResourcePropertyKind::PRIMITIVE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceTypeKind {
    Entity,
    Complex,
}

/// An entity or complex type.
#[derive(Clone, Debug)]
pub struct ResourceType {
    name: String,
    kind: ResourceTypeKind,
    properties: HashMap<String, Arc<ResourceProperty>>,
}

impl ResourceType {
    #[must_use]
    pub fn entity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceTypeKind::Entity,
            properties: HashMap::new(),
        }
    }

    #[must_use]
    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ResourceTypeKind::Complex,
            properties: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, property: ResourceProperty) -> Self {
        self.properties
            .insert(property.name.clone(), Arc::new(property));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ResourceTypeKind {
        self.kind
    }

    /// Look a property up by its exact (case-sensitive) name.
    #[must_use]
    pub fn resolve_property(&self, name: &str) -> Option<Arc<ResourceProperty>> {
        self.properties.get(name).cloned()
    }

    /// Key properties, ordered by name.
    #[must_use]
    pub fn key_properties(&self) -> Vec<Arc<ResourceProperty>> {
        let mut keys: Vec<_> = self
            .properties
            .values()
            .filter(|p| p.is_kind_of(ResourcePropertyKind::KEY))
            .cloned()
            .collect();
        keys.sort_by(|a, b| a.name().cmp(b.name()));
        keys
    }
}

/// A resource set together with its access configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSetWrapper {
    name: String,
    resource_type: String,
    visible: bool,
}

impl ResourceSetWrapper {
    #[must_use]
    pub fn new(name: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: resource_type.into(),
            visible: true,
        }
    }

    #[must_use]
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the entity type stored in this set.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Read-only view of a data source's type model.
pub trait MetadataProvider: Send + Sync {
    fn resource_type(&self, name: &str) -> Option<&ResourceType>;

    fn resource_set(&self, name: &str) -> Option<&ResourceSetWrapper>;

    /// Resource set reached by following `property` from `source`.
    ///
    /// The default uses the property's declared target set.
    fn resource_set_for_navigation(
        &self,
        source: &ResourceSetWrapper,
        property: &ResourceProperty,
    ) -> Option<&ResourceSetWrapper> {
        let _ = source;
        property.target_set().and_then(|name| self.resource_set(name))
    }
}

/// In-memory metadata provider.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Metadata {
    types: HashMap<String, ResourceType>,
    sets: HashMap<String, ResourceSetWrapper>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource_type(mut self, resource_type: ResourceType) -> Self {
        self.types
            .insert(resource_type.name.clone(), resource_type);
        self
    }

    pub fn with_resource_set(mut self, set: ResourceSetWrapper) -> Self {
        self.sets.insert(set.name.clone(), set);
        self
    }
}

impl MetadataProvider for Metadata {
    fn resource_type(&self, name: &str) -> Option<&ResourceType> {
        self.types.get(name)
    }

    fn resource_set(&self, name: &str) -> Option<&ResourceSetWrapper> {
        self.sets.get(name)
    }
}
