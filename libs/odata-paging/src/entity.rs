//! Entities as seen by comparators and next-link builders.
//!
//! The engine never knows the host's concrete entity types. It walks them
//! through [`Entity::property`], which reports one of four shapes per name.
//! [`ObjectNode`] is the engine's own tree of named slots: the order-by dummy
//! object and the skip-token key object are both `ObjectNode`s.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::value::PrimitiveValue;

/// What an entity holds under a property name.
#[derive(Debug)]
pub enum PropertyValue<'a> {
    /// The entity has no such slot at all (structurally unreachable).
    Missing,
    /// The slot exists and holds null.
    Absent,
    Primitive(Cow<'a, PrimitiveValue>),
    Object(&'a dyn Entity),
}

/// Opaque entity reference.
pub trait Entity {
    fn property(&self, name: &str) -> PropertyValue<'_>;
}

impl std::fmt::Debug for dyn Entity + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<entity>")
    }
}

/// Result of walking a property path on an entity.
#[derive(Debug)]
pub(crate) enum LeafLookup<'a, 'p> {
    Value(Cow<'a, PrimitiveValue>),
    /// Some hop, or the leaf itself, holds no value.
    Null,
    /// The named intermediate could not be reached.
    Unreachable(&'p str),
}

/// Walk `path` from `entity` down to its primitive leaf.
///
/// A missing leaf is an absent value; a missing intermediate is unreachable.
pub(crate) fn lookup_leaf<'a, 'p, S: AsRef<str>>(
    entity: &'a dyn Entity,
    path: &'p [S],
) -> LeafLookup<'a, 'p> {
    let mut current = entity;
    let last = path.len().saturating_sub(1);
    for (idx, name) in path.iter().enumerate() {
        let name = name.as_ref();
        let is_leaf = idx == last;
        match current.property(name) {
            PropertyValue::Absent => return LeafLookup::Null,
            PropertyValue::Missing if is_leaf => return LeafLookup::Null,
            PropertyValue::Primitive(value) if is_leaf => return LeafLookup::Value(value),
            PropertyValue::Object(child) if !is_leaf => current = child,
            PropertyValue::Missing | PropertyValue::Primitive(_) | PropertyValue::Object(_) => {
                return LeafLookup::Unreachable(name);
            }
        }
    }
    LeafLookup::Null
}

/// One named slot of an [`ObjectNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    Absent,
    Value(PrimitiveValue),
    Object(ObjectNode),
}

/// A tree of named slots shaped like a resource type.
#[derive(Clone, Debug, PartialEq, Default)]
#[must_use]
pub struct ObjectNode {
    type_name: String,
    slots: BTreeMap<String, Slot>,
}

impl ObjectNode {
    /// A zero-valued instance of `type_name`: every slot missing.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            slots: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<PrimitiveValue>) -> Self {
        self.slots.insert(name.into(), Slot::Value(value.into()));
        self
    }

    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.slots.insert(name.into(), Slot::Absent);
        self
    }

    pub fn with_object(mut self, name: impl Into<String>, node: ObjectNode) -> Self {
        self.slots.insert(name.into(), Slot::Object(node));
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ObjectNode> {
        match self.slots.get(name) {
            Some(Slot::Object(node)) => Some(node),
            _ => None,
        }
    }

    /// Primitive value stored directly under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&PrimitiveValue> {
        match self.slots.get(name) {
            Some(Slot::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Follow `path` through object slots and return the leaf slot.
    #[must_use]
    pub fn slot_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&Slot> {
        let (leaf, hops) = path.split_last()?;
        let mut node = self;
        for hop in hops {
            node = node.child(hop.as_ref())?;
        }
        node.slot(leaf.as_ref())
    }

    pub(crate) fn slots_mut(&mut self) -> &mut BTreeMap<String, Slot> {
        &mut self.slots
    }

    pub fn insert(&mut self, name: impl Into<String>, slot: Slot) -> Option<Slot> {
        self.slots.insert(name.into(), slot)
    }

    pub fn remove(&mut self, name: &str) -> Option<Slot> {
        self.slots.remove(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Entity for ObjectNode {
    fn property(&self, name: &str) -> PropertyValue<'_> {
        match self.slots.get(name) {
            None => PropertyValue::Missing,
            Some(Slot::Absent) => PropertyValue::Absent,
            Some(Slot::Value(value)) => PropertyValue::Primitive(Cow::Borrowed(value)),
            Some(Slot::Object(node)) => PropertyValue::Object(node),
        }
    }
}

impl Entity for Map<String, JsonValue> {
    fn property(&self, name: &str) -> PropertyValue<'_> {
        let primitive = |v: PrimitiveValue| PropertyValue::Primitive(Cow::Owned(v));
        match self.get(name) {
            None | Some(JsonValue::Array(_)) => PropertyValue::Missing,
            Some(JsonValue::Null) => PropertyValue::Absent,
            Some(JsonValue::Bool(b)) => primitive(PrimitiveValue::Boolean(*b)),
            Some(JsonValue::Number(n)) => n
                .as_i64()
                .map(PrimitiveValue::Int)
                .or_else(|| n.as_f64().map(PrimitiveValue::Double))
                .map_or(PropertyValue::Missing, primitive),
            Some(JsonValue::String(s)) => primitive(PrimitiveValue::String(s.clone())),
            Some(JsonValue::Object(map)) => PropertyValue::Object(map),
        }
    }
}

impl Entity for JsonValue {
    fn property(&self, name: &str) -> PropertyValue<'_> {
        match self {
            JsonValue::Object(map) => map.property(name),
            _ => PropertyValue::Missing,
        }
    }
}
