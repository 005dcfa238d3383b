//! Property path resolution.
//!
//! A path such as `Customer/Address/StreetName` is walked hop by hop against
//! the metadata. Every hop except the last must be a navigation-to-one or a
//! complex property; the last must be a non-binary, non-bag primitive.

use std::sync::Arc;

use crate::metadata::{
    EdmType, MetadataProvider, ResourceProperty, ResourceSetWrapper, ResourceType,
};
use crate::{Error, PathViolation};

/// One hop of a resolved path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathSubSegment {
    name: String,
    property: Arc<ResourceProperty>,
    is_terminal: bool,
}

impl PathSubSegment {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn property(&self) -> &ResourceProperty {
        &self.property
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Primitive type of a terminal hop.
    #[must_use]
    pub fn edm_type(&self) -> Option<EdmType> {
        self.property.primitive_type()
    }
}

impl AsRef<str> for PathSubSegment {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

/// A path resolved against the metadata.
#[derive(Clone, Debug)]
pub struct ResolvedPath {
    pub sub_segments: Vec<PathSubSegment>,
    /// Navigation properties traversed, in path order.
    pub navigation: Vec<Arc<ResourceProperty>>,
}

fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Split a raw path on `/` (or `.`) and check every token is an identifier.
///
/// # Errors
/// Returns `Error::OrderBySyntax` for empty tokens, stray parentheses or other
/// non-identifier characters.
pub fn split_path(raw: &str) -> Result<Vec<&str>, Error> {
    raw.split(['/', '.'])
        .map(|token| {
            if token.is_empty() {
                Err(Error::OrderBySyntax(format!(
                    "empty property name in path '{raw}'"
                )))
            } else if token.contains(['(', ')']) {
                Err(Error::OrderBySyntax(format!(
                    "stray parenthesis in path '{raw}'"
                )))
            } else if is_identifier(token) {
                Ok(token)
            } else {
                Err(Error::OrderBySyntax(format!(
                    "'{token}' is not a valid property name"
                )))
            }
        })
        .collect()
}

fn lookup_type<'m>(
    metadata: &'m dyn MetadataProvider,
    property: &ResourceProperty,
) -> Result<&'m ResourceType, Error> {
    let name = property.target_type().unwrap_or_default();
    metadata.resource_type(name).ok_or_else(|| {
        Error::Internal(format!(
            "resource type '{name}' referenced by property '{}' is not registered",
            property.name()
        ))
    })
}

/// Resolve `names` starting at `resource_type`, which lives in `resource_set`.
///
/// # Errors
/// Returns `Error::PropertyNotFound` for unknown names,
/// `Error::InvalidPropertyUse` when a hop breaks a shape rule and
/// `Error::ResourceSetNotVisible` when a navigation target is hidden.
pub fn resolve<'m>(
    metadata: &'m dyn MetadataProvider,
    resource_set: &'m ResourceSetWrapper,
    resource_type: &'m ResourceType,
    names: &[&str],
) -> Result<ResolvedPath, Error> {
    let mut current_type = resource_type;
    let mut current_set = resource_set;
    let mut sub_segments = Vec::with_capacity(names.len());
    let mut navigation = Vec::new();

    for (idx, &name) in names.iter().enumerate() {
        let is_terminal = idx + 1 == names.len();
        let property = current_type
            .resolve_property(name)
            .ok_or_else(|| Error::PropertyNotFound {
                property: name.to_owned(),
                type_name: current_type.name().to_owned(),
            })?;

        if property.is_bag() {
            return Err(Error::invalid_use(name, PathViolation::Bag));
        }
        if property.is_binary() {
            return Err(Error::invalid_use(name, PathViolation::Binary));
        }
        if property.is_complex() && is_terminal {
            return Err(Error::invalid_use(name, PathViolation::ComplexTerminal));
        }
        if property.is_navigation_to_many() {
            return Err(Error::invalid_use(name, PathViolation::NavigationToMany));
        }

        if property.is_navigation_to_one() {
            if is_terminal {
                return Err(Error::invalid_use(name, PathViolation::NavigationTerminal));
            }
            let target_set = metadata
                .resource_set_for_navigation(current_set, &property)
                .filter(|set| set.is_visible())
                .ok_or_else(|| Error::ResourceSetNotVisible {
                    property: name.to_owned(),
                    resource_set: property.target_set().unwrap_or_default().to_owned(),
                })?;
            current_type = lookup_type(metadata, &property)?;
            current_set = target_set;
            navigation.push(Arc::clone(&property));
        } else if property.is_complex() {
            current_type = lookup_type(metadata, &property)?;
        } else if !property.is_primitive() {
            return Err(Error::invalid_use(name, PathViolation::NotPrimitive));
        } else if !is_terminal {
            return Err(Error::invalid_use(name, PathViolation::PrimitiveNotTerminal));
        }

        sub_segments.push(PathSubSegment {
            name: name.to_owned(),
            property,
            is_terminal,
        });
    }

    Ok(ResolvedPath {
        sub_segments,
        navigation,
    })
}

/// Split and resolve a raw path in one step.
///
/// # Errors
/// See [`split_path`] and [`resolve`].
pub fn resolve_path<'m>(
    metadata: &'m dyn MetadataProvider,
    resource_set: &'m ResourceSetWrapper,
    resource_type: &'m ResourceType,
    raw_path: &str,
) -> Result<ResolvedPath, Error> {
    let names = split_path(raw_path)?;
    resolve(metadata, resource_set, resource_type, &names)
}
