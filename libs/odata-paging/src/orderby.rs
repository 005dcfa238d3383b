//! `$orderby` compilation.
//!
//! A clause list such as `ShipName asc, Customer/CustomerName desc` is split,
//! each path is resolved against the metadata, duplicate paths are dropped and
//! one comparator per remaining segment is built, plus a composite comparator
//! that returns the first non-equal segment result.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::config::PagingConfig;
use crate::entity::{Entity, LeafLookup, ObjectNode, lookup_leaf};
use crate::limits::QueryLimits;
use crate::metadata::{
    EdmType, MetadataProvider, ResourceProperty, ResourceSetWrapper, ResourceType,
};
use crate::path::{self, PathSubSegment};
use crate::placeholder::ensure_path;
use crate::skiptoken::format::build_next_link;
use crate::{Error, SortDir};

/// Ordering function over two opaque entities.
pub type EntityComparator = Arc<dyn Fn(&dyn Entity, &dyn Entity) -> Ordering + Send + Sync>;

/// One compiled `path [asc|desc]` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderByPathSegment {
    direction: SortDir,
    sub_segments: Vec<PathSubSegment>,
}

impl OrderByPathSegment {
    #[must_use]
    pub fn direction(&self) -> SortDir {
        self.direction
    }

    #[must_use]
    pub fn sub_segments(&self) -> &[PathSubSegment] {
        &self.sub_segments
    }

    /// Property names from the root to the leaf.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sub_segments.iter().map(PathSubSegment::name)
    }

    /// Slash-joined path, e.g. `Customer/Address/StreetName`.
    #[must_use]
    pub fn path(&self) -> String {
        self.names().collect::<Vec<_>>().join("/")
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&PathSubSegment> {
        self.sub_segments.last()
    }

    #[must_use]
    pub fn leaf_type(&self) -> Option<EdmType> {
        self.leaf().and_then(PathSubSegment::edm_type)
    }
}

/// The public result of compiling an `$orderby` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderByInfo {
    segments: Vec<OrderByPathSegment>,
    navigation_properties_used: Option<Vec<Vec<Arc<ResourceProperty>>>>,
}

impl OrderByInfo {
    /// Segments in clause order.
    #[must_use]
    pub fn segments(&self) -> &[OrderByPathSegment] {
        &self.segments
    }

    /// Navigation properties traversed, one list per segment; `None` when no
    /// segment crosses a navigation property.
    #[must_use]
    pub fn navigation_properties_used(&self) -> Option<&[Vec<Arc<ResourceProperty>>]> {
        self.navigation_properties_used.as_deref()
    }
}

/// Everything compiled from one request's `$orderby`.
///
/// Built once by [`OrderByParser`] and immutable afterwards; a skip token is
/// parsed against it and borrows it for as long as the token lives.
pub struct InternalOrderByInfo {
    resource_type_name: String,
    order_by_info: OrderByInfo,
    sub_sorters: Vec<EntityComparator>,
    sorter: EntityComparator,
    dummy_object: ObjectNode,
    requires_internal_sorting: bool,
}

impl fmt::Debug for InternalOrderByInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalOrderByInfo")
            .field("resource_type_name", &self.resource_type_name)
            .field("order_by_info", &self.order_by_info)
            .field("dummy_object", &self.dummy_object)
            .field("requires_internal_sorting", &self.requires_internal_sorting)
            .finish_non_exhaustive()
    }
}

impl InternalOrderByInfo {
    #[must_use]
    pub fn order_by_info(&self) -> &OrderByInfo {
        &self.order_by_info
    }

    #[must_use]
    pub fn segments(&self) -> &[OrderByPathSegment] {
        self.order_by_info.segments()
    }

    #[must_use]
    pub fn navigation_properties_used(&self) -> Option<&[Vec<Arc<ResourceProperty>>]> {
        self.order_by_info.navigation_properties_used()
    }

    /// Composite comparator over all segments.
    #[must_use]
    pub fn sorter(&self) -> &EntityComparator {
        &self.sorter
    }

    /// One comparator per segment, in segment order.
    #[must_use]
    pub fn sub_sorters(&self) -> &[EntityComparator] {
        &self.sub_sorters
    }

    /// Placeholder tree with one object per distinct non-terminal path prefix.
    pub fn dummy_object(&self) -> &ObjectNode {
        &self.dummy_object
    }

    #[cfg(test)]
    pub(crate) fn dummy_object_mut(&mut self) -> &mut ObjectNode {
        &mut self.dummy_object
    }

    #[must_use]
    pub fn requires_internal_sorting(&self) -> bool {
        self.requires_internal_sorting
    }

    #[must_use]
    pub fn resource_type_name(&self) -> &str {
        &self.resource_type_name
    }

    /// Compare two entities with the composite comparator.
    #[must_use]
    pub fn compare(&self, a: &dyn Entity, b: &dyn Entity) -> Ordering {
        (self.sorter)(a, b)
    }

    /// Stable in-memory sort with the composite comparator.
    pub fn sort<E: Entity>(&self, items: &mut [E]) {
        items.sort_by(|a, b| self.compare(a, b));
    }

    /// Render the skip token that resumes after `last`.
    ///
    /// # Errors
    /// Returns `Error::UnreachableProperty` when an intermediate object on one
    /// of the paths cannot be reached on `last`.
    pub fn build_next_page_link(&self, last: &dyn Entity) -> Result<String, Error> {
        build_next_link(self.segments(), last)
    }
}

fn segment_comparator(segment: &OrderByPathSegment) -> EntityComparator {
    let names: Vec<String> = segment.names().map(str::to_owned).collect();
    let leaf_type = segment.leaf_type();
    let direction = segment.direction();

    // Unreachable paths sort like null ones: a comparator has no error channel.
    Arc::new(move |a: &dyn Entity, b: &dyn Entity| {
        let ordering = match (
            lookup_leaf(a, names.as_slice()),
            lookup_leaf(b, names.as_slice()),
        ) {
            (LeafLookup::Value(x), LeafLookup::Value(y)) => match leaf_type {
                Some(edm_type) => x.compare_as(&y, edm_type),
                None => x.compare(&y),
            },
            (LeafLookup::Value(_), _) => Ordering::Greater,
            (_, LeafLookup::Value(_)) => Ordering::Less,
            _ => Ordering::Equal,
        };
        direction.apply(ordering)
    })
}

fn composite_comparator(sub_sorters: &[EntityComparator]) -> EntityComparator {
    let sub_sorters = sub_sorters.to_vec();
    Arc::new(move |a: &dyn Entity, b: &dyn Entity| {
        sub_sorters
            .iter()
            .map(|cmp| cmp(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    })
}

fn syntax(msg: impl Into<String>) -> Error {
    Error::OrderBySyntax(msg.into())
}

/// Split clause text into `(path, direction)` pairs.
///
/// # Errors
/// Returns `Error::OrderBySyntax` for empty text, empty clauses (stray,
/// leading or trailing commas), unknown directions and repeated direction
/// tokens.
pub fn split_clauses(text: &str) -> Result<Vec<(&str, SortDir)>, Error> {
    if text.trim().is_empty() {
        return Err(syntax("expression expected"));
    }

    text.split(',')
        .map(|part| {
            let tokens: Vec<&str> = part.split_whitespace().collect();
            match tokens.as_slice() {
                [] => Err(syntax(
                    "empty clause; check for a leading, trailing or repeated comma",
                )),
                [path] | [path, "asc"] => Ok((*path, SortDir::Asc)),
                [path, "desc"] => Ok((*path, SortDir::Desc)),
                [_, dir] => Err(syntax(format!(
                    "'{dir}' is not a sort direction; expected 'asc' or 'desc'"
                ))),
                _ => Err(syntax(format!(
                    "multiple direction tokens in clause '{}'",
                    part.trim()
                ))),
            }
        })
        .collect()
}

/// Compiles `$orderby` text against a metadata provider.
pub struct OrderByParser<'m> {
    metadata: &'m dyn MetadataProvider,
    limits: QueryLimits,
    provider_handles_ordering: bool,
    key_tiebreaker: bool,
}

impl<'m> OrderByParser<'m> {
    #[must_use]
    pub fn new(metadata: &'m dyn MetadataProvider) -> Self {
        Self {
            metadata,
            limits: QueryLimits::default(),
            provider_handles_ordering: false,
            key_tiebreaker: false,
        }
    }

    #[must_use]
    pub fn from_config(metadata: &'m dyn MetadataProvider, config: &PagingConfig) -> Self {
        Self {
            metadata,
            limits: config.limits.clone(),
            provider_handles_ordering: config.provider_handles_ordering,
            key_tiebreaker: config.ensure_key_tiebreaker,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Declare that the data provider sorts results itself.
    #[must_use]
    pub fn provider_handles_ordering(mut self, handles: bool) -> Self {
        self.provider_handles_ordering = handles;
        self
    }

    /// Append each key property of the resource type, ascending, unless the
    /// clause already orders by it. Keeps the order total so skip tokens
    /// never land inside a run of equal rows.
    #[must_use]
    pub fn ensure_key_tiebreaker(mut self, enabled: bool) -> Self {
        self.key_tiebreaker = enabled;
        self
    }

    /// Compile `text` for entities of `resource_type` in `resource_set`.
    ///
    /// # Errors
    /// Any syntax, limit or path-shape violation aborts the whole clause.
    pub fn parse_order_by_clause(
        &self,
        resource_set: &ResourceSetWrapper,
        resource_type: &ResourceType,
        text: &str,
    ) -> Result<InternalOrderByInfo, Error> {
        self.limits.validate_orderby_length(text)?;
        let clauses = split_clauses(text)?;
        self.limits.validate_orderby_count(clauses.len())?;

        let mut segments: Vec<OrderByPathSegment> = Vec::with_capacity(clauses.len());
        let mut navigation = Vec::with_capacity(clauses.len());
        for (raw_path, direction) in clauses {
            let resolved =
                path::resolve_path(self.metadata, resource_set, resource_type, raw_path)?;
            let segment = OrderByPathSegment {
                direction,
                sub_segments: resolved.sub_segments,
            };

            if segments.iter().any(|seen| seen.names().eq(segment.names())) {
                tracing::debug!(path = %segment.path(), "duplicate orderby path dropped");
                continue;
            }
            segments.push(segment);
            navigation.push(resolved.navigation);
        }

        if self.key_tiebreaker {
            for key in resource_type.key_properties() {
                if segments.iter().any(|seen| seen.names().eq([key.name()])) {
                    continue;
                }
                let resolved =
                    path::resolve_path(self.metadata, resource_set, resource_type, key.name())?;
                tracing::debug!(key = key.name(), "key tiebreaker appended to orderby");
                segments.push(OrderByPathSegment {
                    direction: SortDir::Asc,
                    sub_segments: resolved.sub_segments,
                });
                navigation.push(resolved.navigation);
            }
        }

        let mut dummy_object = ObjectNode::new(resource_type.name());
        for segment in &segments {
            ensure_path(&mut dummy_object, segment.sub_segments());
        }

        let sub_sorters: Vec<EntityComparator> = segments.iter().map(segment_comparator).collect();
        let sorter = composite_comparator(&sub_sorters);
        let requires_internal_sorting = !self.provider_handles_ordering;
        let crosses_navigation = navigation.iter().any(|used| !used.is_empty());
        let navigation_properties_used = crosses_navigation.then_some(navigation);

        tracing::debug!(
            resource_set = resource_set.name(),
            segments = segments.len(),
            requires_internal_sorting,
            "compiled orderby clause"
        );

        Ok(InternalOrderByInfo {
            resource_type_name: resource_type.name().to_owned(),
            order_by_info: OrderByInfo {
                segments,
                navigation_properties_used,
            },
            sub_sorters,
            sorter,
            dummy_object,
            requires_internal_sorting,
        })
    }
}
