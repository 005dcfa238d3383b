#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Server-side `$orderby` and `$skiptoken` processing for OData-style services.
//!
//! A request's `$orderby` text is compiled against the data source's metadata
//! into an [`InternalOrderByInfo`]: resolved property paths, per-clause and
//! composite comparators and a placeholder object shaped like the paths. A
//! `$skiptoken` is then parsed against that info into an
//! [`InternalSkipTokenInfo`], which locates the first entity of the next page
//! and renders the token for the page after that.
//!
//! ```rust,ignore
//! let orderby = OrderByParser::new(&metadata)
//!     .parse_order_by_clause(orders_set, order_type, "ShipName asc, Price, OrderID")?;
//! let token = SkipTokenParser::new()
//!     .parse_skip_token_clause(order_type, &orderby, "'Antonio+Moreno', 23.56D, 3456")?;
//! let start = token.index_of_first_entry_in_next_page(&sorted_orders)?;
//! ```
pub mod config;
pub mod entity;
pub mod errors;
pub mod limits;
pub mod metadata;
pub mod orderby;
pub mod pager;
pub mod path;
pub mod placeholder;
pub mod problem_mapping;
pub mod skiptoken;
pub mod value;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests;

pub use config::PagingConfig;
pub use entity::{Entity, ObjectNode, PropertyValue, Slot};
pub use limits::QueryLimits;
pub use metadata::{
    EdmType, Metadata, MetadataProvider, ResourceProperty, ResourcePropertyKind, ResourceSetWrapper,
    ResourceType,
};
pub use orderby::{
    EntityComparator, InternalOrderByInfo, OrderByInfo, OrderByParser, OrderByPathSegment,
};
pub use pager::{Page, Pager};
pub use path::PathSubSegment;
pub use skiptoken::{
    InternalSkipTokenInfo, Literal, LiteralValue, SkipTokenParser, first_entry_after,
    parse_literals,
};
pub use value::PrimitiveValue;

// Ordering primitives
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl SortDir {
    /// Apply the direction to an ascending comparison result.
    #[must_use]
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    }
}

impl std::fmt::Display for SortDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDir::Asc => f.write_str("asc"),
            SortDir::Desc => f.write_str("desc"),
        }
    }
}

/// Why a property cannot appear in an `$orderby` path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathViolation {
    Bag,
    Binary,
    ComplexTerminal,
    NavigationToMany,
    NavigationTerminal,
    PrimitiveNotTerminal,
    NotPrimitive,
}

impl std::fmt::Display for PathViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            PathViolation::Bag => "bag property not allowed in this clause",
            PathViolation::Binary => "binary property not allowed",
            PathViolation::ComplexTerminal => {
                "complex property cannot be used as terminal; drill into a primitive member"
            }
            PathViolation::NavigationToMany => {
                "navigation property pointing to a collection cannot be used"
            }
            PathViolation::NavigationTerminal => "navigation property cannot be used as terminal",
            PathViolation::PrimitiveNotTerminal => "primitive property cannot have sub-properties",
            PathViolation::NotPrimitive => "terminal property must be primitive",
        };
        f.write_str(msg)
    }
}

/// Stable category of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Syntax,
    Validation,
    Arity,
    TypeCompatibility,
    Internal,
}

/// Unified error type for `$orderby` and `$skiptoken` processing.
///
/// Everything except the internal-consistency variants is a bad request the
/// caller can fix by re-issuing a corrected query.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Bad Request - Error in the syntax of orderby: {0}")]
    OrderBySyntax(String),

    #[error("Bad Request - Error in the syntax of skiptoken: {0}")]
    SkipTokenSyntax(String),

    #[error("No property '{property}' exists in type '{type_name}'")]
    PropertyNotFound { property: String, type_name: String },

    #[error("The property '{property}' cannot be used here: {violation}")]
    InvalidPropertyUse {
        property: String,
        violation: PathViolation,
    },

    #[error(
        "The navigation property '{property}' cannot be used because its target resource set \
         '{resource_set}' is not visible; enable visibility of '{resource_set}' to use it"
    )]
    ResourceSetNotVisible {
        property: String,
        resource_set: String,
    },

    #[error(
        "The number of keys '{keys}' in skip token with value '{token}' did not match the number \
         of ordering constraints '{constraints}' for the resource type '{type_name}'"
    )]
    KeyCountMismatch {
        keys: usize,
        constraints: usize,
        token: String,
        type_name: String,
    },

    #[error(
        "The skip token value {literal} of type {literal_type} at position {position} is not \
         compatible with the type {expected} of the corresponding ordering constraint"
    )]
    IncompatibleLiteral {
        literal: String,
        literal_type: String,
        position: usize,
        expected: String,
    },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid page size {requested}: must be between 1 and {max}")]
    InvalidPageSize { requested: usize, max: usize },

    #[error("internal error: property '{property}' could not be reached while {context}")]
    UnreachableProperty {
        property: String,
        context: &'static str,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::OrderBySyntax(_) | Error::SkipTokenSyntax(_) => ErrorCategory::Syntax,
            Error::PropertyNotFound { .. }
            | Error::InvalidPropertyUse { .. }
            | Error::ResourceSetNotVisible { .. }
            | Error::LimitExceeded(_)
            | Error::InvalidPageSize { .. } => ErrorCategory::Validation,
            Error::KeyCountMismatch { .. } => ErrorCategory::Arity,
            Error::IncompatibleLiteral { .. } => ErrorCategory::TypeCompatibility,
            Error::UnreachableProperty { .. } | Error::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// `true` for every category except [`ErrorCategory::Internal`].
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.category() != ErrorCategory::Internal
    }

    pub(crate) fn invalid_use(property: &str, violation: PathViolation) -> Self {
        Error::InvalidPropertyUse {
            property: property.to_owned(),
            violation,
        }
    }
}
