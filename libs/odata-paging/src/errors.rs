//! Error catalog for `$orderby` / `$skiptoken` processing.
//!
//! One entry per [`ErrorCategory`]; `problem_mapping` stamps the occurrence
//! detail onto the entry.
use odata_errors::ErrDef;

use crate::ErrorCategory;

pub const SYNTAX: ErrDef = ErrDef::new(
    400,
    "Bad Request",
    "odata.paging.syntax",
    "urn:odata:paging:syntax",
);

pub const VALIDATION: ErrDef = ErrDef::new(
    400,
    "Invalid Query Option",
    "odata.paging.validation",
    "urn:odata:paging:validation",
);

pub const ARITY: ErrDef = ErrDef::new(
    400,
    "Skip Token Key Count Mismatch",
    "odata.paging.arity",
    "urn:odata:paging:arity",
);

pub const TYPE_COMPATIBILITY: ErrDef = ErrDef::new(
    400,
    "Skip Token Type Mismatch",
    "odata.paging.type_compatibility",
    "urn:odata:paging:type-compatibility",
);

pub const INTERNAL: ErrDef = ErrDef::new(
    500,
    "Internal Server Error",
    "odata.paging.internal",
    "urn:odata:paging:internal",
);

#[must_use]
pub fn for_category(category: ErrorCategory) -> &'static ErrDef {
    match category {
        ErrorCategory::Syntax => &SYNTAX,
        ErrorCategory::Validation => &VALIDATION,
        ErrorCategory::Arity => &ARITY,
        ErrorCategory::TypeCompatibility => &TYPE_COMPATIBILITY,
        ErrorCategory::Internal => &INTERNAL,
    }
}
