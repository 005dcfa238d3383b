//! Pure-data error types shared by the OData paging crates.
//!
//! - RFC 9457 Problem Details (`Problem`)
//! - Static catalog entries (`ErrDef`) that stamp out problems
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::Problem;
