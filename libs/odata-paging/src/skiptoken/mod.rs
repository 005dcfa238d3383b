//! `$skiptoken` compilation and keyset continuation.
//!
//! A skip token is a positional list of literals, one per `$orderby` segment,
//! holding the sort key of the last entity of the previous page. It is only
//! meaningful together with the [`InternalOrderByInfo`] it was produced for.

use std::cmp::Ordering;
use std::sync::OnceLock;

use crate::Error;
use crate::config::PagingConfig;
use crate::entity::{Entity, ObjectNode};
use crate::limits::QueryLimits;
use crate::metadata::ResourceType;
use crate::orderby::InternalOrderByInfo;
use crate::placeholder::assign_leaf;

pub mod format;
mod literal;

pub use format::format_literal;
pub use literal::{Literal, LiteralValue, parse_literals};

/// Index of the first item that orders strictly after the key.
///
/// `compare_to_key` returns how an item orders against the key; `items` must
/// already be sorted by the same ordering. `None` means no such item.
pub fn first_entry_after<T>(
    items: &[T],
    mut compare_to_key: impl FnMut(&T) -> Ordering,
) -> Option<usize> {
    let idx = items.partition_point(|item| compare_to_key(item).is_le());
    (idx < items.len()).then_some(idx)
}

/// A skip token validated against one compiled `$orderby`.
#[derive(Debug)]
pub struct InternalSkipTokenInfo<'o> {
    literals: Vec<Literal>,
    order_by: &'o InternalOrderByInfo,
    key_object: OnceLock<Result<ObjectNode, Error>>,
}

impl<'o> InternalSkipTokenInfo<'o> {
    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    #[must_use]
    pub fn order_by_info(&self) -> &'o InternalOrderByInfo {
        self.order_by
    }

    /// Placeholder tree holding the token's values at the `$orderby` leaves.
    ///
    /// Built from the order-by dummy object on first use and cached.
    ///
    /// # Errors
    /// Returns `Error::UnreachableProperty` if an intermediate placeholder of
    /// the dummy object is gone.
    pub fn key_object(&self) -> Result<&ObjectNode, Error> {
        self.key_object
            .get_or_init(|| self.build_key_object())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build_key_object(&self) -> Result<ObjectNode, Error> {
        let mut key = self.order_by.dummy_object().clone();
        for (literal, segment) in self.literals.iter().zip(self.order_by.segments()) {
            assign_leaf(
                &mut key,
                segment.sub_segments(),
                literal.to_slot(segment.leaf_type()),
            )?;
        }
        Ok(key)
    }

    /// Index in `ordered` of the first entity of the next page, or `None`
    /// when every entity orders at or before the key.
    ///
    /// # Errors
    /// Propagates key-object construction failures.
    pub fn index_of_first_entry_in_next_page<E: Entity>(
        &self,
        ordered: &[E],
    ) -> Result<Option<usize>, Error> {
        let key = self.key_object()?;
        Ok(first_entry_after(ordered, |item| {
            self.order_by.compare(item, key)
        }))
    }

    /// Render the skip token that resumes after `last`.
    ///
    /// # Errors
    /// Returns `Error::UnreachableProperty` when an intermediate object on one
    /// of the paths cannot be reached on `last`.
    pub fn build_next_page_link(&self, last: &dyn Entity) -> Result<String, Error> {
        self.order_by.build_next_page_link(last)
    }
}

/// Parses `$skiptoken` text against a compiled `$orderby`.
#[derive(Debug, Clone, Default)]
pub struct SkipTokenParser {
    limits: QueryLimits,
}

impl SkipTokenParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &PagingConfig) -> Self {
        Self {
            limits: config.limits.clone(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Parse `token` and check it against the segments of `order_by`.
    ///
    /// # Errors
    /// Returns a syntax error for malformed literals, `Error::KeyCountMismatch`
    /// when the literal count differs from the segment count and
    /// `Error::IncompatibleLiteral` for the first literal whose type does not
    /// fit its segment's leaf.
    pub fn parse_skip_token_clause<'o>(
        &self,
        resource_type: &ResourceType,
        order_by: &'o InternalOrderByInfo,
        token: &str,
    ) -> Result<InternalSkipTokenInfo<'o>, Error> {
        self.limits.validate_skiptoken_length(token)?;
        let literals = parse_literals(token)?;

        let constraints = order_by.segments();
        if literals.len() != constraints.len() {
            return Err(Error::KeyCountMismatch {
                keys: literals.len(),
                constraints: constraints.len(),
                token: token.to_owned(),
                type_name: resource_type.name().to_owned(),
            });
        }

        for (literal, segment) in literals.iter().zip(constraints) {
            let Some(expected) = segment.leaf_type() else {
                continue;
            };
            if !literal.is_compatible_with(expected) {
                return Err(Error::IncompatibleLiteral {
                    literal: literal.text().to_owned(),
                    literal_type: literal.edm_type_name().to_owned(),
                    position: literal.position(),
                    expected: expected.to_string(),
                });
            }
        }

        tracing::debug!(literals = literals.len(), "skip token accepted");
        Ok(InternalSkipTokenInfo {
            literals,
            order_by,
            key_object: OnceLock::new(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_first_entry_after_fractional_key() {
        let items: Vec<i32> = (0..=7).collect();

        let idx = first_entry_after(&items, |x| f64::from(*x).total_cmp(&4.5));

        assert_eq!(idx, Some(5));
    }

    #[test]
    fn test_first_entry_after_bounds() {
        let items: Vec<i32> = (0..=7).collect();

        assert_eq!(first_entry_after(&items, |x| x.cmp(&8)), None);
        assert_eq!(first_entry_after(&items, |x| x.cmp(&7)), None);
        assert_eq!(first_entry_after(&items, |x| x.cmp(&-1)), Some(0));
        assert_eq!(first_entry_after(&items, |x| x.cmp(&3)), Some(4));
        assert_eq!(first_entry_after::<i32>(&[], |x| x.cmp(&0)), None);
    }
}
