//! Fluent builder for slicing an in-memory result set into keyset pages.
//!
//! # Quick Start
//!
//! ```ignore
//! let orderby = OrderByParser::new(&metadata)
//!     .parse_order_by_clause(orders_set, order_type, "ShipName, OrderID")?;
//! let token = SkipTokenParser::new()
//!     .parse_skip_token_clause(order_type, &orderby, "'Speedy+Express', 10248")?;
//!
//! let page = Pager::new(&orderby)
//!     .skip_token(&token)
//!     .page_size(Some(50))
//!     .fetch(&mut orders)?;
//!
//! respond(page.items, page.next_skip_token);
//! ```
//!
//! The pager sorts the slice in place when the order-by requires internal
//! sorting, starts after the skip token's key and emits a skip token for the
//! next page only when entities remain after the current one.

use crate::Error;
use crate::entity::Entity;
use crate::limits::QueryLimits;
use crate::orderby::InternalOrderByInfo;
use crate::skiptoken::InternalSkipTokenInfo;

/// One page of entities.
#[derive(Debug, PartialEq)]
pub struct Page<'e, E> {
    pub items: &'e [E],
    /// Token for the page after this one; `None` on the last page.
    pub next_skip_token: Option<String>,
}

impl<E> Page<'_, E> {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_skip_token.is_some()
    }
}

/// Page builder over a compiled `$orderby` and an optional `$skiptoken`.
///
/// # Default Behavior
///
/// - No skip token: the page starts at the first entity
/// - Page size: `QueryLimits::default_page_size`, capped by `max_page_size`
#[must_use]
pub struct Pager<'a> {
    order_by: &'a InternalOrderByInfo,
    skip_token: Option<&'a InternalSkipTokenInfo<'a>>,
    page_size: Option<usize>,
    limits: QueryLimits,
}

impl<'a> Pager<'a> {
    pub fn new(order_by: &'a InternalOrderByInfo) -> Self {
        Self {
            order_by,
            skip_token: None,
            page_size: None,
            limits: QueryLimits::default(),
        }
    }

    /// Resume after the key held by `token`.
    pub fn skip_token(mut self, token: &'a InternalSkipTokenInfo<'a>) -> Self {
        self.skip_token = Some(token);
        self
    }

    /// Requested page size; `None` uses the configured default.
    pub fn page_size(mut self, size: Option<usize>) -> Self {
        self.page_size = size;
        self
    }

    pub fn limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Produce the page from `items`.
    ///
    /// # Errors
    /// Returns `Error::InvalidPageSize` for a rejected page size and
    /// propagates key-object and next-link failures.
    pub fn fetch<'e, E: Entity>(&self, items: &'e mut [E]) -> Result<Page<'e, E>, Error> {
        let size = self.limits.validate_page_size(self.page_size)?;
        if self.order_by.requires_internal_sorting() {
            self.order_by.sort(items);
        }
        let items: &'e [E] = items;

        let start = match self.skip_token {
            None => 0,
            Some(token) => token
                .index_of_first_entry_in_next_page(items)?
                .unwrap_or(items.len()),
        };
        let end = start.saturating_add(size).min(items.len());
        let page = &items[start..end];

        let next_skip_token = match page.last() {
            Some(last) if end < items.len() => Some(self.order_by.build_next_page_link(last)?),
            _ => None,
        };

        Ok(Page {
            items: page,
            next_skip_token,
        })
    }
}
