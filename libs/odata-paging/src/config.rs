use serde::{Deserialize, Serialize};

use crate::limits::QueryLimits;

/// Host-provided paging settings, usually deserialized from the host's
/// own configuration tree.
///
/// ```yaml
/// provider_handles_ordering: false
/// ensure_key_tiebreaker: true
/// limits:
///   max_orderby_fields: 5
///   max_page_size: 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagingConfig {
    /// The data provider sorts results itself, so the library never needs to.
    pub provider_handles_ordering: bool,
    /// Append the entity key to every clause so pages never split tied rows.
    pub ensure_key_tiebreaker: bool,
    pub limits: QueryLimits,
}
