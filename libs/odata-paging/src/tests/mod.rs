mod orderby;

use std::cmp::Ordering;

use crate::Error;
use crate::entity::Entity;
use crate::metadata::{Metadata, MetadataProvider};
use crate::orderby::{InternalOrderByInfo, OrderByParser};

/// Compile `text` for the entity set named `set`.
fn compile(metadata: &Metadata, set: &str, text: &str) -> Result<InternalOrderByInfo, Error> {
    let set = metadata.resource_set(set).unwrap();
    let resource_type = metadata.resource_type(set.resource_type()).unwrap();
    OrderByParser::new(metadata).parse_order_by_clause(set, resource_type, text)
}

/// Run the `idx`-th segment comparator.
fn sub_compare(info: &InternalOrderByInfo, idx: usize, a: &dyn Entity, b: &dyn Entity) -> Ordering {
    (info.sub_sorters()[idx])(a, b)
}
