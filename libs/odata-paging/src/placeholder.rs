//! Placeholder trees shaped like resolved paths.
//!
//! The order-by compiler grows one dummy object per request with
//! [`ensure_path`]; the skip-token key object is a copy of that tree with leaf
//! values filled in by [`assign_leaf`].

use crate::Error;
use crate::entity::{ObjectNode, Slot};
use crate::path::PathSubSegment;

/// Make sure every non-terminal hop of `sub_segments` has an object slot.
///
/// Existing objects (shared prefixes of earlier paths) are reused unchanged.
pub fn ensure_path(root: &mut ObjectNode, sub_segments: &[PathSubSegment]) {
    let hops: Vec<&PathSubSegment> = sub_segments.iter().filter(|s| !s.is_terminal()).collect();
    ensure_hops(root, &hops);
}

fn ensure_hops(node: &mut ObjectNode, hops: &[&PathSubSegment]) {
    let Some((first, rest)) = hops.split_first() else {
        return;
    };
    let slot = node
        .slots_mut()
        .entry(first.name().to_owned())
        .or_insert_with(|| {
            Slot::Object(ObjectNode::new(
                first.property().target_type().unwrap_or_default(),
            ))
        });
    if let Slot::Object(child) = slot {
        ensure_hops(child, rest);
    }
}

/// Store `value` at the leaf of `sub_segments`, walking existing objects only.
///
/// # Errors
/// Returns `Error::UnreachableProperty` when an intermediate object is gone.
pub fn assign_leaf(
    root: &mut ObjectNode,
    sub_segments: &[PathSubSegment],
    value: Slot,
) -> Result<(), Error> {
    match sub_segments.split_first() {
        None => Ok(()),
        Some((leaf, [])) => {
            root.insert(leaf.name(), value);
            Ok(())
        }
        Some((hop, rest)) => match root.slots_mut().get_mut(hop.name()) {
            Some(Slot::Object(child)) => assign_leaf(child, rest, value),
            _ => {
                tracing::warn!(
                    property = hop.name(),
                    "placeholder object missing while building key object"
                );
                Err(Error::UnreachableProperty {
                    property: hop.name().to_owned(),
                    context: "building the skip token key object",
                })
            }
        },
    }
}
