//! Rendering entity values back into skip-token literals.

use std::borrow::Cow;

use url::form_urlencoded::byte_serialize;

use crate::Error;
use crate::entity::{Entity, LeafLookup, lookup_leaf};
use crate::metadata::EdmType;
use crate::orderby::OrderByPathSegment;
use crate::value::{PrimitiveValue, format_datetime};

fn encode(text: &str) -> String {
    byte_serialize(text.as_bytes()).collect()
}

/// Render one leaf value as a literal the lexer reads back to the same value.
#[must_use]
pub fn format_literal(value: &PrimitiveValue, edm_type: Option<EdmType>) -> String {
    let value = edm_type
        .and_then(|t| value.coerce_to(t))
        .unwrap_or(Cow::Borrowed(value));

    match value.as_ref() {
        PrimitiveValue::Boolean(b) => b.to_string(),
        PrimitiveValue::Int(i) => i.to_string(),
        PrimitiveValue::Decimal(d) => format!("{d}D"),
        // NaN and infinities have no literal form.
        PrimitiveValue::Double(f) if !f.is_finite() => "null".to_owned(),
        PrimitiveValue::Double(f) => format!("{f}D"),
        PrimitiveValue::String(s) => format!("'{}'", encode(s)),
        PrimitiveValue::Guid(g) => format!("guid'{}'", encode(&g.hyphenated().to_string())),
        PrimitiveValue::DateTime(dt) => format!("datetime'{}'", encode(&format_datetime(dt))),
    }
}

/// Build the next-page skip token from the leaves of `segments` on `entity`.
pub(crate) fn build_next_link(
    segments: &[OrderByPathSegment],
    entity: &dyn Entity,
) -> Result<String, Error> {
    let parts = segments
        .iter()
        .map(|segment| match lookup_leaf(entity, segment.sub_segments()) {
            LeafLookup::Value(value) => Ok(format_literal(&value, segment.leaf_type())),
            LeafLookup::Null => Ok("null".to_owned()),
            LeafLookup::Unreachable(property) => {
                tracing::warn!(
                    property,
                    path = %segment.path(),
                    "entity property unreachable while building next page link"
                );
                Err(Error::UnreachableProperty {
                    property: property.to_owned(),
                    context: "building the next page link",
                })
            }
        })
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(parts.join(", "))
}
