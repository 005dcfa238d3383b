//! Typed primitive values held by entities, placeholder trees and skip tokens.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDateTime};
use uuid::Uuid;

use crate::metadata::EdmType;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse the `datetime'...'` body: ISO 8601 without offset, a trailing `Z`,
/// or a full RFC 3339 timestamp (normalized to UTC).
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.strip_suffix('Z').unwrap_or(raw);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Canonical text form used in next-page links.
pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Numeric order, so `-0.0 == 0.0`; NaN falls back to the IEEE total order.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

/// A single typed value at the end of a property path.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    Int(i64),
    Decimal(BigDecimal),
    Double(f64),
    String(String),
    Guid(Uuid),
    DateTime(NaiveDateTime),
}

impl PrimitiveValue {
    fn rank(&self) -> u8 {
        match self {
            PrimitiveValue::Boolean(_) => 0,
            PrimitiveValue::Int(_) | PrimitiveValue::Decimal(_) | PrimitiveValue::Double(_) => 1,
            PrimitiveValue::String(_) => 2,
            PrimitiveValue::Guid(_) => 3,
            PrimitiveValue::DateTime(_) => 4,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn as_f64(&self) -> Option<f64> {
        match self {
            PrimitiveValue::Int(i) => Some(*i as f64),
            PrimitiveValue::Decimal(d) => d.to_f64(),
            PrimitiveValue::Double(f) => Some(*f),
            _ => None,
        }
    }

    fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            PrimitiveValue::Int(i) => Some(BigDecimal::from(*i)),
            PrimitiveValue::Decimal(d) => Some(d.clone()),
            PrimitiveValue::Double(f) if f.is_finite() => BigDecimal::from_str(&f.to_string()).ok(),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            PrimitiveValue::Int(i) => Some(*i),
            PrimitiveValue::Decimal(d) if d.is_integer() => d.to_i64(),
            #[allow(clippy::cast_possible_truncation)]
            PrimitiveValue::Double(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(*f as i64),
            _ => None,
        }
    }

    /// Convert into the representation used for `edm_type`, if possible.
    ///
    /// Integers widen to decimals and doubles, strings parse into GUIDs,
    /// dates, numbers and booleans.
    #[must_use]
    pub fn coerce_to(&self, edm_type: EdmType) -> Option<Cow<'_, PrimitiveValue>> {
        use PrimitiveValue as V;

        let owned = match (edm_type, self) {
            (EdmType::Boolean, V::Boolean(_))
            | (EdmType::String, V::String(_))
            | (EdmType::Guid, V::Guid(_))
            | (EdmType::DateTime, V::DateTime(_))
            | (EdmType::Decimal, V::Decimal(_))
            | (EdmType::Double | EdmType::Single, V::Double(_)) => return Some(Cow::Borrowed(self)),
            (t, V::Int(_)) if t.is_integral() => return Some(Cow::Borrowed(self)),

            (EdmType::Boolean, V::String(s)) => V::Boolean(s.parse().ok()?),
            (EdmType::Guid, V::String(s)) => V::Guid(Uuid::parse_str(s).ok()?),
            (EdmType::DateTime, V::String(s)) => V::DateTime(parse_datetime(s)?),
            (t, V::String(s)) if t.is_integral() => V::Int(s.parse().ok()?),
            (EdmType::Decimal, V::String(s)) => V::Decimal(BigDecimal::from_str(s).ok()?),
            (EdmType::Double | EdmType::Single, V::String(s)) => V::Double(s.parse().ok()?),

            (t, v) if t.is_integral() => V::Int(v.as_i64()?),
            (EdmType::Decimal, v) => V::Decimal(v.as_decimal()?),
            (EdmType::Double | EdmType::Single, v) => V::Double(v.as_f64()?),
            _ => return None,
        };
        Some(Cow::Owned(owned))
    }

    /// Total order over values; numbers compare across representations,
    /// unrelated kinds order by a fixed kind rank.
    #[must_use]
    pub fn compare(&self, other: &PrimitiveValue) -> Ordering {
        use PrimitiveValue as V;

        match (self, other) {
            (V::Boolean(a), V::Boolean(b)) => a.cmp(b),
            (V::Int(a), V::Int(b)) => a.cmp(b),
            (V::Decimal(a), V::Decimal(b)) => a.cmp(b),
            (V::Double(a), V::Double(b)) => compare_f64(*a, *b),
            (V::String(a), V::String(b)) => a.cmp(b),
            (V::Guid(a), V::Guid(b)) => a.cmp(b),
            (V::DateTime(a), V::DateTime(b)) => a.cmp(b),
            (V::Double(_), _) | (_, V::Double(_)) if self.rank() == other.rank() => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => compare_f64(a, b),
                    _ => Ordering::Equal,
                }
            }
            (a, b) if a.rank() == 1 && b.rank() == 1 => match (a.as_decimal(), b.as_decimal()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => Ordering::Equal,
            },
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    /// Compare two leaf values as values of `edm_type`.
    #[must_use]
    pub fn compare_as(&self, other: &PrimitiveValue, edm_type: EdmType) -> Ordering {
        match (self.coerce_to(edm_type), other.coerce_to(edm_type)) {
            (Some(a), Some(b)) => a.compare(&b),
            _ => self.compare(other),
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Boolean(b) => write!(f, "{b}"),
            PrimitiveValue::Int(i) => write!(f, "{i}"),
            PrimitiveValue::Decimal(d) => write!(f, "{d}"),
            PrimitiveValue::Double(d) => write!(f, "{d}"),
            PrimitiveValue::String(s) => f.write_str(s),
            PrimitiveValue::Guid(g) => write!(f, "{}", g.hyphenated()),
            PrimitiveValue::DateTime(dt) => f.write_str(&format_datetime(dt)),
        }
    }
}

impl From<bool> for PrimitiveValue {
    fn from(v: bool) -> Self {
        PrimitiveValue::Boolean(v)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        PrimitiveValue::Int(v.into())
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        PrimitiveValue::Int(v)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(v: f64) -> Self {
        PrimitiveValue::Double(v)
    }
}

impl From<BigDecimal> for PrimitiveValue {
    fn from(v: BigDecimal) -> Self {
        PrimitiveValue::Decimal(v)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        PrimitiveValue::String(v.to_owned())
    }
}

impl From<String> for PrimitiveValue {
    fn from(v: String) -> Self {
        PrimitiveValue::String(v)
    }
}

impl From<Uuid> for PrimitiveValue {
    fn from(v: Uuid) -> Self {
        PrimitiveValue::Guid(v)
    }
}

impl From<NaiveDateTime> for PrimitiveValue {
    fn from(v: NaiveDateTime) -> Self {
        PrimitiveValue::DateTime(v)
    }
}
