//! The JSON-RPC `id` member
//!
//! The protocol lets an id be a string, a number or `null`, and lets it be
//! left out entirely. Those four shapes mean different things to a client:
//!
//! - **absent**: no `id` member at all; the message is a notification, or the
//!   client has yet to assign an id
//! - **string** / **number**: a regular call that expects a response carrying
//!   the same id
//! - **null**: an `id` member that is present but `null`; legal on the wire and
//!   kept distinct from absent so that a round trip does not lose it
//!
//! [`IdValue`] models all four as one enum. Equality is deliberately partial:
//! only two string ids or two numeric ids can be equal, so an absent or null id
//! never matches anything during response correlation (not even itself).

use crate::error::{Error, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// JSON-RPC request/response identifier
///
/// # Examples
///
/// ```rust
/// use jrpc_core::IdValue;
///
/// let by_name = IdValue::from_string("req-7");
/// let by_number = IdValue::from_integer(7u32);
///
/// assert_eq!(by_name.encode(), "\"req-7\"");
/// assert_eq!(by_number.encode(), "7");
///
/// // Same digits, different variant: never equal
/// assert_ne!(IdValue::from_string("7"), by_number);
///
/// // `null` on the wire is not the same thing as "no id"
/// let null = IdValue::decode(b"null").unwrap();
/// assert!(null.is_null());
/// assert!(!null.is_absent());
/// ```
#[derive(Debug, Clone, Default)]
pub enum IdValue {
    /// No id member; used for notifications and for ids not yet assigned
    #[default]
    Absent,
    /// String identifier
    String(String),
    /// Integer identifier, narrowed to `i64` whatever width it was built from
    Number(i64),
    /// An id member that was explicitly `null` on the wire
    Null,
}

/// Primitive integers accepted by [`IdValue::from_integer`]
///
/// Every width is narrowed to `i64`. Unsigned values above `i64::MAX` wrap,
/// which is far beyond any id a sequence generator hands out.
pub trait IdInteger: Copy {
    /// Narrow to the common id representation
    fn to_id_number(self) -> i64;
}

macro_rules! impl_id_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IdInteger for $ty {
                fn to_id_number(self) -> i64 {
                    self as i64
                }
            }

            impl From<$ty> for IdValue {
                fn from(n: $ty) -> Self {
                    IdValue::Number(n.to_id_number())
                }
            }
        )*
    };
}

impl_id_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl IdValue {
    /// Create a string-valued id
    pub fn from_string(s: impl Into<String>) -> Self {
        IdValue::String(s.into())
    }

    /// Create an integer-valued id from any primitive integer width
    pub fn from_integer<N: IdInteger>(n: N) -> Self {
        IdValue::Number(n.to_id_number())
    }

    /// A new absent id, used as a placeholder decode target
    ///
    /// The value of `self` is not copied.
    pub fn fresh_like(&self) -> Self {
        IdValue::Absent
    }

    /// True when neither a string nor a number is set and the id was not an
    /// explicit `null`
    pub fn is_absent(&self) -> bool {
        matches!(self, IdValue::Absent)
    }

    /// True when the id was decoded from a wire `null`
    pub fn is_null(&self) -> bool {
        matches!(self, IdValue::Null)
    }

    /// The underlying string or integer, or `None` for absent and null ids
    pub fn value(&self) -> Option<serde_json::Value> {
        match self {
            IdValue::String(s) => Some(serde_json::Value::String(s.clone())),
            IdValue::Number(n) => Some(serde_json::Value::from(*n)),
            IdValue::Absent | IdValue::Null => None,
        }
    }

    /// Compare against an id that may not exist
    ///
    /// A missing `other` never matches.
    pub fn equals(&self, other: Option<&IdValue>) -> bool {
        other.map_or(false, |other| self == other)
    }

    /// JSON form of the id: a quoted string, an integer, or `null` for both
    /// absent and null ids
    pub fn encode(&self) -> String {
        match self {
            IdValue::String(s) => serde_json::Value::String(s.clone()).to_string(),
            IdValue::Number(n) => n.to_string(),
            IdValue::Absent | IdValue::Null => "null".to_string(),
        }
    }

    /// Parse an id from a JSON scalar
    ///
    /// `null` gives [`IdValue::Null`], a string gives a string id and an
    /// integer gives a numeric id. Anything else fails with
    /// [`Error::InvalidIdFormat`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::InvalidIdFormat(e.to_string()))
    }

    /// Key used to correlate batch responses with their requests
    ///
    /// The variant is part of the key, so string `"42"` and integer `42` do
    /// not collide. Absent and null ids have no key.
    pub fn correlation_key(&self) -> Option<String> {
        match self {
            IdValue::String(s) => Some(format!("s:{}", s)),
            IdValue::Number(n) => Some(format!("n:{}", n)),
            IdValue::Absent | IdValue::Null => None,
        }
    }
}

impl PartialEq for IdValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IdValue::String(a), IdValue::String(b)) => a == b,
            (IdValue::Number(a), IdValue::Number(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::String(s) => write!(f, "\"{}\"", s),
            IdValue::Number(n) => write!(f, "{}", n),
            IdValue::Null => write!(f, "null"),
            IdValue::Absent => write!(f, "<absent>"),
        }
    }
}

impl From<String> for IdValue {
    fn from(s: String) -> Self {
        IdValue::String(s)
    }
}

impl From<&str> for IdValue {
    fn from(s: &str) -> Self {
        IdValue::String(s.to_string())
    }
}

impl Serialize for IdValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            IdValue::String(s) => serializer.serialize_str(s),
            IdValue::Number(n) => serializer.serialize_i64(*n),
            IdValue::Absent | IdValue::Null => serializer.serialize_unit(),
        }
    }
}

struct IdValueVisitor;

impl<'de> Visitor<'de> for IdValueVisitor {
    type Value = IdValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-RPC id (string, integer or null)")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<IdValue, E> {
        Ok(IdValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<IdValue, E> {
        Ok(IdValue::Null)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<IdValue, E> {
        Ok(IdValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<IdValue, E> {
        Ok(IdValue::String(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<IdValue, E> {
        Ok(IdValue::Number(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<IdValue, E> {
        i64::try_from(v)
            .map(IdValue::Number)
            .map_err(|_| E::custom(format!("integer id {} out of range", v)))
    }
}

impl<'de> Deserialize<'de> for IdValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(IdValueVisitor)
    }
}
