//! Structured side-data attached to log events.
//!
//! # Responsibilities
//! - Recursive tagged value (nil, string, int, double, boolean, array, map)
//! - Merge law used when combining metadata from several sources
//! - Self-describing JSON wire form with explicit tag dispatch
//!
//! # Design Decisions
//! - Maps are ordered (`BTreeMap`) so equal values hash and serialize identically
//! - Doubles compare and hash by bit pattern, which keeps `Eq`/`Hash` lawful
//! - JSON has no NaN or infinity, so non-finite doubles travel as
//!   `{"$double": "0x<bits>"}`; a map of exactly that shape decodes as a double

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key of the single-entry map carrying a non-finite double.
pub const NON_FINITE_DOUBLE_KEY: &str = "$double";

fn non_finite_from_bits(text: &str) -> Option<f64> {
    let bits = u64::from_str_radix(text.strip_prefix("0x")?, 16).ok()?;
    let value = f64::from_bits(bits);
    (!value.is_finite()).then_some(value)
}

/// A metadata value.
#[derive(Debug, Clone, Default)]
pub enum MetadataValue {
    #[default]
    Nil,
    String(String),
    Int(i64),
    Double(f64),
    Boolean(bool),
    Array(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl MetadataValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, MetadataValue::Nil)
    }

    /// Combine two values.
    ///
    /// `Nil` yields the other operand, arrays concatenate, maps with disjoint
    /// keys union. Anything else becomes a two element array.
    pub fn merge(self, rhs: MetadataValue) -> MetadataValue {
        match (self, rhs) {
            (MetadataValue::Nil, rhs) => rhs,
            (MetadataValue::Array(mut values), MetadataValue::Array(more)) => {
                values.extend(more);
                MetadataValue::Array(values)
            }
            (MetadataValue::Map(mut values), MetadataValue::Map(more))
                if more.keys().all(|k| !values.contains_key(k)) =>
            {
                values.extend(more);
                MetadataValue::Map(values)
            }
            (lhs, rhs) => MetadataValue::Array(vec![lhs, rhs]),
        }
    }

    /// Encode as JSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    fn tag(&self) -> u8 {
        match self {
            MetadataValue::Nil => 0,
            MetadataValue::String(_) => 1,
            MetadataValue::Int(_) => 2,
            MetadataValue::Double(_) => 3,
            MetadataValue::Boolean(_) => 4,
            MetadataValue::Array(_) => 5,
            MetadataValue::Map(_) => 6,
        }
    }
}

impl PartialEq for MetadataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetadataValue::Nil, MetadataValue::Nil) => true,
            (MetadataValue::String(a), MetadataValue::String(b)) => a == b,
            (MetadataValue::Int(a), MetadataValue::Int(b)) => a == b,
            (MetadataValue::Double(a), MetadataValue::Double(b)) => a.to_bits() == b.to_bits(),
            (MetadataValue::Boolean(a), MetadataValue::Boolean(b)) => a == b,
            (MetadataValue::Array(a), MetadataValue::Array(b)) => a == b,
            (MetadataValue::Map(a), MetadataValue::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for MetadataValue {}

impl Hash for MetadataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.tag());
        match self {
            MetadataValue::Nil => {}
            MetadataValue::String(s) => s.hash(state),
            MetadataValue::Int(i) => i.hash(state),
            MetadataValue::Double(d) => d.to_bits().hash(state),
            MetadataValue::Boolean(b) => b.hash(state),
            MetadataValue::Array(values) => values.hash(state),
            MetadataValue::Map(values) => values.hash(state),
        }
    }
}

impl Serialize for MetadataValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataValue::Nil => serializer.serialize_unit(),
            MetadataValue::String(s) => serializer.serialize_str(s),
            MetadataValue::Int(i) => serializer.serialize_i64(*i),
            MetadataValue::Double(d) if !d.is_finite() => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(NON_FINITE_DOUBLE_KEY, &format!("{:#018x}", d.to_bits()))?;
                map.end()
            }
            MetadataValue::Double(d) => serializer.serialize_f64(*d),
            MetadataValue::Boolean(b) => serializer.serialize_bool(*b),
            MetadataValue::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            MetadataValue::Map(values) => {
                let mut map = serializer.serialize_map(Some(values.len()))?;
                for (key, value) in values {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct MetadataVisitor;

impl<'de> Visitor<'de> for MetadataVisitor {
    type Value = MetadataValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a metadata value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(MetadataValue::Nil)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(MetadataValue::Nil)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        MetadataValue::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(MetadataValue::Boolean(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(MetadataValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        match i64::try_from(v) {
            Ok(i) => Ok(MetadataValue::Int(i)),
            Err(_) => Ok(MetadataValue::Double(v as f64)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(MetadataValue::Double(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(MetadataValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(MetadataValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element()? {
            values.push(value);
        }
        Ok(MetadataValue::Array(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut values = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, MetadataValue>()? {
            values.insert(key, value);
        }
        if values.len() == 1 {
            if let Some(MetadataValue::String(bits)) = values.get(NON_FINITE_DOUBLE_KEY) {
                if let Some(d) = non_finite_from_bits(bits) {
                    return Ok(MetadataValue::Double(d));
                }
            }
        }
        Ok(MetadataValue::Map(values))
    }
}

impl<'de> Deserialize<'de> for MetadataValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MetadataVisitor)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_owned())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Int(v)
    }
}

impl From<i32> for MetadataValue {
    fn from(v: i32) -> Self {
        MetadataValue::Int(v.into())
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Double(v)
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Boolean(v)
    }
}

impl<T: Into<MetadataValue>> From<Option<T>> for MetadataValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(MetadataValue::Nil, Into::into)
    }
}

impl<T: Into<MetadataValue>> From<Vec<T>> for MetadataValue {
    fn from(v: Vec<T>) -> Self {
        MetadataValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<MetadataValue>> FromIterator<(K, V)> for MetadataValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MetadataValue::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
