use crate::{UnionValue, WithTypespace};
use enum_as_inner::EnumAsInner;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::fmt;

/// A payload value, as carried by a [`UnionValue`] variant or found in a record field.
///
/// Equality is deep and structural.
/// Unions nested in payloads compare by variant and payload, recursively.
#[derive(EnumAsInner, Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(String),
    /// The value of a list or a tuple.
    Array(Vec<Value>),
    /// The value of a string-keyed map, or of an untyped object.
    Map(IndexMap<String, Value>),
    /// The value of a declared record, fields in declaration order.
    Record(IndexMap<String, Value>),
    Union(Box<UnionValue>),
}

impl Value {
    /// Returns a record value with the given fields.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns a map value with the given entries.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Converts an untyped wire tree.
    ///
    /// Integral numbers become `I64`, or `U64` when too large for `i64`.
    /// Objects become `Map`s.
    pub fn from_json(tree: &Json) -> Self {
        match tree {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => n
                .as_i64()
                .map(Self::I64)
                .or_else(|| n.as_u64().map(Self::U64))
                .unwrap_or_else(|| Self::F64(n.as_f64().unwrap_or(f64::NAN))),
            Json::String(s) => Self::String(s.clone()),
            Json::Array(elems) => Self::Array(elems.iter().map(Self::from_json).collect()),
            Json::Object(obj) => Self::Map(obj.iter().map(|(k, v)| (k.clone(), Self::from_json(v))).collect()),
        }
    }

    /// A short description of the kind of this value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::I64(_) | Self::U64(_) => "an integer",
            Self::F64(_) => "a float",
            Self::String(_) => "a string",
            Self::Array(_) => "an array",
            Self::Map(_) => "a map",
            Self::Record(_) => "a record",
            Self::Union(_) => "a union value",
        }
    }
}

macro_rules! impl_from {
    ($($t:ty => $x:ident,)*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::$x(v.into())
            }
        })*
    };
}

impl_from! {
    bool => Bool,
    i32 => I64,
    i64 => I64,
    u32 => U64,
    u64 => U64,
    f64 => F64,
    &str => String,
    String => String,
    Vec<Value> => Array,
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<UnionValue> for Value {
    fn from(v: UnionValue) -> Self {
        Self::Union(Box::new(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for WithTypespace<'_, Value> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty() {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(x) => write!(f, "{x}"),
            Value::U64(x) => write!(f, "{x}"),
            Value::F64(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.with(elem))?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, val)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {}", self.with(val))?;
                }
                f.write_str("}")
            }
            Value::Record(fields) => {
                f.write_str("(")?;
                for (i, (name, val)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name} = {}", self.with(val))?;
                }
                f.write_str(")")
            }
            Value::Union(uv) => write!(f, "{}", self.with(&**uv)),
        }
    }
}
