pub mod parse;

use crate::error::TypeExprError;
use crate::TypeRef;
use enum_as_inner::EnumAsInner;
use std::fmt;
use std::str::FromStr;

/// The type of a variant payload or of a record field.
///
/// This is the small structured-value type language the codecs orchestrate.
/// Declared unions and records are referred to either by name, via [`PayloadType::Named`],
/// which stays an opaque token until the first codec build resolves it,
/// or directly by [`PayloadType::Ref`] when the caller already holds a [`TypeRef`].
///
/// ```ignore
/// int                 // I64
/// list[str]           // Array(String)
/// dict[str, Feed]     // Map(Named("Feed"))
/// Optional[bool]      // Option(Bool)
/// tuple[str, str]     // Tuple([String, String])
/// ```
#[derive(EnumAsInner, Debug, Clone, Eq, PartialEq, Hash)]
pub enum PayloadType {
    /// Accepts any wire tree as-is.
    Any,
    /// Only `null`.
    Null,
    Bool,
    I64,
    U64,
    F64,
    String,
    /// A homogeneous list.
    Array(Box<PayloadType>),
    /// A fixed-arity heterogeneous list.
    Tuple(Vec<PayloadType>),
    /// An object with string keys and values of a single type.
    Map(Box<PayloadType>),
    /// Either `null` or a value of the inner type.
    Option(Box<PayloadType>),
    /// A declared union or record, by name.
    /// Unresolved until a codec that reaches it is built.
    Named(Box<str>),
    /// A declared union or record, by reference.
    Ref(TypeRef),
}

impl PayloadType {
    /// Returns an array type where the element type is `elem`.
    pub fn array(elem: Self) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Returns a string-keyed map type with values of type `value`.
    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    /// Returns an option type where `some` is the type of the present value.
    pub fn option(some: Self) -> Self {
        Self::Option(Box::new(some))
    }

    /// Returns a deferred reference to the type declared as `name`.
    pub fn named(name: impl Into<Box<str>>) -> Self {
        Self::Named(name.into())
    }

    /// Parses a textual type expression such as `dict[str, list[int]]`.
    pub fn parse(expr: &str) -> Result<Self, TypeExprError> {
        parse::parse_type_expr(expr)
    }

    /// Returns whether values of this type can never serialize to an object,
    /// no matter what the named types it mentions resolve to.
    ///
    /// Such payloads cannot be merged into an internally tagged object.
    pub fn is_never_object(&self) -> bool {
        !matches!(self, Self::Any | Self::Map(_) | Self::Named(_) | Self::Ref(_))
    }

    /// Returns whether the reference `target`, a `Named` or `Ref` type, occurs anywhere in this type.
    pub fn mentions(&self, target: &PayloadType) -> bool {
        self == target
            || match self {
                Self::Array(elem) | Self::Map(elem) | Self::Option(elem) => elem.mentions(target),
                Self::Tuple(elems) => elems.iter().any(|e| e.mentions(target)),
                _ => false,
            }
    }

    /// Returns whether this is a generic container (list, tuple, map or option)
    /// whose elements mention `target`.
    pub fn is_container_of(&self, target: &PayloadType) -> bool {
        matches!(self, Self::Array(_) | Self::Tuple(_) | Self::Map(_) | Self::Option(_)) && self.mentions(target)
    }
}

impl FromStr for PayloadType {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Null => f.write_str("none"),
            Self::Bool => f.write_str("bool"),
            Self::I64 => f.write_str("int"),
            Self::U64 => f.write_str("uint"),
            Self::F64 => f.write_str("float"),
            Self::String => f.write_str("str"),
            Self::Array(elem) => write!(f, "list[{elem}]"),
            Self::Tuple(elems) => {
                f.write_str("tuple[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                f.write_str("]")
            }
            Self::Map(value) => write!(f, "dict[str, {value}]"),
            Self::Option(some) => write!(f, "Optional[{some}]"),
            Self::Named(name) => f.write_str(name),
            Self::Ref(r) => write!(f, "{r}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_of_self() {
        let feed = PayloadType::named("Feed");
        let list_of_self = PayloadType::array(feed.clone());
        assert!(list_of_self.is_container_of(&feed));
        assert!(!list_of_self.is_container_of(&PayloadType::named("Other")));
        assert!(!feed.is_container_of(&feed));
        assert!(PayloadType::option(PayloadType::map(feed.clone())).is_container_of(&feed));
        assert!(PayloadType::Tuple(vec![PayloadType::I64, PayloadType::Ref(TypeRef(3))]).is_container_of(&PayloadType::Ref(TypeRef(3))));
    }

    #[test]
    fn object_shapes() {
        assert!(PayloadType::I64.is_never_object());
        assert!(PayloadType::array(PayloadType::Any).is_never_object());
        assert!(PayloadType::option(PayloadType::named("Rec")).is_never_object());
        assert!(!PayloadType::named("Rec").is_never_object());
        assert!(!PayloadType::map(PayloadType::String).is_never_object());
    }

    #[test]
    fn display_matches_parse() {
        for expr in ["int", "list[str]", "dict[str, Optional[Feed]]", "tuple[str, uint, float]"] {
            let ty = PayloadType::parse(expr).unwrap();
            assert_eq!(ty.to_string(), expr);
        }
    }
}
