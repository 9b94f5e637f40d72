use crate::{PayloadType, TypeRef};
use enum_as_inner::EnumAsInner;
use std::fmt;

/// The position of a variant within its union, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantId(pub u16);

impl VariantId {
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declaration-time metadata of one case of a union.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantDescriptor {
    /// The name used in code.
    pub declared_name: Box<str>,
    /// The tag used on the wire, after renames.
    pub wire_name: Box<str>,
    /// The declared payload type, `None` for variants without a payload.
    pub payload: Option<PayloadType>,
}

impl VariantDescriptor {
    /// Returns a variant that carries a payload of type `ty`.
    pub fn new(declared_name: impl Into<Box<str>>, ty: PayloadType) -> Self {
        let declared_name = declared_name.into();
        Self {
            wire_name: declared_name.clone(),
            declared_name,
            payload: Some(ty),
        }
    }

    /// Returns a variant without a payload.
    pub fn unit(declared_name: impl Into<Box<str>>) -> Self {
        let declared_name = declared_name.into();
        Self {
            wire_name: declared_name.clone(),
            declared_name,
            payload: None,
        }
    }

    /// Uses `wire_name` as the tag on the wire instead of the declared name.
    pub fn renamed(mut self, wire_name: impl Into<Box<str>>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }
}

/// The payload kind of a variant once all type references are resolved.
#[derive(EnumAsInner, Debug, Clone, PartialEq, Eq)]
pub enum PayloadKind {
    /// The variant carries no payload.
    Empty,
    /// The payload is validated and serialized as an ordinary value.
    Scalar(PayloadType),
    /// The payload is itself a value of the union at this reference,
    /// decoded and encoded with that union's own codec.
    NestedUnion(TypeRef),
}
