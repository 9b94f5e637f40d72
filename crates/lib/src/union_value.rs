use crate::error::ValueError;
use crate::{TypeRef, Typespace, UnionType, Value, VariantDescriptor, VariantId, WithTypespace};
use std::fmt;

/// A value of a declared union: which variant, and the payload if the variant carries one.
///
/// `payload` is `None` exactly when the variant carries no payload.
/// Values are immutable once constructed, through a [`VariantRef`] or by decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    ty: TypeRef,
    variant: VariantId,
    payload: Option<Box<Value>>,
}

impl UnionValue {
    pub(crate) fn new(ty: TypeRef, variant: VariantId, payload: Option<Value>) -> Self {
        Self {
            ty,
            variant,
            payload: payload.map(Box::new),
        }
    }

    /// Returns the union this value belongs to.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    pub fn variant(&self) -> VariantId {
        self.variant
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_deref()
    }

    /// Returns the variant and payload, for dispatching on the variant.
    pub fn into_parts(self) -> (VariantId, Option<Value>) {
        (self.variant, self.payload.map(|p| *p))
    }

    /// Returns the descriptor of the variant this value holds.
    pub fn descriptor<'a>(&self, ts: &'a Typespace) -> Option<&'a VariantDescriptor> {
        ts.union_type(self.ty)?.variant(self.variant)
    }
}

impl fmt::Display for WithTypespace<'_, UnionValue> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.ty();
        match self.typespace().union_type(value.ty) {
            Some(union) => {
                let variant = union.variant(value.variant).map_or("?", |v| &*v.declared_name);
                write!(f, "{}.{variant}", union.name)?;
            }
            None => write!(f, "{}.{}", value.ty, value.variant)?,
        }
        if let Some(payload) = value.payload() {
            write!(f, "({})", self.with(payload))?;
        }
        Ok(())
    }
}

/// The constructor of one variant of a union, obtained through [`Typespace::variant`].
#[derive(Debug, Clone, Copy)]
pub struct VariantRef<'a> {
    ty: TypeRef,
    id: VariantId,
    union: &'a UnionType,
    descriptor: &'a VariantDescriptor,
}

impl<'a> VariantRef<'a> {
    pub(crate) fn new(ts: &'a Typespace, ty: TypeRef, name: &str) -> Result<Self, ValueError> {
        let union = ts.union_type(ty).ok_or_else(|| ValueError::NotAUnion {
            name: ty.to_string().into(),
        })?;
        let (id, descriptor) = union.by_declared_name(name).ok_or_else(|| ValueError::UnknownVariant {
            union: union.name.clone(),
            variant: name.into(),
        })?;
        Ok(Self {
            ty,
            id,
            union,
            descriptor,
        })
    }

    pub fn id(&self) -> VariantId {
        self.id
    }

    pub fn descriptor(&self) -> &'a VariantDescriptor {
        self.descriptor
    }

    /// Constructs the value of a variant without payload.
    pub fn unit(&self) -> Result<UnionValue, ValueError> {
        self.construct(None)
    }

    /// Constructs the value of a variant carrying `payload`.
    pub fn of(&self, payload: impl Into<Value>) -> Result<UnionValue, ValueError> {
        self.construct(Some(payload.into()))
    }

    /// Constructs a value of this variant.
    ///
    /// For a variant without payload, both `None` and `Some(Value::Null)` mean "no value",
    /// and yield equal values; anything else is rejected.
    /// A variant with payload requires `Some(_)`.
    pub fn construct(&self, payload: Option<Value>) -> Result<UnionValue, ValueError> {
        let payload = match (&self.descriptor.payload, payload) {
            (None, None | Some(Value::Null)) => None,
            (None, Some(_)) => {
                return Err(ValueError::PayloadForEmpty {
                    union: self.union.name.clone(),
                    variant: self.descriptor.declared_name.clone(),
                })
            }
            (Some(_), None) => {
                return Err(ValueError::MissingPayload {
                    union: self.union.name.clone(),
                    variant: self.descriptor.declared_name.clone(),
                })
            }
            (Some(_), payload) => payload,
        };
        Ok(UnionValue::new(self.ty, self.id, payload))
    }

    /// Returns whether `value` holds this variant.
    pub fn matches(&self, value: &UnionValue) -> bool {
        value.ty == self.ty && value.variant == self.id
    }
}
