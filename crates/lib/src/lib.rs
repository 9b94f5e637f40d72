//! Closed tagged unions exchanged as JSON trees.
//!
//! A union is a closed set of named variants, each optionally carrying a payload.
//! Unions and records are declared into a [`Typespace`],
//! which lazily compiles one codec per union on first use
//! and shares it between all threads afterwards.
//!
//! ```ignore
//! let mut ts = Typespace::new();
//! ts.declare_union(
//!     UnionType::builder("Shape")
//!         .tagging(Tagging::adjacent("tag", "payload"))
//!         .variant("Circle", PayloadType::F64)
//!         .unit("Dot")
//!         .build()?,
//! )?;
//! let circle = ts.variant("Shape", "Circle")?.of(2.5)?;
//! assert_eq!(ts.encode(&circle)?, json!({"tag": "Circle", "payload": 2.5}));
//! ```

pub mod codec;
pub mod error;
pub mod options;
pub mod payload_type;
pub mod record_type;
pub mod resolve_refs;
pub mod schema;
pub mod tagging;
pub mod type_ref;
pub mod typespace;
pub mod union_type;
pub mod union_value;
pub mod value;
pub mod variant;
pub mod wire_type;

pub use codec::{CompiledVariant, UnionCodec};
pub use error::{
    CodecError, DeclarationError, DeferredTypeError, EncodeError, TypeExprError, ValidationError, ValidationErrorKind,
    ValueError,
};
pub use options::{always_serialize_empty_as_object, AmbientGuard, EncodeOptions};
pub use payload_type::PayloadType;
pub use record_type::{Field, RecordType};
pub use schema::{Definitions, SchemaNode};
pub use tagging::Tagging;
pub use type_ref::TypeRef;
pub use typespace::{TypeDef, Typespace};
pub use union_type::{UnionType, UnionTypeBuilder};
pub use union_value::{UnionValue, VariantRef};
pub use value::Value;
pub use variant::{PayloadKind, VariantDescriptor, VariantId};
pub use wire_type::WireType;

/// The wire tree type.
pub use serde_json::Value as Json;

/// Adds a `Typespace` context atop of a borrowed type.
#[derive(Debug)]
pub struct WithTypespace<'a, T: ?Sized> {
    /// The typespace context that has been added to `ty`.
    typespace: &'a Typespace,
    /// What we've added the context to.
    ty: &'a T,
}

impl<T: ?Sized> Copy for WithTypespace<'_, T> {}
impl<T: ?Sized> Clone for WithTypespace<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: ?Sized> WithTypespace<'a, T> {
    /// Wraps `ty` in a context combined with the `typespace`.
    pub const fn new(typespace: &'a Typespace, ty: &'a T) -> Self {
        Self { typespace, ty }
    }

    /// Returns the object that the context was created with.
    pub const fn ty(&self) -> &'a T {
        self.ty
    }

    /// Returns the typespace context.
    pub const fn typespace(&self) -> &'a Typespace {
        self.typespace
    }

    /// Reuses the typespace we already have and returns `ty: U` wrapped with it.
    pub fn with<'b, U: ?Sized>(&self, ty: &'b U) -> WithTypespace<'b, U>
    where
        'a: 'b,
    {
        WithTypespace {
            typespace: self.typespace,
            ty,
        }
    }
}
