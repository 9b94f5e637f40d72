//! The compiled per-union codec.

use crate::error::{CodecError, EncodeError, JsonKind, ValidationErrorKind, ValueError};
use crate::options::EncodeOptions;
use crate::resolve_refs::{check_internal_payload, ResolveRefState};
use crate::tagging::Split;
use crate::typespace::TypeDef;
use crate::wire_type::check_depth;
use crate::{
    Json, PayloadKind, PayloadType, Tagging, TypeRef, Typespace, UnionType, UnionValue, Value, VariantId, WireType,
    WithTypespace,
};
use std::collections::HashMap;

/// A variant of a [`UnionCodec`], with every type name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledVariant {
    pub declared_name: Box<str>,
    pub wire_name: Box<str>,
    pub kind: PayloadKind,
    /// The payload is a container of the union itself, e.g., `list[Self]`,
    /// and gets its own named schema definition.
    /// Values and wire trees are unaffected.
    pub implicit_wrapper: bool,
}

/// The validator and serializer of one union, built once by [`Typespace::codec`].
///
/// Used as `WithTypespace<'_, UnionCodec>`, since nested unions and records
/// are looked up in the typespace while decoding and encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCodec {
    pub ty: TypeRef,
    pub name: Box<str>,
    pub tagging: Tagging,
    pub variants: Vec<CompiledVariant>,
    by_wire: HashMap<Box<str>, VariantId>,
}

impl UnionCodec {
    /// Compiles `union`, declared at `r`.
    ///
    /// Never builds the codecs of other unions;
    /// those are built when first needed for a payload.
    pub(crate) fn build(ts: &Typespace, r: TypeRef, union: &UnionType) -> Result<Self, CodecError> {
        let mut state = ResolveRefState::new(ts, r);
        let this = PayloadType::Ref(r);
        let variants = union
            .variants()
            .iter()
            .map(|variant| {
                let Some(ty) = &variant.payload else {
                    return Ok(CompiledVariant {
                        declared_name: variant.declared_name.clone(),
                        wire_name: variant.wire_name.clone(),
                        kind: PayloadKind::Empty,
                        implicit_wrapper: false,
                    });
                };
                let resolved = ts.with_type(ty).resolve_refs(&mut state)?;
                check_internal_payload(ts, union, variant, &resolved)?;
                let implicit_wrapper = resolved.is_container_of(&this);
                let kind = match resolved {
                    PayloadType::Ref(inner) if matches!(ts.get(inner), Some(TypeDef::Union(_))) => {
                        PayloadKind::NestedUnion(inner)
                    }
                    resolved => PayloadKind::Scalar(resolved),
                };
                Ok(CompiledVariant {
                    declared_name: variant.declared_name.clone(),
                    wire_name: variant.wire_name.clone(),
                    kind,
                    implicit_wrapper,
                })
            })
            .collect::<Result<Vec<_>, CodecError>>()?;

        log::debug!("built codec for union `{}` {r} ({})", union.name, union.tagging);
        Ok(Self {
            ty: r,
            name: union.name.clone(),
            tagging: union.tagging.clone(),
            variants,
            by_wire: union.wire_index().clone(),
        })
    }

    pub fn variant(&self, id: VariantId) -> Option<&CompiledVariant> {
        self.variants.get(id.idx())
    }

    /// Dispatches on a wire name.
    pub fn by_wire_name(&self, wire_name: &str) -> Option<(VariantId, &CompiledVariant)> {
        let id = *self.by_wire.get(wire_name)?;
        Some((id, self.variant(id)?))
    }
}

impl<'a> WithTypespace<'a, UnionCodec> {
    /// Decodes `tree` into a value of this union.
    ///
    /// The tagging picks the variant; the payload is then validated
    /// by the payload type, or by the nested union's own codec.
    ///
    /// Trees nested deeper than [`MAX_DEPTH`](crate::wire_type::MAX_DEPTH) are rejected before decoding starts.
    pub fn decode(&self, tree: &Json) -> Result<UnionValue, CodecError> {
        let ret = check_depth(tree).and_then(|()| self.decode_inner(tree));
        if let Err(err) = &ret {
            log::trace!("decoding `{}` failed: {err}", self.ty().name);
        }
        ret
    }

    pub(crate) fn decode_inner(&self, tree: &Json) -> Result<UnionValue, CodecError> {
        let codec = self.ty();
        let Split { wire_name, payload } = codec.tagging.split(&codec.name, tree)?;
        let (id, variant) = codec.by_wire_name(wire_name).ok_or_else(|| {
            let err = CodecError::from(ValidationErrorKind::UnknownTag {
                union: codec.name.clone(),
                tag: wire_name.into(),
            });
            match codec.tagging.tag_field() {
                Some(tag) => err.at_key(tag),
                None => err,
            }
        })?;

        let at_payload = |err: CodecError| match codec.tagging.payload_key(wire_name) {
            Some(key) => err.at_key(key),
            None => err,
        };
        let payload = payload.as_deref();
        let value = match &variant.kind {
            PayloadKind::Empty if codec.tagging.accepts_as_empty(payload) => None,
            PayloadKind::Empty => {
                let err = CodecError::from(ValidationErrorKind::UnexpectedPayload {
                    union: codec.name.clone(),
                    variant: variant.declared_name.clone(),
                    found: JsonKind::of(payload.unwrap_or(&Json::Null)),
                });
                return Err(at_payload(err));
            }
            PayloadKind::Scalar(ty) => {
                let tree = payload.unwrap_or(&Json::Null);
                Some(self.with(ty).validate(tree).map_err(at_payload)?)
            }
            PayloadKind::NestedUnion(r) => {
                let tree = payload.unwrap_or(&Json::Null);
                let inner = self.typespace().codec(*r)?.decode_inner(tree).map_err(at_payload)?;
                Some(Value::from(inner))
            }
        };
        Ok(UnionValue::new(codec.ty, id, value))
    }

    /// Encodes `value`, which must belong to this union.
    pub fn encode(&self, value: &UnionValue, opts: EncodeOptions) -> Result<Json, CodecError> {
        let codec = self.ty();
        if value.ty() != codec.ty {
            return Err(EncodeError::ForeignValue {
                union: codec.name.clone(),
                found: value.ty(),
            }
            .into());
        }
        let variant = codec.variant(value.variant()).ok_or_else(|| EncodeError::UnknownVariantId {
            union: codec.name.clone(),
            variant: value.variant().0,
        })?;

        let payload = match (&variant.kind, value.payload()) {
            (PayloadKind::Empty, _) => None,
            (PayloadKind::Scalar(ty), Some(payload)) => Some(self.with(ty).serialize(payload, opts)?),
            (PayloadKind::NestedUnion(r), Some(payload)) => {
                Some(self.typespace().codec(*r)?.serialize(payload, opts)?)
            }
            (_, None) => {
                return Err(ValueError::MissingPayload {
                    union: codec.name.clone(),
                    variant: variant.declared_name.clone(),
                }
                .into())
            }
        };
        Ok(codec.tagging.join(&codec.name, variant, payload, opts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire_type::MAX_DEPTH;
    use crate::{RecordType, UnionType};

    #[test]
    fn kinds_are_resolved() {
        let mut ts = Typespace::new();
        let inner = ts
            .declare_union(UnionType::builder("Inner").unit("X").build().unwrap())
            .unwrap();
        let rec = ts.declare_record(RecordType::new("Rec")).unwrap();
        let outer = ts
            .declare_union(
                UnionType::builder("Outer")
                    .variant("Inner", PayloadType::named("Inner"))
                    .variant("Rec", PayloadType::named("Rec"))
                    .variant("Many", PayloadType::parse("list[Outer]").unwrap())
                    .unit("None")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let codec = ts.codec(outer).unwrap();
        let kinds: Vec<_> = codec.ty().variants.iter().map(|v| (&v.kind, v.implicit_wrapper)).collect();
        assert_eq!(
            kinds,
            [
                (&PayloadKind::NestedUnion(inner), false),
                (&PayloadKind::Scalar(PayloadType::Ref(rec)), false),
                (&PayloadKind::Scalar(PayloadType::array(PayloadType::Ref(outer))), true),
                (&PayloadKind::Empty, false),
            ]
        );
    }

    #[test]
    fn self_nesting_depth_is_capped() {
        let mut ts = Typespace::new();
        ts.declare_union(
            UnionType::builder("Tree")
                .unit("Leaf")
                .variant("Node", PayloadType::named("Tree"))
                .build()
                .unwrap(),
        )
        .unwrap();
        let nested = |levels| (0..levels).fold(Json::from("Leaf"), |tree, _| serde_json::json!({"Node": tree}));

        assert!(ts.decode("Tree", &nested(MAX_DEPTH)).is_ok());
        let err = ts.decode("Tree", &nested(1_000)).unwrap_err();
        assert_eq!(
            err.as_validation().map(|e| &e.kind),
            Some(&ValidationErrorKind::TooDeep { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn codec_is_built_once() {
        let mut ts = Typespace::new();
        let r = ts
            .declare_union(UnionType::builder("U").unit("A").build().unwrap())
            .unwrap();
        let first: *const UnionCodec = ts.codec(r).unwrap().ty();
        let second: *const UnionCodec = ts.codec_of("U").unwrap().ty();
        assert_eq!(first, second);
    }
}
