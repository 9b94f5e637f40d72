use crate::codec::UnionCodec;
use crate::error::{CodecError, DeclarationError, ValueError};
use crate::options::EncodeOptions;
use crate::resolve_refs::{check_internal_payload, ResolveRefState};
use crate::schema::Definitions;
use crate::wire_type::check_depth;
use crate::{Json, PayloadType, RecordType, TypeRef, UnionType, UnionValue, Value, VariantRef, WireType, WithTypespace};
use enum_as_inner::EnumAsInner;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::ops::Index;

/// A declared type.
#[derive(EnumAsInner, Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Union(UnionType),
    Record(RecordType),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Union(union) => &union.name,
            Self::Record(record) => &record.name,
        }
    }
}

#[derive(Debug)]
struct TypeEntry {
    def: TypeDef,
    /// Built on first use, for unions only.
    codec: OnceCell<UnionCodec>,
}

/// The registry of declared unions and records.
///
/// Declaring takes `&mut self`, so it happens before the typespace is shared.
/// Everything else takes `&self`; a `Typespace` may be shared freely between threads,
/// and the codec of each union is built at most once, by whichever thread first needs it.
///
/// Types refer to each other by name, through [`PayloadType::Named`],
/// and may be declared in any order; see [`Typespace::codec`].
#[derive(Debug, Default)]
pub struct Typespace {
    types: Vec<TypeEntry>,
    names: HashMap<Box<str>, TypeRef>,
}

impl Index<TypeRef> for Typespace {
    type Output = TypeDef;

    fn index(&self, index: TypeRef) -> &Self::Output {
        &self.types[index.idx()].def
    }
}

impl Typespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `union`, returning a reference to it.
    ///
    /// Payload types naming records already declared are checked against the union's tagging here;
    /// all other names are checked when the codec is first built.
    pub fn declare_union(&mut self, union: UnionType) -> Result<TypeRef, DeclarationError> {
        for variant in union.variants() {
            let Some(PayloadType::Named(name)) = &variant.payload else {
                continue;
            };
            if let Some(r) = self.lookup(name) {
                check_internal_payload(self, &union, variant, &PayloadType::Ref(r))?;
            }
        }
        log::debug!(
            "declaring union `{}` ({}, {} variants)",
            union.name,
            union.tagging,
            union.variants().len()
        );
        self.add(TypeDef::Union(union))
    }

    /// Declares `record`, returning a reference to it.
    pub fn declare_record(&mut self, record: RecordType) -> Result<TypeRef, DeclarationError> {
        record.check_fields()?;
        log::debug!("declaring record `{}` ({} fields)", record.name, record.fields.len());
        self.add(TypeDef::Record(record))
    }

    fn add(&mut self, def: TypeDef) -> Result<TypeRef, DeclarationError> {
        if let Some(&existing) = self.names.get(def.name()) {
            return Err(DeclarationError::DuplicateTypeName {
                name: def.name().into(),
                existing,
            });
        }
        let r = u32::try_from(self.types.len())
            .map(TypeRef)
            .map_err(|_| DeclarationError::TooManyTypes)?;
        self.names.insert(def.name().into(), r);
        self.types.push(TypeEntry {
            def,
            codec: OnceCell::new(),
        });
        Ok(r)
    }

    /// Returns the reference of the type declared as `name`.
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.names.get(name).copied()
    }

    /// Returns the type referred to by `r`.
    pub fn get(&self, r: TypeRef) -> Option<&TypeDef> {
        self.types.get(r.idx()).map(|entry| &entry.def)
    }

    /// Returns the union type referred to by `r`, if `r` refers to a union.
    pub fn union_type(&self, r: TypeRef) -> Option<&UnionType> {
        self.get(r)?.as_union()
    }

    /// Returns all declared types, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TypeRef, &TypeDef)> {
        (0..).map(TypeRef).zip(self.types.iter().map(|entry| &entry.def))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `ty` combined with the context `self`.
    pub const fn with_type<'a, T: ?Sized>(&'a self, ty: &'a T) -> WithTypespace<'a, T> {
        WithTypespace::new(self, ty)
    }

    fn union_ref(&self, name: &str) -> Result<TypeRef, ValueError> {
        self.lookup(name)
            .filter(|r| self.union_type(*r).is_some())
            .ok_or_else(|| ValueError::NotAUnion { name: name.into() })
    }

    /// Returns the codec of the union referred to by `r`, building it on first use.
    ///
    /// Building resolves every type name reachable from the union.
    /// When one of them is not declared, a [`DeferredTypeError`](crate::DeferredTypeError) is returned
    /// and nothing is cached, so a later call, after the missing type was declared, succeeds.
    /// Concurrent first calls build the codec once; all callers observe the same instance.
    pub fn codec(&self, r: TypeRef) -> Result<WithTypespace<'_, UnionCodec>, CodecError> {
        let entry = self.types.get(r.idx()).ok_or_else(|| ValueError::NotAUnion {
            name: r.to_string().into(),
        })?;
        let TypeDef::Union(union) = &entry.def else {
            return Err(ValueError::NotAUnion {
                name: entry.def.name().into(),
            }
            .into());
        };
        let codec = entry.codec.get_or_try_init(|| UnionCodec::build(self, r, union))?;
        Ok(self.with_type(codec))
    }

    /// Returns the codec of the union declared as `union`.
    pub fn codec_of(&self, union: &str) -> Result<WithTypespace<'_, UnionCodec>, CodecError> {
        self.codec(self.union_ref(union)?)
    }

    /// Returns the constructor of the variant `name` of the union declared as `union`.
    pub fn variant(&self, union: &str, name: &str) -> Result<VariantRef<'_>, ValueError> {
        let r = self.union_ref(union)?;
        VariantRef::new(self, r, name)
    }

    /// Decodes `tree` as a value of the union declared as `union`,
    /// inferring the variant from the shape of the tree.
    pub fn decode(&self, union: &str, tree: &Json) -> Result<UnionValue, CodecError> {
        self.codec_of(union)?.decode(tree)
    }

    /// Decodes keyed raw inputs, as if they were the fields of one object,
    /// as a value of the union declared as `union`.
    ///
    /// ```ignore
    /// ts.parse_fields("Feed", [("tag", json!("NoValue")), ("payload", Json::Null)])?
    /// ```
    pub fn parse_fields<K: Into<String>>(
        &self,
        union: &str,
        fields: impl IntoIterator<Item = (K, Json)>,
    ) -> Result<UnionValue, CodecError> {
        let tree = Json::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect());
        self.decode(union, &tree)
    }

    /// Encodes `value` with the process-wide [`EncodeOptions::ambient`] options.
    pub fn encode(&self, value: &UnionValue) -> Result<Json, CodecError> {
        self.encode_with(value, EncodeOptions::ambient())
    }

    /// Encodes `value` with the given `opts`.
    pub fn encode_with(&self, value: &UnionValue, opts: EncodeOptions) -> Result<Json, CodecError> {
        self.codec(value.ty())?.encode(value, opts)
    }

    /// Returns the JSON Schema of the union declared as `union`.
    pub fn json_schema(&self, union: &str) -> Result<Json, CodecError> {
        let mut defs = Definitions::default();
        let root = self.codec_of(union)?.generate_schema(&mut defs)?;
        Ok(defs.to_json_schema(&root))
    }

    /// Validates `tree` against an arbitrary payload type,
    /// which may mention declared unions and records, e.g., `list[Feed]`.
    ///
    /// Like [`Typespace::decode`], rejects trees nested deeper than [`MAX_DEPTH`](crate::wire_type::MAX_DEPTH).
    pub fn validate_type(&self, ty: &PayloadType, tree: &Json) -> Result<Value, CodecError> {
        check_depth(tree)?;
        let ty = self.resolve(ty)?;
        self.with_type(&ty).validate(tree)
    }

    /// Serializes `value` as a value of an arbitrary payload type.
    pub fn serialize_type(&self, ty: &PayloadType, value: &Value) -> Result<Json, CodecError> {
        let ty = self.resolve(ty)?;
        self.with_type(&ty).serialize(value, EncodeOptions::ambient())
    }

    fn resolve(&self, ty: &PayloadType) -> Result<PayloadType, CodecError> {
        let mut state = ResolveRefState::detached(ty.to_string());
        Ok(self.with_type(ty).resolve_refs(&mut state)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tagging;

    fn unit_union(name: &str) -> UnionType {
        UnionType::builder(name).unit("A").build().unwrap()
    }

    #[test]
    fn names_are_unique_across_kinds() {
        let mut ts = Typespace::new();
        let r = ts.declare_union(unit_union("Thing")).unwrap();
        let err = ts.declare_record(RecordType::new("Thing")).unwrap_err();
        assert_eq!(
            err,
            DeclarationError::DuplicateTypeName {
                name: "Thing".into(),
                existing: r,
            }
        );
        assert_eq!(ts.len(), 1);
    }

    #[test]
    fn known_records_are_checked_on_declaration() {
        let mut ts = Typespace::new();
        ts.declare_record(RecordType::new("Msg").with_field("type", PayloadType::String))
            .unwrap();
        let union = UnionType::builder("Event")
            .tagging(Tagging::internal("type"))
            .variant("Msg", PayloadType::named("Msg"))
            .build()
            .unwrap();
        assert!(matches!(
            ts.declare_union(union),
            Err(DeclarationError::TagFieldCollision { .. })
        ));
        assert!(ts.lookup("Event").is_none());
    }

    #[test]
    fn records_are_not_unions() {
        let mut ts = Typespace::new();
        ts.declare_record(RecordType::new("Rec")).unwrap();
        assert_eq!(
            ts.variant("Rec", "A").unwrap_err(),
            ValueError::NotAUnion { name: "Rec".into() }
        );
        assert!(matches!(
            ts.decode("Nope", &Json::Null),
            Err(CodecError::Value(ValueError::NotAUnion { .. }))
        ));
    }

    #[test]
    fn iter_in_declaration_order() {
        let mut ts = Typespace::new();
        ts.declare_union(unit_union("B")).unwrap();
        ts.declare_record(RecordType::new("A")).unwrap();
        let names: Vec<_> = ts.iter().map(|(r, def)| (r, def.name())).collect();
        assert_eq!(names, [(TypeRef(0), "B"), (TypeRef(1), "A")]);
        assert_eq!(ts[TypeRef(1)].as_record().map(|r| &*r.name), Some("A"));
    }
}
