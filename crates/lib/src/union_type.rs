use crate::error::DeclarationError;
use crate::{PayloadType, Tagging, VariantDescriptor, VariantId};
use std::collections::HashMap;

/// A closed set of named variants, together with how they are tagged on the wire.
///
/// Built once through [`UnionType::builder`] and immutable afterwards.
/// Variant order is declaration order;
/// it decides the [`VariantId`]s and the order of schema output, nothing else.
///
/// ```ignore
/// let feed = UnionType::builder("Feed")
///     .tagging(Tagging::internal("type"))
///     .variant("Post", PayloadType::named("Post"))
///     .unit("Heartbeat")
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType {
    pub name: Box<str>,
    pub tagging: Tagging,
    variants: Vec<VariantDescriptor>,
    /// Dispatch tables, built once.
    by_wire: HashMap<Box<str>, VariantId>,
    by_declared: HashMap<Box<str>, VariantId>,
}

impl UnionType {
    pub fn builder(name: impl Into<Box<str>>) -> UnionTypeBuilder {
        UnionTypeBuilder {
            name: name.into(),
            tagging: Tagging::default(),
            variants: Vec::new(),
        }
    }

    /// Returns the variants in declaration order.
    pub fn variants(&self) -> &[VariantDescriptor] {
        &self.variants
    }

    pub fn variant(&self, id: VariantId) -> Option<&VariantDescriptor> {
        self.variants.get(id.idx())
    }

    /// Looks up a variant by the name used in code.
    pub fn by_declared_name(&self, name: &str) -> Option<(VariantId, &VariantDescriptor)> {
        let id = *self.by_declared.get(name)?;
        Some((id, &self.variants[id.idx()]))
    }

    /// Looks up a variant by its tag on the wire.
    pub fn by_wire_name(&self, wire_name: &str) -> Option<(VariantId, &VariantDescriptor)> {
        let id = *self.by_wire.get(wire_name)?;
        Some((id, &self.variants[id.idx()]))
    }

    /// Returns the wire name of the variant declared as `name`.
    pub fn wire_name_of(&self, name: &str) -> Option<&str> {
        self.by_declared_name(name).map(|(_, v)| &*v.wire_name)
    }

    pub(crate) fn wire_index(&self) -> &HashMap<Box<str>, VariantId> {
        &self.by_wire
    }
}

/// Collects the variants of a [`UnionType`].
#[derive(Debug, Clone)]
pub struct UnionTypeBuilder {
    name: Box<str>,
    tagging: Tagging,
    variants: Vec<VariantDescriptor>,
}

impl UnionTypeBuilder {
    /// Sets how the union is tagged on the wire. Defaults to [`Tagging::External`].
    pub fn tagging(mut self, tagging: Tagging) -> Self {
        self.tagging = tagging;
        self
    }

    /// Adds a variant carrying a payload of type `ty`.
    pub fn variant(self, name: impl Into<Box<str>>, ty: PayloadType) -> Self {
        self.with(VariantDescriptor::new(name, ty))
    }

    /// Adds a variant carrying a payload of type `ty`, tagged `wire_name` on the wire.
    pub fn variant_renamed(self, name: impl Into<Box<str>>, ty: PayloadType, wire_name: impl Into<Box<str>>) -> Self {
        self.with(VariantDescriptor::new(name, ty).renamed(wire_name))
    }

    /// Adds a variant without a payload.
    pub fn unit(self, name: impl Into<Box<str>>) -> Self {
        self.with(VariantDescriptor::unit(name))
    }

    /// Adds an already described variant.
    pub fn with(mut self, variant: VariantDescriptor) -> Self {
        self.variants.push(variant);
        self
    }

    /// Checks the variants and builds the dispatch tables.
    ///
    /// Payload types naming other types are not looked at beyond their shape;
    /// they are resolved when the union's codec is first built.
    pub fn build(self) -> Result<UnionType, DeclarationError> {
        let Self { name, tagging, variants } = self;
        tagging.check(&name)?;

        let mut by_wire = HashMap::with_capacity(variants.len());
        let mut by_declared = HashMap::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            let id = u16::try_from(i)
                .map(VariantId)
                .map_err(|_| DeclarationError::TooManyVariants { union: name.clone() })?;

            if by_declared.insert(variant.declared_name.clone(), id).is_some() {
                return Err(DeclarationError::DuplicateVariant {
                    union: name,
                    variant: variant.declared_name.clone(),
                });
            }
            if let Some(first) = by_wire.insert(variant.wire_name.clone(), id) {
                return Err(DeclarationError::DuplicateWireName {
                    union: name,
                    wire_name: variant.wire_name.clone(),
                    first: variants[first.idx()].declared_name.clone(),
                    second: variant.declared_name.clone(),
                });
            }

            if let (Tagging::Internal { .. }, Some(payload)) = (&tagging, &variant.payload) {
                if payload.is_never_object() {
                    return Err(DeclarationError::NonRecordPayload {
                        union: name,
                        variant: variant.declared_name.clone(),
                        payload: payload.to_string(),
                    });
                }
            }
        }

        Ok(UnionType {
            name,
            tagging,
            variants,
            by_wire,
            by_declared,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_go_both_ways() {
        let union = UnionType::builder("Shape")
            .variant_renamed("StrTuple", PayloadType::parse("tuple[str, str]").unwrap(), "just_str_tuple")
            .unit("Empty")
            .build()
            .unwrap();
        assert_eq!(union.wire_name_of("StrTuple"), Some("just_str_tuple"));
        assert_eq!(union.wire_name_of("Empty"), Some("Empty"));
        let (id, v) = union.by_wire_name("just_str_tuple").unwrap();
        assert_eq!(id, VariantId(0));
        assert_eq!(&*v.declared_name, "StrTuple");
        assert!(union.by_wire_name("StrTuple").is_none());
        assert!(union.by_declared_name("just_str_tuple").is_none());
    }

    #[test]
    fn wire_names_must_be_unique() {
        let err = UnionType::builder("U")
            .variant_renamed("A", PayloadType::I64, "x")
            .variant_renamed("B", PayloadType::String, "x")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::DuplicateWireName {
                union: "U".into(),
                wire_name: "x".into(),
                first: "A".into(),
                second: "B".into(),
            }
        );

        // A rename may also collide with another variant's declared name.
        let err = UnionType::builder("U")
            .unit("A")
            .with(VariantDescriptor::unit("B").renamed("A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::DuplicateWireName { .. }));
    }

    #[test]
    fn declared_names_must_be_unique() {
        let err = UnionType::builder("U").unit("A").variant("A", PayloadType::I64).build();
        assert!(matches!(err, Err(DeclarationError::DuplicateVariant { .. })));
    }

    #[test]
    fn internal_tagging_needs_object_payloads() {
        let err = UnionType::builder("U")
            .tagging(Tagging::internal("type"))
            .variant("Int", PayloadType::I64)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::NonRecordPayload {
                union: "U".into(),
                variant: "Int".into(),
                payload: "int".into(),
            }
        );

        let ok = UnionType::builder("U")
            .tagging(Tagging::internal("type"))
            .variant("Rec", PayloadType::named("Rec"))
            .variant("Dict", PayloadType::map(PayloadType::I64))
            .unit("Nothing")
            .build();
        assert!(ok.is_ok());

        let adjacent = UnionType::builder("U")
            .tagging(Tagging::adjacent("tag", "payload"))
            .variant("Int", PayloadType::I64)
            .build();
        assert!(adjacent.is_ok());
    }
}
