//! Resolution of the type names that payload types mention.
//!
//! Declarations only record names; resolving them is deferred to the first time a codec is built,
//! so types may be declared in any order, refer to themselves, or refer to each other.
//! Everything reachable is walked, so a missing name anywhere below a union
//! is reported when that union's codec is requested.

use crate::error::{DeclarationError, DeferredTypeError};
use crate::typespace::TypeDef;
use crate::{PayloadType, RecordType, Tagging, TypeRef, Typespace, UnionType, VariantDescriptor, WithTypespace};

/// The types on the path from the start of the walk.
///
/// Reaching a type already on the stack ends that branch of the walk,
/// which is what makes recursive types terminate.
pub struct ResolveRefState {
    origin: Box<str>,
    stack: Vec<TypeRef>,
}

impl ResolveRefState {
    /// Starts a walk at the declared type `start`.
    pub fn new(ts: &Typespace, start: TypeRef) -> Self {
        Self {
            origin: ts.get(start).map_or_else(|| start.to_string().into(), |def| def.name().into()),
            stack: vec![start],
        }
    }

    /// Starts a walk at a standalone type expression.
    pub fn detached(origin: impl Into<Box<str>>) -> Self {
        Self {
            origin: origin.into(),
            stack: Vec::new(),
        }
    }

    fn referenced_from(&self, ts: &Typespace) -> Box<str> {
        self.stack
            .last()
            .and_then(|r| ts.get(*r))
            .map_or_else(|| self.origin.clone(), |def| def.name().into())
    }
}

pub trait ResolveRefs {
    type Output;
    fn resolve_refs(this: WithTypespace<'_, Self>, state: &mut ResolveRefState) -> Result<Self::Output, DeferredTypeError>;
}

impl ResolveRefs for PayloadType {
    type Output = Self;
    fn resolve_refs(this: WithTypespace<'_, Self>, state: &mut ResolveRefState) -> Result<Self::Output, DeferredTypeError> {
        Ok(match this.ty() {
            PayloadType::Named(name) => {
                let r = this.typespace().lookup(name).ok_or_else(|| DeferredTypeError {
                    name: name.clone(),
                    referenced_from: state.referenced_from(this.typespace()),
                })?;
                this.with(&r).resolve_refs(state)?;
                PayloadType::Ref(r)
            }
            PayloadType::Ref(r) => {
                this.with(r).resolve_refs(state)?;
                PayloadType::Ref(*r)
            }
            PayloadType::Array(elem) => PayloadType::array(this.with(&**elem).resolve_refs(state)?),
            PayloadType::Map(value) => PayloadType::map(this.with(&**value).resolve_refs(state)?),
            PayloadType::Option(some) => PayloadType::option(this.with(&**some).resolve_refs(state)?),
            PayloadType::Tuple(elems) => PayloadType::Tuple(
                elems
                    .iter()
                    .map(|e| this.with(e).resolve_refs(state))
                    .collect::<Result<_, _>>()?,
            ),
            scalar => scalar.clone(),
        })
    }
}

impl ResolveRefs for TypeRef {
    type Output = ();
    fn resolve_refs(this: WithTypespace<'_, Self>, state: &mut ResolveRefState) -> Result<Self::Output, DeferredTypeError> {
        let r = *this.ty();
        if state.stack.contains(&r) {
            return Ok(());
        }
        let def = this.typespace().get(r).ok_or_else(|| DeferredTypeError {
            name: r.to_string().into(),
            referenced_from: state.referenced_from(this.typespace()),
        })?;
        state.stack.push(r);
        let ret = match def {
            TypeDef::Union(union) => this.with(union).resolve_refs(state),
            TypeDef::Record(record) => this.with(record).resolve_refs(state),
        };
        state.stack.pop();
        ret
    }
}

impl ResolveRefs for UnionType {
    type Output = ();
    fn resolve_refs(this: WithTypespace<'_, Self>, state: &mut ResolveRefState) -> Result<Self::Output, DeferredTypeError> {
        for ty in this.ty().variants().iter().filter_map(|v| v.payload.as_ref()) {
            this.with(ty).resolve_refs(state)?;
        }
        Ok(())
    }
}

impl ResolveRefs for RecordType {
    type Output = ();
    fn resolve_refs(this: WithTypespace<'_, Self>, state: &mut ResolveRefState) -> Result<Self::Output, DeferredTypeError> {
        for field in &this.ty().fields {
            this.with(&field.ty).resolve_refs(state)?;
        }
        Ok(())
    }
}

impl<T: ResolveRefs + ?Sized> WithTypespace<'_, T> {
    /// Resolves every name reachable from this type, continuing the walk in `state`.
    pub fn resolve_refs(self, state: &mut ResolveRefState) -> Result<T::Output, DeferredTypeError> {
        T::resolve_refs(self, state)
    }
}

/// Checks what can only be checked about the payload of `variant`
/// under internal tagging once its type is `resolved`:
/// the payload must not carry a field with the same name as the tag field.
///
/// A nested union tagged through the same field collides too,
/// and so does a union nesting itself under internal tagging.
pub(crate) fn check_internal_payload(
    ts: &Typespace,
    union: &UnionType,
    variant: &VariantDescriptor,
    resolved: &PayloadType,
) -> Result<(), DeclarationError> {
    let Tagging::Internal { tag } = &union.tagging else {
        return Ok(());
    };
    let PayloadType::Ref(r) = resolved else {
        return Ok(());
    };
    let collides = match ts.get(*r) {
        Some(TypeDef::Record(record)) => record.field(tag).is_some(),
        Some(TypeDef::Union(inner)) => inner.tagging.tag_field() == Some(&**tag),
        None => false,
    };
    if collides {
        return Err(DeclarationError::TagFieldCollision {
            union: union.name.clone(),
            variant: variant.declared_name.clone(),
            field: tag.clone(),
        });
    }
    Ok(())
}
