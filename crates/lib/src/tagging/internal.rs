use super::{read_tag, Split};
use crate::codec::CompiledVariant;
use crate::error::{CodecError, EncodeError, JsonKind, ValidationError};
use crate::schema::SchemaNode;
use serde_json::{Map, Value as Json};
use std::borrow::Cow;

pub(super) fn split<'t>(union: &str, tag: &str, tree: &'t Json) -> Result<Split<'t>, CodecError> {
    let Json::Object(obj) = tree else {
        return Err(ValidationError::invalid_type("an object", tree).into());
    };
    let wire_name = read_tag(union, tag, obj)?;
    // Pop the tag; the rest of the object is the payload.
    let rest = obj
        .iter()
        .filter(|(key, _)| *key != tag)
        .map(|(key, val)| (key.clone(), val.clone()))
        .collect();
    Ok(Split {
        wire_name,
        payload: Some(Cow::Owned(Json::Object(rest))),
    })
}

pub(super) fn join(union: &str, variant: &CompiledVariant, tag: &str, payload: Option<Json>) -> Result<Json, EncodeError> {
    let mut obj = Map::new();
    obj.insert(tag.into(), Json::String(variant.wire_name.to_string()));
    match payload {
        None => {}
        Some(Json::Object(fields)) => {
            if fields.contains_key(tag) {
                return Err(EncodeError::TagFieldCollision {
                    union: union.into(),
                    variant: variant.declared_name.clone(),
                    field: tag.into(),
                });
            }
            obj.extend(fields);
        }
        Some(other) => {
            return Err(EncodeError::PayloadNotAnObject {
                union: union.into(),
                variant: variant.declared_name.clone(),
                found: JsonKind::of(&other),
            })
        }
    }
    Ok(Json::Object(obj))
}

pub(super) fn schema(tag: &str, variants: Vec<(Box<str>, Option<SchemaNode>)>) -> SchemaNode {
    let choices = variants
        .into_iter()
        .map(|(wire_name, payload)| {
            let tagged = SchemaNode::Object {
                properties: vec![(tag.into(), SchemaNode::Const(wire_name.clone()))],
                required: vec![tag.into()],
                additional_properties: true,
            };
            let node = match payload {
                Some(node) => SchemaNode::AllOf(vec![tagged, node]),
                None => tagged,
            };
            (wire_name, node)
        })
        .collect();
    SchemaNode::Tagged {
        discriminator: tag.into(),
        choices,
    }
}
