use super::Split;
use crate::error::{CodecError, ValidationError, ValidationErrorKind};
use crate::options::EncodeOptions;
use crate::schema::SchemaNode;
use serde_json::{Map, Value as Json};
use std::borrow::Cow;

pub(super) fn split<'t>(union: &str, tree: &'t Json) -> Result<Split<'t>, CodecError> {
    match tree {
        // A bare string is the same as `{string: null}`.
        Json::String(wire_name) => Ok(Split {
            wire_name,
            payload: None,
        }),
        Json::Object(obj) => match obj.iter().next() {
            Some((wire_name, payload)) if obj.len() == 1 => Ok(Split {
                wire_name,
                payload: Some(Cow::Borrowed(payload)),
            }),
            _ => Err(ValidationErrorKind::ExpectedSingleKey {
                union: union.into(),
                found: obj.len(),
            }
            .into()),
        },
        _ => Err(ValidationError::invalid_type("a string or an object", tree).into()),
    }
}

pub(super) fn join(wire_name: &str, payload: Option<Json>, opts: EncodeOptions) -> Json {
    match payload {
        None if !opts.empty_variant_as_object => Json::String(wire_name.into()),
        payload => {
            let mut obj = Map::new();
            obj.insert(wire_name.into(), payload.unwrap_or(Json::Null));
            Json::Object(obj)
        }
    }
}

pub(super) fn schema(variants: Vec<(Box<str>, Option<SchemaNode>)>) -> SchemaNode {
    let single_key = |wire_name: Box<str>, node| SchemaNode::Object {
        properties: vec![(wire_name.clone(), node)],
        required: vec![wire_name],
        additional_properties: false,
    };
    let choices = variants
        .into_iter()
        .flat_map(|(wire_name, payload)| match payload {
            Some(node) => vec![single_key(wire_name, node)],
            None => vec![
                SchemaNode::Const(wire_name.clone()),
                single_key(wire_name, SchemaNode::Null),
            ],
        })
        .collect();
    SchemaNode::AnyOf(choices)
}
