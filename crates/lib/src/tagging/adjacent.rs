use super::{read_tag, Split};
use crate::error::{CodecError, ValidationError};
use crate::schema::SchemaNode;
use serde_json::{Map, Value as Json};
use std::borrow::Cow;

pub(super) fn split<'t>(union: &str, tag: &str, content: &str, tree: &'t Json) -> Result<Split<'t>, CodecError> {
    let Json::Object(obj) = tree else {
        return Err(ValidationError::invalid_type("an object", tree).into());
    };
    Ok(Split {
        wire_name: read_tag(union, tag, obj)?,
        payload: obj.get(content).map(Cow::Borrowed),
    })
}

pub(super) fn join(wire_name: &str, tag: &str, content: &str, payload: Option<Json>) -> Json {
    let mut obj = Map::new();
    obj.insert(tag.into(), Json::String(wire_name.into()));
    if let Some(payload) = payload {
        obj.insert(content.into(), payload);
    }
    Json::Object(obj)
}

pub(super) fn schema(tag: &str, content: &str, variants: Vec<(Box<str>, Option<SchemaNode>)>) -> SchemaNode {
    let choices = variants
        .into_iter()
        .map(|(wire_name, payload)| {
            let mut required = vec![tag.into()];
            if payload.is_some() {
                required.push(content.into());
            }
            let node = SchemaNode::Object {
                properties: vec![
                    (tag.into(), SchemaNode::Const(wire_name.clone())),
                    (content.into(), payload.unwrap_or(SchemaNode::Null)),
                ],
                required,
                additional_properties: false,
            };
            (wire_name, node)
        })
        .collect();
    SchemaNode::Tagged {
        discriminator: tag.into(),
        choices,
    }
}
