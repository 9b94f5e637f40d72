//! Schema representation of payload types and unions, rendered as JSON Schema.

use indexmap::IndexMap;
use serde_json::{json, Map, Value as Json};

/// A node of a schema tree.
///
/// Declared unions and records live in [`Definitions`] and are referred to by [`SchemaNode::Ref`],
/// which is how recursive types get a finite schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Any,
    Null,
    Bool,
    Integer { unsigned: bool },
    Number,
    String,
    /// Exactly this string.
    Const(Box<str>),
    List(Box<SchemaNode>),
    Tuple(Vec<SchemaNode>),
    /// An object with arbitrary keys and values of one schema.
    Dict(Box<SchemaNode>),
    Nullable(Box<SchemaNode>),
    Object {
        properties: Vec<(Box<str>, SchemaNode)>,
        required: Vec<Box<str>>,
        additional_properties: bool,
    },
    AnyOf(Vec<SchemaNode>),
    AllOf(Vec<SchemaNode>),
    /// One of `choices`, told apart by the string in the field `discriminator`.
    Tagged {
        discriminator: Box<str>,
        choices: Vec<(Box<str>, SchemaNode)>,
    },
    /// The definition named so.
    Ref(Box<str>),
}

impl SchemaNode {
    /// Renders this node as a JSON Schema fragment.
    pub fn to_json(&self) -> Json {
        match self {
            Self::Any => json!({}),
            Self::Null => json!({"type": "null"}),
            Self::Bool => json!({"type": "boolean"}),
            Self::Integer { unsigned: false } => json!({"type": "integer"}),
            Self::Integer { unsigned: true } => json!({"type": "integer", "minimum": 0}),
            Self::Number => json!({"type": "number"}),
            Self::String => json!({"type": "string"}),
            Self::Const(s) => json!({"const": &**s}),
            Self::List(elem) => json!({"type": "array", "items": elem.to_json()}),
            Self::Tuple(elems) => json!({
                "type": "array",
                "prefixItems": elems.iter().map(Self::to_json).collect::<Vec<_>>(),
                "minItems": elems.len(),
                "maxItems": elems.len(),
            }),
            Self::Dict(value) => json!({"type": "object", "additionalProperties": value.to_json()}),
            Self::Nullable(some) => json!({"anyOf": [some.to_json(), {"type": "null"}]}),
            Self::Object {
                properties,
                required,
                additional_properties,
            } => {
                let properties: Map<_, _> = properties
                    .iter()
                    .map(|(name, node)| (name.to_string(), node.to_json()))
                    .collect();
                let mut obj = json!({
                    "type": "object",
                    "properties": properties,
                    "required": required.iter().map(|r| &**r).collect::<Vec<_>>(),
                });
                if !additional_properties {
                    obj["additionalProperties"] = Json::Bool(false);
                }
                obj
            }
            Self::AnyOf(nodes) => json!({"anyOf": nodes.iter().map(Self::to_json).collect::<Vec<_>>()}),
            Self::AllOf(nodes) => json!({"allOf": nodes.iter().map(Self::to_json).collect::<Vec<_>>()}),
            Self::Tagged { discriminator, choices } => json!({
                "oneOf": choices.iter().map(|(_, node)| node.to_json()).collect::<Vec<_>>(),
                "discriminator": {"propertyName": &**discriminator},
            }),
            Self::Ref(name) => json!({"$ref": format!("#/$defs/{name}")}),
        }
    }
}

/// Named schema definitions, in the order they were first reached.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Definitions {
    defs: IndexMap<Box<str>, SchemaNode>,
}

impl Definitions {
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.defs.get(name)
    }

    /// Claims `name` before its definition is known, so that recursive references stop here.
    pub(crate) fn reserve(&mut self, name: &str) {
        self.defs.insert(name.into(), SchemaNode::Any);
    }

    pub fn insert(&mut self, name: &str, node: SchemaNode) {
        self.defs.insert(name.into(), node);
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Renders a JSON Schema document whose root is `root`.
    pub fn to_json_schema(&self, root: &SchemaNode) -> Json {
        let mut doc = root.to_json();
        if !self.defs.is_empty() {
            let defs: Map<_, _> = self
                .defs
                .iter()
                .map(|(name, node)| (name.to_string(), node.to_json()))
                .collect();
            doc["$defs"] = Json::Object(defs);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn refs_point_into_defs() {
        let mut defs = Definitions::default();
        defs.reserve("Tree");
        defs.insert(
            "Tree",
            SchemaNode::AnyOf(vec![
                SchemaNode::Const("Leaf".into()),
                SchemaNode::Object {
                    properties: vec![("Node".into(), SchemaNode::List(Box::new(SchemaNode::Ref("Tree".into()))))],
                    required: vec!["Node".into()],
                    additional_properties: false,
                },
            ]),
        );
        let doc = defs.to_json_schema(&SchemaNode::Ref("Tree".into()));
        assert_eq!(
            doc,
            json!({
                "$ref": "#/$defs/Tree",
                "$defs": {
                    "Tree": {"anyOf": [
                        {"const": "Leaf"},
                        {
                            "type": "object",
                            "properties": {"Node": {"type": "array", "items": {"$ref": "#/$defs/Tree"}}},
                            "required": ["Node"],
                            "additionalProperties": false,
                        },
                    ]}
                }
            })
        );
    }

    #[test]
    fn tuples_have_fixed_length() {
        let node = SchemaNode::Tuple(vec![SchemaNode::String, SchemaNode::Integer { unsigned: true }]);
        assert_eq!(
            node.to_json(),
            json!({
                "type": "array",
                "prefixItems": [{"type": "string"}, {"type": "integer", "minimum": 0}],
                "minItems": 2,
                "maxItems": 2,
            })
        );
    }
}
