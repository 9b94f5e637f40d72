//! The three conventions for marking which variant of a union a wire tree holds.
//!
//! For a variant `Foo` with payload `{"x": 1}` and a payload-less variant `Bar`:
//!
//! | Tagging                                | `Foo(..)`                             | `Bar`            |
//! |----------------------------------------|---------------------------------------|------------------|
//! | External                               | `{"Foo": {"x": 1}}`                   | `"Bar"`          |
//! | Internal, tag `type`                   | `{"type": "Foo", "x": 1}`             | `{"type": "Bar"}`|
//! | Adjacent, tag `tag`, content `payload` | `{"tag": "Foo", "payload": {"x": 1}}` | `{"tag": "Bar"}` |

mod adjacent;
mod external;
mod internal;

use crate::codec::CompiledVariant;
use crate::error::{CodecError, DeclarationError, EncodeError, JsonKind, ValidationErrorKind};
use crate::options::EncodeOptions;
use crate::schema::SchemaNode;
use serde_json::Value as Json;
use std::borrow::Cow;
use std::fmt;

/// How a union marks the active variant on the wire.
///
/// Fixed when the union is declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Tagging {
    /// `{wire_name: payload}`, or the bare `wire_name` for payload-less variants.
    #[default]
    External,
    /// `{tag: wire_name, ..payload_fields}`. Payloads must serialize to objects.
    Internal { tag: Box<str> },
    /// `{tag: wire_name, content: payload}`, with `content` left out for payload-less variants.
    Adjacent { tag: Box<str>, content: Box<str> },
}

/// A wire tree taken apart by a [`Tagging`].
#[derive(Debug)]
pub(crate) struct Split<'t> {
    pub wire_name: &'t str,
    pub payload: Option<Cow<'t, Json>>,
}

impl Tagging {
    pub fn internal(tag: impl Into<Box<str>>) -> Self {
        Self::Internal { tag: tag.into() }
    }

    pub fn adjacent(tag: impl Into<Box<str>>, content: impl Into<Box<str>>) -> Self {
        Self::Adjacent {
            tag: tag.into(),
            content: content.into(),
        }
    }

    /// Selects the tagging from optional field names:
    /// neither means external, a tag alone internal, and both adjacent.
    pub fn from_fields(union: &str, tag: Option<&str>, content: Option<&str>) -> Result<Self, DeclarationError> {
        match (tag, content) {
            (None, None) => Ok(Self::External),
            (Some(tag), None) => Ok(Self::internal(tag)),
            (Some(tag), Some(content)) => Ok(Self::adjacent(tag, content)),
            (None, Some(_)) => Err(DeclarationError::InvalidTagging {
                union: union.into(),
                reason: "a content field requires a tag field",
            }),
        }
    }

    /// Returns the name of the field holding the wire name, if any.
    pub fn tag_field(&self) -> Option<&str> {
        match self {
            Self::External => None,
            Self::Internal { tag } | Self::Adjacent { tag, .. } => Some(tag),
        }
    }

    pub(crate) fn check(&self, union: &str) -> Result<(), DeclarationError> {
        let invalid = |reason| {
            Err(DeclarationError::InvalidTagging {
                union: union.into(),
                reason,
            })
        };
        match self {
            Self::External => Ok(()),
            Self::Internal { tag } if tag.is_empty() => invalid("the tag field name is empty"),
            Self::Internal { .. } => Ok(()),
            Self::Adjacent { tag, content } if tag.is_empty() || content.is_empty() => {
                invalid("the tag and content field names must not be empty")
            }
            Self::Adjacent { tag, content } if tag == content => invalid("the tag and content fields coincide"),
            Self::Adjacent { .. } => Ok(()),
        }
    }

    /// Takes `tree` apart into the wire name and the raw payload tree, if any.
    pub(crate) fn split<'t>(&self, union: &str, tree: &'t Json) -> Result<Split<'t>, CodecError> {
        match self {
            Self::External => external::split(union, tree),
            Self::Internal { tag } => internal::split(union, tag, tree),
            Self::Adjacent { tag, content } => adjacent::split(union, tag, content, tree),
        }
    }

    /// Returns the key below which payload validation errors are reported.
    pub(crate) fn payload_key<'a>(&'a self, wire_name: &'a str) -> Option<&'a str> {
        match self {
            Self::External => Some(wire_name),
            Self::Internal { .. } => None,
            Self::Adjacent { content, .. } => Some(content),
        }
    }

    /// Returns whether `payload`, as split off, is acceptable for a payload-less variant.
    pub(crate) fn accepts_as_empty(&self, payload: Option<&Json>) -> bool {
        match self {
            // The fields left over after popping the tag are ignored.
            Self::Internal { .. } => true,
            Self::External | Self::Adjacent { .. } => matches!(payload, None | Some(Json::Null)),
        }
    }

    /// Assembles the wire tree of `variant` carrying the serialized `payload`.
    pub(crate) fn join(
        &self,
        union: &str,
        variant: &CompiledVariant,
        payload: Option<Json>,
        opts: EncodeOptions,
    ) -> Result<Json, EncodeError> {
        match self {
            Self::External => Ok(external::join(&variant.wire_name, payload, opts)),
            Self::Internal { tag } => internal::join(union, variant, tag, payload),
            Self::Adjacent { tag, content } => Ok(adjacent::join(&variant.wire_name, tag, content, payload)),
        }
    }

    /// Returns the schema of a union with these `variants`,
    /// given as wire names paired with payload schemas.
    pub(crate) fn schema(&self, variants: Vec<(Box<str>, Option<SchemaNode>)>) -> SchemaNode {
        match self {
            Self::External => external::schema(variants),
            Self::Internal { tag } => internal::schema(tag, variants),
            Self::Adjacent { tag, content } => adjacent::schema(tag, content, variants),
        }
    }
}

impl fmt::Display for Tagging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => f.write_str("external"),
            Self::Internal { tag } => write!(f, "internal (tag `{tag}`)"),
            Self::Adjacent { tag, content } => write!(f, "adjacent (tag `{tag}`, content `{content}`)"),
        }
    }
}

/// Reads the string held by the tag field `tag` of `obj`.
fn read_tag<'t>(union: &str, tag: &str, obj: &'t serde_json::Map<String, Json>) -> Result<&'t str, CodecError> {
    match obj.get(tag) {
        Some(Json::String(wire_name)) => Ok(wire_name),
        Some(other) => Err(CodecError::from(ValidationErrorKind::TagNotAString {
            field: tag.into(),
            found: JsonKind::of(other),
        })
        .at_key(tag)),
        None => Err(ValidationErrorKind::MissingTagField {
            union: union.into(),
            field: tag.into(),
        }
        .into()),
    }
}
