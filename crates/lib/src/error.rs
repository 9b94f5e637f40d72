use crate::TypeRef;
use derive_more::Display;
use serde_json::Value as Json;
use std::fmt;
use thiserror::Error;

/// Raised while declaring a union or record.
///
/// A type that failed to declare is unusable; callers are expected to abort initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Union `{union}`: variants `{first}` and `{second}` both use the wire name `{wire_name}`")]
    DuplicateWireName {
        union: Box<str>,
        wire_name: Box<str>,
        first: Box<str>,
        second: Box<str>,
    },
    #[error("Union `{union}`: variant `{variant}` is declared more than once")]
    DuplicateVariant { union: Box<str>, variant: Box<str> },
    #[error("Record `{record}`: field `{field}` is declared more than once")]
    DuplicateField { record: Box<str>, field: Box<str> },
    #[error("Type `{name}` is already declared as {existing}")]
    DuplicateTypeName { name: Box<str>, existing: TypeRef },
    #[error("Union `{union}`: variant `{variant}` carries `{payload}`, which cannot be merged into an internally tagged object")]
    NonRecordPayload {
        union: Box<str>,
        variant: Box<str>,
        payload: String,
    },
    #[error("Union `{union}`: the payload of variant `{variant}` has a field `{field}` colliding with the tag field")]
    TagFieldCollision {
        union: Box<str>,
        variant: Box<str>,
        field: Box<str>,
    },
    #[error("Union `{union}`: {reason}")]
    InvalidTagging { union: Box<str>, reason: &'static str },
    #[error("Union `{union}` declares more than {} variants", u16::MAX)]
    TooManyVariants { union: Box<str> },
    #[error("The typespace ran out of type references")]
    TooManyTypes,
}

/// A forward-referenced payload type never became resolvable.
///
/// Raised the first time a codec is requested, not at declaration time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Type `{name}` referenced from `{referenced_from}` was never declared")]
pub struct DeferredTypeError {
    pub name: Box<str>,
    pub referenced_from: Box<str>,
}

/// Raised when constructing a [`UnionValue`](crate::UnionValue) by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Variant `{union}.{variant}` carries no payload, but one was supplied")]
    PayloadForEmpty { union: Box<str>, variant: Box<str> },
    #[error("Variant `{union}.{variant}` requires a payload")]
    MissingPayload { union: Box<str>, variant: Box<str> },
    #[error("Union `{union}` has no variant named `{variant}`")]
    UnknownVariant { union: Box<str>, variant: Box<str> },
    #[error("`{name}` is not a declared union")]
    NotAUnion { name: Box<str> },
}

/// The JSON shape of a wire tree, used in error messages.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    #[display(fmt = "null")]
    Null,
    #[display(fmt = "a boolean")]
    Bool,
    #[display(fmt = "a number")]
    Number,
    #[display(fmt = "a string")]
    String,
    #[display(fmt = "an array")]
    Array,
    #[display(fmt = "an object")]
    Object,
}

impl JsonKind {
    pub fn of(tree: &Json) -> Self {
        match tree {
            Json::Null => Self::Null,
            Json::Bool(_) => Self::Bool,
            Json::Number(_) => Self::Number,
            Json::String(_) => Self::String,
            Json::Array(_) => Self::Array,
            Json::Object(_) => Self::Object,
        }
    }
}

/// One step into a wire tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(Box<str>),
    Index(usize),
}

/// The location of a validation failure inside the wire tree, e.g. `$.feed[2].Post`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WirePath(pub Vec<PathSegment>);

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("expected {expected}, found {found}")]
    InvalidType { expected: &'static str, found: JsonKind },
    #[error("unknown tag `{tag}` for union `{union}`")]
    UnknownTag { union: Box<str>, tag: Box<str> },
    #[error("missing tag field `{field}` for union `{union}`")]
    MissingTagField { union: Box<str>, field: Box<str> },
    #[error("tag field `{field}` must be a string, found {found}")]
    TagNotAString { field: Box<str>, found: JsonKind },
    #[error("externally tagged union `{union}` expects exactly one key, found {found}")]
    ExpectedSingleKey { union: Box<str>, found: usize },
    #[error("variant `{union}.{variant}` carries no payload, found {found}")]
    UnexpectedPayload {
        union: Box<str>,
        variant: Box<str>,
        found: JsonKind,
    },
    #[error("missing required field `{field}` of `{record}`")]
    MissingField { record: Box<str>, field: Box<str> },
    #[error("unknown field `{field}` for `{record}`")]
    UnknownField { record: Box<str>, field: Box<str> },
    #[error("expected {expected} elements, found {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("number `{value}` is out of range for {expected}")]
    OutOfRange { value: Box<str>, expected: &'static str },
    #[error("arrays and objects nest deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// The wire tree does not match the declared shape.
///
/// Raised at decode time; recoverable by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at `{path}`")]
pub struct ValidationError {
    pub path: WirePath,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind) -> Self {
        Self {
            path: WirePath::default(),
            kind,
        }
    }

    pub(crate) fn invalid_type(expected: &'static str, found: &Json) -> Self {
        Self::new(ValidationErrorKind::InvalidType {
            expected,
            found: JsonKind::of(found),
        })
    }

    fn prepend(mut self, segment: PathSegment) -> Self {
        self.path.0.insert(0, segment);
        self
    }
}

impl From<ValidationErrorKind> for ValidationError {
    fn from(kind: ValidationErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A union value could not be turned into a wire tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("internally tagged variant `{union}.{variant}` needs an object payload, found {found}")]
    PayloadNotAnObject {
        union: Box<str>,
        variant: Box<str>,
        found: JsonKind,
    },
    #[error("the payload of `{union}.{variant}` already has a field `{field}` colliding with the tag field")]
    TagFieldCollision {
        union: Box<str>,
        variant: Box<str>,
        field: Box<str>,
    },
    #[error("the value belongs to {found}, not to union `{union}`")]
    ForeignValue { union: Box<str>, found: TypeRef },
    #[error("union `{union}` has no variant #{variant}")]
    UnknownVariantId { union: Box<str>, variant: u16 },
    #[error("expected a value of type `{expected}`, found {found}")]
    TypeMismatch { expected: String, found: &'static str },
    #[error("the value of `{record}` lacks the required field `{field}`")]
    MissingField { record: Box<str>, field: Box<str> },
    #[error("the value of `{record}` has a field `{field}` the record does not declare")]
    UnknownField { record: Box<str>, field: Box<str> },
    #[error("`{value}` cannot be represented as a JSON number")]
    NonFiniteFloat { value: f64 },
}

/// A textual payload type expression failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeExprError {
    #[error("unexpected end of type expression `{expr}`")]
    UnexpectedEnd { expr: Box<str> },
    #[error("unexpected `{found}` at offset {offset} in type expression `{expr}`")]
    Unexpected { expr: Box<str>, found: char, offset: usize },
    #[error("`{name}` expects {expected} type argument(s), found {found}")]
    Arity {
        name: Box<str>,
        expected: &'static str,
        found: usize,
    },
    #[error("dictionary keys must be `str`, found `{found}`")]
    NonStringKey { found: String },
    #[error("`{name}` does not take type arguments")]
    NotGeneric { name: Box<str> },
}

/// Everything that can go wrong once declarations are done.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error(transparent)]
    Deferred(#[from] DeferredTypeError),
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Value(#[from] ValueError),
}

impl From<ValidationErrorKind> for CodecError {
    fn from(kind: ValidationErrorKind) -> Self {
        Self::Validation(kind.into())
    }
}

impl CodecError {
    /// Records that the failure happened below the object key `key`.
    pub(crate) fn at_key(self, key: &str) -> Self {
        match self {
            Self::Validation(err) => Self::Validation(err.prepend(PathSegment::Key(key.into()))),
            err => err,
        }
    }

    /// Records that the failure happened below the array index `idx`.
    pub(crate) fn at_index(self, idx: usize) -> Self {
        match self {
            Self::Validation(err) => Self::Validation(err.prepend(PathSegment::Index(idx))),
            err => err,
        }
    }

    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}
