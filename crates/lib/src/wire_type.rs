//! The validate / serialize / schema triad shared by payload types, records and unions.
//!
//! Unions implement it too, which is what lets them nest anywhere a payload type can appear:
//! as the payload of another union, as a record field, or as the element of a list.

use crate::error::{CodecError, DeferredTypeError, EncodeError, ValidationError, ValidationErrorKind};
use crate::options::EncodeOptions;
use crate::schema::{Definitions, SchemaNode};
use crate::typespace::TypeDef;
use crate::{Json, PayloadKind, PayloadType, RecordType, TypeRef, UnionCodec, Value, WithTypespace};
use serde_json::{Map, Number};

/// A type that knows its wire representation.
pub trait WireType {
    /// Returns the schema of this type, adding named definitions to `defs`.
    fn generate_schema(&self, defs: &mut Definitions) -> Result<SchemaNode, CodecError>;

    /// Converts the wire tree `tree` into a value of this type.
    fn validate(&self, tree: &Json) -> Result<Value, CodecError>;

    /// Converts `value`, a value of this type, into a wire tree.
    fn serialize(&self, value: &Value, opts: EncodeOptions) -> Result<Json, CodecError>;
}

fn mismatch(expected: &impl ToString, value: &Value) -> CodecError {
    EncodeError::TypeMismatch {
        expected: expected.to_string(),
        found: value.kind(),
    }
    .into()
}

impl<'a> WithTypespace<'a, PayloadType> {
    /// Returns the declared type this names or refers to.
    fn declared(&self) -> Result<(TypeRef, &'a TypeDef), CodecError> {
        let ts = self.typespace();
        let r = match self.ty() {
            PayloadType::Named(name) => ts.lookup(name),
            PayloadType::Ref(r) => Some(*r),
            _ => None,
        };
        r.and_then(|r| Some((r, ts.get(r)?))).ok_or_else(|| {
            DeferredTypeError {
                name: self.ty().to_string().into(),
                referenced_from: self.ty().to_string().into(),
            }
            .into()
        })
    }
}

impl WireType for WithTypespace<'_, PayloadType> {
    fn generate_schema(&self, defs: &mut Definitions) -> Result<SchemaNode, CodecError> {
        Ok(match self.ty() {
            PayloadType::Any => SchemaNode::Any,
            PayloadType::Null => SchemaNode::Null,
            PayloadType::Bool => SchemaNode::Bool,
            PayloadType::I64 => SchemaNode::Integer { unsigned: false },
            PayloadType::U64 => SchemaNode::Integer { unsigned: true },
            PayloadType::F64 => SchemaNode::Number,
            PayloadType::String => SchemaNode::String,
            PayloadType::Array(elem) => SchemaNode::List(Box::new(self.with(&**elem).generate_schema(defs)?)),
            PayloadType::Tuple(elems) => SchemaNode::Tuple(
                elems
                    .iter()
                    .map(|e| self.with(e).generate_schema(defs))
                    .collect::<Result<_, _>>()?,
            ),
            PayloadType::Map(value) => SchemaNode::Dict(Box::new(self.with(&**value).generate_schema(defs)?)),
            PayloadType::Option(some) => SchemaNode::Nullable(Box::new(self.with(&**some).generate_schema(defs)?)),
            PayloadType::Named(_) | PayloadType::Ref(_) => match self.declared()? {
                (r, TypeDef::Union(_)) => self.typespace().codec(r)?.generate_schema(defs)?,
                (_, TypeDef::Record(record)) => self.with(record).generate_schema(defs)?,
            },
        })
    }

    fn validate(&self, tree: &Json) -> Result<Value, CodecError> {
        let invalid = |expected| -> CodecError { ValidationError::invalid_type(expected, tree).into() };
        Ok(match (self.ty(), tree) {
            (PayloadType::Any, tree) => Value::from_json(tree),
            (PayloadType::Null, Json::Null) => Value::Null,
            (PayloadType::Null, _) => return Err(invalid("null")),
            (PayloadType::Bool, Json::Bool(b)) => Value::Bool(*b),
            (PayloadType::Bool, _) => return Err(invalid("a boolean")),
            (PayloadType::I64, Json::Number(n)) => match n.as_i64() {
                Some(x) => Value::I64(x),
                None if n.is_u64() => return Err(out_of_range(n, "a signed 64-bit integer")),
                None => return Err(invalid("an integer")),
            },
            (PayloadType::I64, _) => return Err(invalid("an integer")),
            (PayloadType::U64, Json::Number(n)) => match n.as_u64() {
                Some(x) => Value::U64(x),
                None if n.is_i64() => return Err(out_of_range(n, "an unsigned 64-bit integer")),
                None => return Err(invalid("an unsigned integer")),
            },
            (PayloadType::U64, _) => return Err(invalid("an unsigned integer")),
            (PayloadType::F64, Json::Number(n)) => Value::F64(n.as_f64().ok_or_else(|| invalid("a number"))?),
            (PayloadType::F64, _) => return Err(invalid("a number")),
            (PayloadType::String, Json::String(s)) => Value::String(s.clone()),
            (PayloadType::String, _) => return Err(invalid("a string")),
            (PayloadType::Array(elem), Json::Array(elems)) => Value::Array(
                elems
                    .iter()
                    .enumerate()
                    .map(|(i, e)| self.with(&**elem).validate(e).map_err(|err| err.at_index(i)))
                    .collect::<Result<_, _>>()?,
            ),
            (PayloadType::Array(_), _) => return Err(invalid("an array")),
            (PayloadType::Tuple(tys), Json::Array(elems)) => {
                if tys.len() != elems.len() {
                    return Err(ValidationErrorKind::InvalidLength {
                        expected: tys.len(),
                        found: elems.len(),
                    }
                    .into());
                }
                Value::Array(
                    tys.iter()
                        .zip(elems)
                        .enumerate()
                        .map(|(i, (ty, e))| self.with(ty).validate(e).map_err(|err| err.at_index(i)))
                        .collect::<Result<_, _>>()?,
                )
            }
            (PayloadType::Tuple(_), _) => return Err(invalid("an array")),
            (PayloadType::Map(value), Json::Object(obj)) => Value::Map(
                obj.iter()
                    .map(|(k, v)| {
                        let v = self.with(&**value).validate(v).map_err(|err| err.at_key(k))?;
                        Ok((k.clone(), v))
                    })
                    .collect::<Result<_, CodecError>>()?,
            ),
            (PayloadType::Map(_), _) => return Err(invalid("an object")),
            (PayloadType::Option(_), Json::Null) => Value::Null,
            (PayloadType::Option(some), tree) => self.with(&**some).validate(tree)?,
            (PayloadType::Named(_) | PayloadType::Ref(_), tree) => match self.declared()? {
                (r, TypeDef::Union(_)) => self.typespace().codec(r)?.validate(tree)?,
                (_, TypeDef::Record(record)) => self.with(record).validate(tree)?,
            },
        })
    }

    fn serialize(&self, value: &Value, opts: EncodeOptions) -> Result<Json, CodecError> {
        Ok(match (self.ty(), value) {
            (PayloadType::Any, value) => any_to_json(value)?,
            (PayloadType::Null | PayloadType::Option(_), Value::Null) => Json::Null,
            (PayloadType::Bool, Value::Bool(b)) => Json::Bool(*b),
            (PayloadType::I64, Value::I64(x)) => Json::from(*x),
            (PayloadType::U64, Value::U64(x)) => Json::from(*x),
            (PayloadType::F64, Value::F64(x)) => float(*x)?,
            (PayloadType::String, Value::String(s)) => Json::String(s.clone()),
            (PayloadType::Array(elem), Value::Array(elems)) => Json::Array(
                elems
                    .iter()
                    .map(|e| self.with(&**elem).serialize(e, opts))
                    .collect::<Result<_, _>>()?,
            ),
            (PayloadType::Tuple(tys), Value::Array(elems)) if tys.len() == elems.len() => Json::Array(
                tys.iter()
                    .zip(elems)
                    .map(|(ty, e)| self.with(ty).serialize(e, opts))
                    .collect::<Result<_, _>>()?,
            ),
            (PayloadType::Map(ty), Value::Map(entries)) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.with(&**ty).serialize(v, opts)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
            (PayloadType::Option(some), value) => self.with(&**some).serialize(value, opts)?,
            (PayloadType::Named(_) | PayloadType::Ref(_), value) => match self.declared()? {
                (r, TypeDef::Union(_)) => self.typespace().codec(r)?.serialize(value, opts)?,
                (_, TypeDef::Record(record)) => self.with(record).serialize(value, opts)?,
            },
            (ty, value) => return Err(mismatch(ty, value)),
        })
    }
}

/// The deepest nesting of arrays and objects accepted when decoding,
/// the same limit `serde_json` applies while parsing text.
pub const MAX_DEPTH: usize = 128;

/// Rejects trees nesting more than [`MAX_DEPTH`] arrays and objects,
/// which would otherwise exhaust the stack of the recursive decoders.
pub(crate) fn check_depth(tree: &Json) -> Result<(), CodecError> {
    let mut stack = vec![(tree, 1)];
    while let Some((tree, depth)) = stack.pop() {
        match tree {
            Json::Array(_) | Json::Object(_) if depth > MAX_DEPTH => {
                return Err(ValidationErrorKind::TooDeep { limit: MAX_DEPTH }.into());
            }
            Json::Array(elems) => stack.extend(elems.iter().map(|e| (e, depth + 1))),
            Json::Object(obj) => stack.extend(obj.values().map(|v| (v, depth + 1))),
            _ => {}
        }
    }
    Ok(())
}

fn out_of_range(n: &Number, expected: &'static str) -> CodecError {
    ValidationErrorKind::OutOfRange {
        value: n.to_string().into(),
        expected,
    }
    .into()
}

fn float(x: f64) -> Result<Json, CodecError> {
    Number::from_f64(x)
        .map(Json::Number)
        .ok_or_else(|| EncodeError::NonFiniteFloat { value: x }.into())
}

/// Serializes an untyped value.
///
/// Only the values [`Value::from_json`] produces are accepted,
/// so that decoding the tree yields `value` again.
fn any_to_json(value: &Value) -> Result<Json, CodecError> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::I64(x) => Json::from(*x),
        Value::U64(x) if i64::try_from(*x).is_err() => Json::from(*x),
        Value::F64(x) => float(*x)?,
        Value::String(s) => Json::String(s.clone()),
        Value::Array(elems) => Json::Array(elems.iter().map(any_to_json).collect::<Result<_, _>>()?),
        Value::Map(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), any_to_json(v)?)))
                .collect::<Result<_, CodecError>>()?,
        ),
        value => return Err(mismatch(&PayloadType::Any, value)),
    })
}

impl WireType for WithTypespace<'_, RecordType> {
    fn generate_schema(&self, defs: &mut Definitions) -> Result<SchemaNode, CodecError> {
        let record = self.ty();
        if !defs.contains(&record.name) {
            defs.reserve(&record.name);
            let properties = record
                .fields
                .iter()
                .map(|field| Ok((field.name.clone(), self.with(&field.ty).generate_schema(defs)?)))
                .collect::<Result<_, CodecError>>()?;
            let required = record
                .fields
                .iter()
                .filter(|field| !field.is_optional())
                .map(|field| field.name.clone())
                .collect();
            let node = SchemaNode::Object {
                properties,
                required,
                additional_properties: !record.deny_unknown_fields,
            };
            defs.insert(&record.name, node);
        }
        Ok(SchemaNode::Ref(record.name.clone()))
    }

    fn validate(&self, tree: &Json) -> Result<Value, CodecError> {
        let record = self.ty();
        let Json::Object(obj) = tree else {
            return Err(ValidationError::invalid_type("an object", tree).into());
        };
        if record.deny_unknown_fields {
            if let Some(key) = obj.keys().find(|key| record.field(key).is_none()) {
                return Err(CodecError::from(ValidationErrorKind::UnknownField {
                    record: record.name.clone(),
                    field: key.as_str().into(),
                })
                .at_key(key));
            }
        }
        let fields = record
            .fields
            .iter()
            .map(|field| {
                let value = match obj.get(&*field.name) {
                    Some(v) => self.with(&field.ty).validate(v).map_err(|err| err.at_key(&field.name))?,
                    None if field.is_optional() => Value::Null,
                    None => {
                        return Err(CodecError::from(ValidationErrorKind::MissingField {
                            record: record.name.clone(),
                            field: field.name.clone(),
                        }))
                    }
                };
                Ok((field.name.to_string(), value))
            })
            .collect::<Result<_, CodecError>>()?;
        Ok(Value::Record(fields))
    }

    fn serialize(&self, value: &Value, opts: EncodeOptions) -> Result<Json, CodecError> {
        let record = self.ty();
        let Value::Record(fields) = value else {
            return Err(mismatch(&record.name, value));
        };
        if let Some(key) = fields.keys().find(|key| record.field(key).is_none()) {
            return Err(EncodeError::UnknownField {
                record: record.name.clone(),
                field: key.as_str().into(),
            }
            .into());
        }
        let mut obj = Map::new();
        for field in &record.fields {
            let json = match fields.get(&*field.name) {
                Some(v) => self.with(&field.ty).serialize(v, opts)?,
                None if field.is_optional() => Json::Null,
                None => {
                    return Err(EncodeError::MissingField {
                        record: record.name.clone(),
                        field: field.name.clone(),
                    }
                    .into())
                }
            };
            obj.insert(field.name.to_string(), json);
        }
        Ok(Json::Object(obj))
    }
}

impl WireType for WithTypespace<'_, UnionCodec> {
    fn generate_schema(&self, defs: &mut Definitions) -> Result<SchemaNode, CodecError> {
        let codec = self.ty();
        if !defs.contains(&codec.name) {
            defs.reserve(&codec.name);
            let variants = codec
                .variants
                .iter()
                .map(|variant| {
                    let node = match &variant.kind {
                        PayloadKind::Empty => return Ok((variant.wire_name.clone(), None)),
                        PayloadKind::Scalar(ty) => self.with(ty).generate_schema(defs)?,
                        PayloadKind::NestedUnion(r) => self.typespace().codec(*r)?.generate_schema(defs)?,
                    };
                    let node = if variant.implicit_wrapper {
                        let name = format!("{}.{}", codec.name, variant.declared_name);
                        defs.insert(&name, node);
                        SchemaNode::Ref(name.into())
                    } else {
                        node
                    };
                    Ok((variant.wire_name.clone(), Some(node)))
                })
                .collect::<Result<Vec<_>, CodecError>>()?;
            defs.insert(&codec.name, codec.tagging.schema(variants));
        }
        Ok(SchemaNode::Ref(codec.name.clone()))
    }

    fn validate(&self, tree: &Json) -> Result<Value, CodecError> {
        self.decode_inner(tree).map(Value::from)
    }

    fn serialize(&self, value: &Value, opts: EncodeOptions) -> Result<Json, CodecError> {
        match value {
            Value::Union(uv) => self.encode(uv, opts),
            value => Err(mismatch(&self.ty().name, value)),
        }
    }
}
