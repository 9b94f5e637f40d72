use crate::error::DeclarationError;
use crate::PayloadType;

/// A named field of a [`RecordType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: Box<str>,
    pub ty: PayloadType,
}

impl Field {
    pub fn new(name: impl Into<Box<str>>, ty: PayloadType) -> Self {
        Self { name: name.into(), ty }
    }

    /// Fields of an option type may be left out on the wire.
    pub fn is_optional(&self) -> bool {
        self.ty.is_option()
    }
}

/// A declared record type, i.e., a structured object with named fields.
///
/// On the wire, a record is an object with one key per field.
/// Keys not named by any field are ignored on decode
/// unless [`RecordType::deny_unknown_fields`] was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordType {
    pub name: Box<str>,
    pub fields: Vec<Field>,
    pub deny_unknown_fields: bool,
}

impl RecordType {
    /// Returns a record type without fields.
    pub fn new(name: impl Into<Box<str>>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            deny_unknown_fields: false,
        }
    }

    /// Appends a field named `name` of type `ty`.
    pub fn with_field(mut self, name: impl Into<Box<str>>, ty: PayloadType) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    /// Makes decoding reject keys not named by any field.
    pub fn deny_unknown_fields(mut self) -> Self {
        self.deny_unknown_fields = true;
        self
    }

    /// Returns the field named `name`, if any.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| &*f.name == name)
    }

    pub(crate) fn check_fields(&self) -> Result<(), DeclarationError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(DeclarationError::DuplicateField {
                    record: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_fields_are_rejected() {
        let rec = RecordType::new("Point")
            .with_field("x", PayloadType::I64)
            .with_field("x", PayloadType::F64);
        assert_eq!(
            rec.check_fields(),
            Err(DeclarationError::DuplicateField {
                record: "Point".into(),
                field: "x".into()
            })
        );
    }

    #[test]
    fn option_fields_are_optional() {
        let rec = RecordType::new("Post")
            .with_field("title", PayloadType::String)
            .with_field("draft", PayloadType::option(PayloadType::Bool));
        assert!(rec.check_fields().is_ok());
        assert!(!rec.field("title").unwrap().is_optional());
        assert!(rec.field("draft").unwrap().is_optional());
        assert!(rec.field("body").is_none());
    }
}
