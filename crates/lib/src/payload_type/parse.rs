//! Parsing of textual payload type expressions.
//!
//! ```ignore
//! ty   := name ( '[' ty ( ',' ty )* ']' )?
//! name := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! Unknown names become [`PayloadType::Named`] tokens; nothing is resolved here.

use super::PayloadType;
use crate::error::TypeExprError;
use std::iter::Peekable;
use std::str::CharIndices;

/// Parses `expr` into a [`PayloadType`].
pub fn parse_type_expr(expr: &str) -> Result<PayloadType, TypeExprError> {
    let mut parser = Parser {
        expr,
        chars: expr.char_indices().peekable(),
    };
    let ty = parser.ty()?;
    parser.skip_ws();
    match parser.chars.peek() {
        Some(&(offset, found)) => Err(parser.unexpected(offset, found)),
        None => Ok(ty),
    }
}

struct Parser<'a> {
    expr: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn unexpected(&self, offset: usize, found: char) -> TypeExprError {
        TypeExprError::Unexpected {
            expr: self.expr.into(),
            found,
            offset,
        }
    }

    fn end(&self) -> TypeExprError {
        TypeExprError::UnexpectedEnd { expr: self.expr.into() }
    }

    fn name(&mut self) -> Result<&'a str, TypeExprError> {
        self.skip_ws();
        let start = match self.chars.peek() {
            Some(&(start, c)) if c.is_alphabetic() || c == '_' => start,
            Some(&(offset, found)) => return Err(self.unexpected(offset, found)),
            None => return Err(self.end()),
        };
        let mut end = start;
        while let Some((i, c)) = self.chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
            end = i + c.len_utf8();
        }
        Ok(&self.expr[start..end])
    }

    fn args(&mut self) -> Result<Option<Vec<PayloadType>>, TypeExprError> {
        self.skip_ws();
        if self.chars.next_if(|&(_, c)| c == '[').is_none() {
            return Ok(None);
        }
        let mut args = vec![self.ty()?];
        loop {
            self.skip_ws();
            match self.chars.next() {
                Some((_, ',')) => args.push(self.ty()?),
                Some((_, ']')) => return Ok(Some(args)),
                Some((offset, found)) => return Err(self.unexpected(offset, found)),
                None => return Err(self.end()),
            }
        }
    }

    fn ty(&mut self) -> Result<PayloadType, TypeExprError> {
        let name = self.name()?;
        let args = self.args()?;
        let scalar = match name {
            "int" => Some(PayloadType::I64),
            "uint" => Some(PayloadType::U64),
            "float" => Some(PayloadType::F64),
            "str" => Some(PayloadType::String),
            "bool" => Some(PayloadType::Bool),
            "none" | "None" => Some(PayloadType::Null),
            "any" | "Any" => Some(PayloadType::Any),
            _ => None,
        };
        if let Some(scalar) = scalar {
            return match args {
                None => Ok(scalar),
                Some(_) => Err(TypeExprError::NotGeneric { name: name.into() }),
            };
        }

        match (name, args) {
            ("list" | "List", args) => one(name, args).map(PayloadType::array),
            ("Optional" | "option", args) => one(name, args).map(PayloadType::option),
            ("tuple" | "Tuple", Some(args)) => Ok(PayloadType::Tuple(args)),
            ("tuple" | "Tuple", None) => Err(arity(name, "1 or more", 0)),
            ("dict" | "Dict", args) => {
                let [key, value] = two(name, args)?;
                if key != PayloadType::String {
                    return Err(TypeExprError::NonStringKey { found: key.to_string() });
                }
                Ok(PayloadType::map(value))
            }
            (name, None) => Ok(PayloadType::named(name)),
            (name, Some(_)) => Err(TypeExprError::NotGeneric { name: name.into() }),
        }
    }
}

fn arity(name: &str, expected: &'static str, found: usize) -> TypeExprError {
    TypeExprError::Arity {
        name: name.into(),
        expected,
        found,
    }
}

fn one(name: &str, args: Option<Vec<PayloadType>>) -> Result<PayloadType, TypeExprError> {
    let args = args.unwrap_or_default();
    let found = args.len();
    let [arg]: [PayloadType; 1] = args.try_into().map_err(|_| arity(name, "1", found))?;
    Ok(arg)
}

fn two(name: &str, args: Option<Vec<PayloadType>>) -> Result<[PayloadType; 2], TypeExprError> {
    let args = args.unwrap_or_default();
    let found = args.len();
    args.try_into().map_err(|_| arity(name, "2", found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use PayloadType as P;

    #[test]
    fn scalars_and_generics() {
        assert_eq!(parse_type_expr("int").unwrap(), P::I64);
        assert_eq!(parse_type_expr(" list[ str ] ").unwrap(), P::array(P::String));
        assert_eq!(
            parse_type_expr("tuple[str, str]").unwrap(),
            P::Tuple(vec![P::String, P::String])
        );
        assert_eq!(parse_type_expr("dict[str, str]").unwrap(), P::map(P::String));
        assert_eq!(parse_type_expr("Optional[bool]").unwrap(), P::option(P::Bool));
    }

    #[test]
    fn unknown_names_are_deferred() {
        assert_eq!(parse_type_expr("DeferModel").unwrap(), P::named("DeferModel"));
        assert_eq!(
            parse_type_expr("list[ExampleFeed]").unwrap(),
            P::array(P::named("ExampleFeed"))
        );
    }

    #[test]
    fn malformed_expressions() {
        assert_eq!(
            parse_type_expr("list[int"),
            Err(TypeExprError::UnexpectedEnd {
                expr: "list[int".into()
            })
        );
        assert_eq!(
            parse_type_expr("dict[int, str]"),
            Err(TypeExprError::NonStringKey { found: "int".into() })
        );
        assert!(matches!(
            parse_type_expr("list[int, str]"),
            Err(TypeExprError::Arity { found: 2, .. })
        ));
        assert!(matches!(parse_type_expr("int[str]"), Err(TypeExprError::NotGeneric { .. })));
        assert!(matches!(
            parse_type_expr("int]"),
            Err(TypeExprError::Unexpected {
                found: ']',
                offset: 3,
                ..
            })
        ));
    }
}
