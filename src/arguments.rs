//! Directive lookup and typed argument extraction.
//!
//! Every failure is a [`LocalizedError`] scoped to `[field > directive]`.

use std::fmt;

use crate::errors::{localized_field_error, LocalizedError};
use crate::syntax::{Directive, FieldDefinition, Value, ValueKind};

/// The literal kinds an argument can be requested as.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Boolean,
    Enum,
}

impl From<LiteralKind> for ValueKind {
    fn from(kind: LiteralKind) -> Self {
        match kind {
            LiteralKind::Int => ValueKind::Int,
            LiteralKind::Float => ValueKind::Float,
            LiteralKind::String => ValueKind::String,
            LiteralKind::Boolean => ValueKind::Boolean,
            LiteralKind::Enum => ValueKind::Enum,
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ValueKind::from(*self))
    }
}

/// An argument value, typed by the kind it was requested as.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ArgumentValue<'a> {
    Int(i64),
    Float(f64),
    String(&'a str),
    Boolean(bool),
    Enum(&'a str),
}

impl<'a> ArgumentValue<'a> {
    pub fn kind(&self) -> LiteralKind {
        match self {
            ArgumentValue::Int(_) => LiteralKind::Int,
            ArgumentValue::Float(_) => LiteralKind::Float,
            ArgumentValue::String(_) => LiteralKind::String,
            ArgumentValue::Boolean(_) => LiteralKind::Boolean,
            ArgumentValue::Enum(_) => LiteralKind::Enum,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            ArgumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgumentValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&'a str> {
        match self {
            ArgumentValue::Enum(name) => Some(name),
            _ => None,
        }
    }
}

/// Returns the first directive named `name` on `field`.
pub fn get_directive<'a>(field: &'a FieldDefinition, name: &str) -> Option<&'a Directive> {
    field.directives.iter().find(|d| d.name == name)
}

/// Returns the value of argument `name` on `directive`, checked against `expected`.
///
/// - a directive with no argument list at all fails with `Has no arguments.`;
/// - a missing argument is `Ok(None)`, or an error when `required`;
/// - a literal of another kind fails naming both kinds.
pub fn get_argument<'a>(
    directive: &'a Directive,
    field: &FieldDefinition,
    name: &str,
    expected: LiteralKind,
    required: bool,
) -> Result<Option<ArgumentValue<'a>>, LocalizedError> {
    let Some(arguments) = &directive.arguments else {
        return Err(localized_field_error(directive, field, "Has no arguments."));
    };

    let Some(argument) = arguments.iter().find(|arg| arg.name == name) else {
        if required {
            return Err(localized_field_error(
                directive,
                field,
                format!("is missing required argument ({}).", name),
            ));
        }
        return Ok(None);
    };

    let value = match (expected, &argument.value) {
        (LiteralKind::Int, Value::Int(raw)) => ArgumentValue::Int(raw.parse().map_err(|_| {
            localized_field_error(
                directive,
                field,
                format!("Argument {} is out of range for type Int.", name),
            )
        })?),
        (LiteralKind::Float, Value::Float(raw)) => {
            ArgumentValue::Float(raw.parse().map_err(|_| {
                localized_field_error(
                    directive,
                    field,
                    format!("Argument {} is not a valid Float.", name),
                )
            })?)
        }
        (LiteralKind::String, Value::String(string)) => ArgumentValue::String(&string.value),
        (LiteralKind::Boolean, Value::Boolean(b)) => ArgumentValue::Boolean(*b),
        (LiteralKind::Enum, Value::Enum(symbol)) => ArgumentValue::Enum(symbol),
        (expected, actual) => {
            return Err(localized_field_error(
                directive,
                field,
                format!(
                    "Argument {} expected to be of type {} but received {} instead.",
                    name,
                    expected,
                    actual.kind()
                ),
            ))
        }
    };

    Ok(Some(value))
}

/// [`get_argument`] for String arguments.
pub fn get_string_argument<'a>(
    directive: &'a Directive,
    field: &FieldDefinition,
    name: &str,
    required: bool,
) -> Result<Option<&'a str>, LocalizedError> {
    Ok(get_argument(directive, field, name, LiteralKind::String, required)?
        .and_then(|value| value.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, Definition};

    fn first_field(source: &str) -> FieldDefinition {
        let doc = parse(source).unwrap();
        match &doc.definitions[0] {
            Definition::Type(def) => def.fields().unwrap()[0].clone(),
            other => panic!("expected a type definition, got {:?}", other),
        }
    }

    fn message(result: Result<Option<ArgumentValue<'_>>, LocalizedError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_each_literal_kind_is_extracted() {
        let field = first_field(
            r#"type T { f: Int @d(i: -42, x: 1.5, s: "str", b: false, e: BLUE) }"#,
        );
        let d = get_directive(&field, "d").unwrap();

        let cases = [
            ("i", LiteralKind::Int, ArgumentValue::Int(-42)),
            ("x", LiteralKind::Float, ArgumentValue::Float(1.5)),
            ("s", LiteralKind::String, ArgumentValue::String("str")),
            ("b", LiteralKind::Boolean, ArgumentValue::Boolean(false)),
            ("e", LiteralKind::Enum, ArgumentValue::Enum("BLUE")),
        ];
        for (name, kind, expected) in cases {
            let value = get_argument(d, &field, name, kind, true).unwrap();
            assert_eq!(value, Some(expected), "argument {}", name);
            assert_eq!(value.map(|v| v.kind()), Some(kind));
        }
    }

    #[test]
    fn test_optional_missing_argument_is_none() {
        let field = first_field(r#"type T { f: Int @d(a: "x") }"#);
        let d = get_directive(&field, "d").unwrap();
        assert_eq!(get_argument(d, &field, "other", LiteralKind::Int, false), Ok(None));
    }

    #[test]
    fn test_required_missing_argument() {
        let field = first_field(r#"type T { author: Int @AWSLambda(handlr: "x") }"#);
        let d = get_directive(&field, "AWSLambda").unwrap();
        assert_eq!(
            message(get_argument(d, &field, "handler", LiteralKind::String, true)),
            "[author > AWSLambda]: is missing required argument (handler)."
        );
    }

    #[test]
    fn test_bare_directive_is_missing_required_argument() {
        let field = first_field("type T { author: Int @AWSLambda }");
        let d = get_directive(&field, "AWSLambda").unwrap();
        assert_eq!(
            message(get_argument(d, &field, "handler", LiteralKind::String, true)),
            "[author > AWSLambda]: is missing required argument (handler)."
        );
        assert_eq!(get_argument(d, &field, "handler", LiteralKind::String, false), Ok(None));
    }

    #[test]
    fn test_directive_without_argument_list() {
        let field = first_field("type T { author: Int }");
        let d = Directive {
            name: "AWSLambda".into(),
            arguments: None,
            span: Default::default(),
        };
        assert_eq!(
            message(get_argument(&d, &field, "handler", LiteralKind::String, false)),
            "[author > AWSLambda]: Has no arguments."
        );
    }

    #[test]
    fn test_kind_mismatch_names_both_kinds() {
        let field = first_field("type T { GetTodo: Int @AWSLambda(handler: 3, flag: [true]) }");
        let d = get_directive(&field, "AWSLambda").unwrap();
        assert_eq!(
            message(get_argument(d, &field, "handler", LiteralKind::String, true)),
            "[GetTodo > AWSLambda]: Argument handler expected to be of type String but received Int instead."
        );
        assert_eq!(
            message(get_argument(d, &field, "flag", LiteralKind::Boolean, true)),
            "[GetTodo > AWSLambda]: Argument flag expected to be of type Boolean but received List instead."
        );
    }

    #[test]
    fn test_int_out_of_range() {
        let field = first_field("type T { f: Int @d(n: 99999999999999999999) }");
        let d = get_directive(&field, "d").unwrap();
        assert_eq!(
            message(get_argument(d, &field, "n", LiteralKind::Int, true)),
            "[f > d]: Argument n is out of range for type Int."
        );
    }

    #[test]
    fn test_first_matching_directive_wins() {
        let field = first_field(r#"type T { f: Int @d(s: "one") @d(s: "two") }"#);
        let d = get_directive(&field, "d").unwrap();
        assert_eq!(get_string_argument(d, &field, "s", true), Ok(Some("one")));
        assert!(get_directive(&field, "missing").is_none());
    }
}
