//! SDL Parser
//!
//! Converts GraphQL SDL text into a [`Document`] with source location tracking.
//! This parser is purely syntactic: it does not check that referenced types
//! exist or that directives are defined.

use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::SchemaError;
use crate::syntax::{
    Argument, Definition, Directive, DirectiveDefinition, Document, EnumValueDefinition,
    FieldDefinition, InputValueDefinition, ObjectField, OperationType, OperationTypeDefinition,
    SchemaDefinition, Span, StringValue, Type, TypeDefinition, TypeKind, Value,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct SdlParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse SDL text into a document.
///
/// Input without a single definition (including the empty string) is a
/// syntax error, reported with the grammar layer's own message.
pub fn parse(source_text: &str) -> Result<Document, SchemaError> {
    let mut pairs = SdlParser::parse(Rule::document, source_text)?;
    let document = pairs.next().ok_or_else(|| {
        SchemaError::malformed(
            "document",
            Span {
                start: 0,
                end: source_text.len(),
            },
        )
    })?;

    let span = get_span(&document);
    let definitions = document
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(build_definition)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Document { definitions, span })
}

// ============================================================================
// DEFINITION BUILDERS
// ============================================================================

fn build_definition(pair: Pair<Rule>) -> Result<Definition, SchemaError> {
    match pair.as_rule() {
        Rule::schema_definition => Ok(Definition::Schema(build_schema(pair)?)),
        Rule::schema_extension => Ok(Definition::SchemaExtension(build_schema(pair)?)),
        Rule::type_definition => Ok(Definition::Type(build_type(pair)?)),
        Rule::type_extension => Ok(Definition::TypeExtension(build_type(pair)?)),
        Rule::directive_definition => Ok(Definition::Directive(build_directive_definition(pair)?)),
        rule => Err(unsupported(rule, get_span(&pair))),
    }
}

fn build_schema(pair: Pair<Rule>) -> Result<SchemaDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut directives = Vec::new();
    let mut operation_types = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::const_directives => directives = build_directives(inner)?,
            Rule::operation_type_definition => {
                operation_types.push(build_operation_type_definition(inner)?)
            }
            Rule::kw_schema | Rule::kw_extend => {}
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(SchemaDefinition {
        description,
        directives,
        operation_types,
        span,
    })
}

fn build_operation_type_definition(
    pair: Pair<Rule>,
) -> Result<OperationTypeDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut operation = None;
    let mut type_name = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::operation_type => {
                operation = Some(match inner.as_str() {
                    "query" => OperationType::Query,
                    "mutation" => OperationType::Mutation,
                    "subscription" => OperationType::Subscription,
                    _ => return Err(SchemaError::malformed("operation type", get_span(&inner))),
                })
            }
            Rule::name => type_name = Some(inner.as_str().to_string()),
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(OperationTypeDefinition {
        operation: operation.ok_or_else(|| SchemaError::malformed("operation type", span))?,
        type_name: type_name
            .ok_or_else(|| SchemaError::malformed("operation type name", span))?,
        span,
    })
}

/// Builds a type definition or extension. The body rule decides the kind.
fn build_type(pair: Pair<Rule>) -> Result<TypeDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut body = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::kw_extend => {}
            _ => body = Some(inner),
        }
    }

    let body = body.ok_or_else(|| SchemaError::malformed("type definition", span))?;
    let body_rule = body.as_rule();

    let mut name = None;
    let mut directives = Vec::new();
    let mut implements = Vec::new();
    let mut fields = Vec::new();
    let mut members = Vec::new();
    let mut values = Vec::new();
    let mut input_fields = Vec::new();

    for inner in body.into_inner() {
        match inner.as_rule() {
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::const_directives => directives = build_directives(inner)?,
            Rule::implements_interfaces | Rule::union_member_types => {
                let names = collect_names(inner);
                if body_rule == Rule::union_type {
                    members = names;
                } else {
                    implements = names;
                }
            }
            Rule::fields_definition => {
                fields = inner
                    .into_inner()
                    .map(build_field_definition)
                    .collect::<Result<_, _>>()?
            }
            Rule::enum_values_definition => {
                values = inner
                    .into_inner()
                    .map(build_enum_value_definition)
                    .collect::<Result<_, _>>()?
            }
            Rule::input_fields_definition => {
                input_fields = inner
                    .into_inner()
                    .map(build_input_value_definition)
                    .collect::<Result<_, _>>()?
            }
            Rule::kw_scalar
            | Rule::kw_type
            | Rule::kw_interface
            | Rule::kw_union
            | Rule::kw_enum
            | Rule::kw_input => {}
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    let kind = match body_rule {
        Rule::scalar_type => TypeKind::Scalar,
        Rule::object_type => TypeKind::Object { implements, fields },
        Rule::interface_type => TypeKind::Interface { implements, fields },
        Rule::union_type => TypeKind::Union { members },
        Rule::enum_type => TypeKind::Enum { values },
        Rule::input_object_type => TypeKind::InputObject {
            fields: input_fields,
        },
        rule => return Err(unsupported(rule, span)),
    };

    Ok(TypeDefinition {
        description,
        name: name.ok_or_else(|| SchemaError::malformed("type name", span))?,
        directives,
        kind,
        span,
    })
}

fn build_directive_definition(pair: Pair<Rule>) -> Result<DirectiveDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut name = None;
    let mut arguments = Vec::new();
    let mut repeatable = false;
    let mut locations = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::arguments_definition => arguments = build_arguments_definition(inner)?,
            Rule::repeatable => repeatable = true,
            Rule::directive_locations => locations = collect_names(inner),
            Rule::kw_directive | Rule::kw_on => {}
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(DirectiveDefinition {
        description,
        name: name.ok_or_else(|| SchemaError::malformed("directive name", span))?,
        arguments,
        repeatable,
        locations,
        span,
    })
}

// ============================================================================
// FIELD & VALUE DEFINITION BUILDERS
// ============================================================================

fn build_field_definition(pair: Pair<Rule>) -> Result<FieldDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut name = None;
    let mut arguments = Vec::new();
    let mut ty = None;
    let mut directives = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::arguments_definition => arguments = build_arguments_definition(inner)?,
            Rule::type_ref => ty = Some(build_type_ref(inner)?),
            Rule::const_directives => directives = build_directives(inner)?,
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(FieldDefinition {
        description,
        name: name.ok_or_else(|| SchemaError::malformed("field name", span))?,
        arguments,
        ty: ty.ok_or_else(|| SchemaError::malformed("field type", span))?,
        directives,
        span,
    })
}

fn build_arguments_definition(pair: Pair<Rule>) -> Result<Vec<InputValueDefinition>, SchemaError> {
    pair.into_inner()
        .map(build_input_value_definition)
        .collect()
}

fn build_input_value_definition(pair: Pair<Rule>) -> Result<InputValueDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut name = None;
    let mut ty = None;
    let mut default_value = None;
    let mut directives = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::type_ref => ty = Some(build_type_ref(inner)?),
            Rule::default_value => default_value = Some(build_value(first_inner(inner, "default value")?)?),
            Rule::const_directives => directives = build_directives(inner)?,
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(InputValueDefinition {
        description,
        name: name.ok_or_else(|| SchemaError::malformed("input value name", span))?,
        ty: ty.ok_or_else(|| SchemaError::malformed("input value type", span))?,
        default_value,
        directives,
        span,
    })
}

fn build_enum_value_definition(pair: Pair<Rule>) -> Result<EnumValueDefinition, SchemaError> {
    let span = get_span(&pair);
    let mut description = None;
    let mut name = None;
    let mut directives = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::description => description = Some(build_description(inner)?),
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::const_directives => directives = build_directives(inner)?,
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    Ok(EnumValueDefinition {
        description,
        name: name.ok_or_else(|| SchemaError::malformed("enum value", span))?,
        directives,
        span,
    })
}

fn build_type_ref(pair: Pair<Rule>) -> Result<Type, SchemaError> {
    match pair.as_rule() {
        Rule::type_ref => build_type_ref(first_inner(pair, "type reference")?),
        Rule::non_null_type => Ok(Type::NonNull(Box::new(build_type_ref(first_inner(
            pair,
            "non-null type",
        )?)?))),
        Rule::list_type => Ok(Type::List(Box::new(build_type_ref(first_inner(
            pair,
            "list type",
        )?)?))),
        Rule::named_type => Ok(Type::Named(
            first_inner(pair, "named type")?.as_str().to_string(),
        )),
        rule => Err(unsupported(rule, get_span(&pair))),
    }
}

// ============================================================================
// DIRECTIVE & VALUE BUILDERS
// ============================================================================

fn build_directives(pair: Pair<Rule>) -> Result<Vec<Directive>, SchemaError> {
    pair.into_inner().map(build_directive).collect()
}

fn build_directive(pair: Pair<Rule>) -> Result<Directive, SchemaError> {
    let span = get_span(&pair);
    let mut name = None;
    let mut arguments = None;

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::name => name = Some(inner.as_str().to_string()),
            Rule::arguments => {
                arguments = Some(
                    inner
                        .into_inner()
                        .map(build_argument)
                        .collect::<Result<Vec<_>, _>>()?,
                )
            }
            rule => return Err(unsupported(rule, get_span(&inner))),
        }
    }

    // A bare `@Name` has an empty argument list, not a missing one.
    Ok(Directive {
        name: name.ok_or_else(|| SchemaError::malformed("directive name", span))?,
        arguments: Some(arguments.unwrap_or_default()),
        span,
    })
}

fn build_argument(pair: Pair<Rule>) -> Result<Argument, SchemaError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();

    let name = inner
        .next()
        .filter(|p| p.as_rule() == Rule::name)
        .ok_or_else(|| SchemaError::malformed("argument name", span))?
        .as_str()
        .to_string();
    let value = inner
        .next()
        .ok_or_else(|| SchemaError::malformed("argument value", span))?;

    Ok(Argument {
        name,
        value: build_value(value)?,
        span,
    })
}

fn build_value(pair: Pair<Rule>) -> Result<Value, SchemaError> {
    let span = get_span(&pair);
    match pair.as_rule() {
        Rule::int_value => Ok(Value::Int(pair.as_str().to_string())),
        Rule::float_value => Ok(Value::Float(pair.as_str().to_string())),
        Rule::string_value => Ok(Value::String(build_string(pair)?)),
        Rule::boolean_value => Ok(Value::Boolean(pair.as_str() == "true")),
        Rule::null_value => Ok(Value::Null),
        Rule::enum_value => Ok(Value::Enum(pair.as_str().to_string())),
        Rule::list_value => Ok(Value::List(
            pair.into_inner().map(build_value).collect::<Result<_, _>>()?,
        )),
        Rule::object_value => Ok(Value::Object(
            pair.into_inner()
                .map(build_object_field)
                .collect::<Result<_, _>>()?,
        )),
        rule => Err(unsupported(rule, span)),
    }
}

fn build_object_field(pair: Pair<Rule>) -> Result<ObjectField, SchemaError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let name = inner
        .next()
        .ok_or_else(|| SchemaError::malformed("object field name", span))?
        .as_str()
        .to_string();
    let value = inner
        .next()
        .ok_or_else(|| SchemaError::malformed("object field value", span))?;

    Ok(ObjectField {
        name,
        value: build_value(value)?,
    })
}

fn build_description(pair: Pair<Rule>) -> Result<StringValue, SchemaError> {
    build_string(first_inner(pair, "description")?)
}

fn build_string(pair: Pair<Rule>) -> Result<StringValue, SchemaError> {
    let literal = first_inner(pair, "string literal")?;
    let span = get_span(&literal);
    match literal.as_rule() {
        Rule::block_string => Ok(StringValue {
            value: block_string_value(literal.as_str(), span)?,
            block: true,
        }),
        Rule::quoted_string => Ok(StringValue {
            value: unescape_string(literal.as_str(), span)?,
            block: false,
        }),
        rule => Err(unsupported(rule, span)),
    }
}

// ============================================================================
// STRING LITERALS
// ============================================================================

fn unescape_string(text: &str, span: Span) -> Result<String, SchemaError> {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| SchemaError::malformed("string literal", span))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => result.push('"'),
            Some('\\') => result.push('\\'),
            Some('/') => result.push('/'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('u') => {
                let code = read_hex4(&mut chars)
                    .ok_or_else(|| SchemaError::malformed("unicode escape", span))?;
                if (0xD800..0xDC00).contains(&code) {
                    // A high surrogate only makes sense followed by an escaped low one.
                    let rest = chars.as_str();
                    let low = rest
                        .strip_prefix("\\u")
                        .and_then(|r| r.get(..4))
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                        .filter(|low| (0xDC00..0xE000).contains(low));
                    match low {
                        Some(low) => {
                            let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                            result.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                            chars = rest[6..].chars();
                        }
                        None => result.push('\u{FFFD}'),
                    }
                } else {
                    result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
            }
            _ => return Err(SchemaError::malformed("escape sequence", span)),
        }
    }

    Ok(result)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}

/// The value of a `"""` block string: common indentation removed from every
/// line but the first, then leading and trailing blank lines dropped.
fn block_string_value(text: &str, span: Span) -> Result<String, SchemaError> {
    let raw = text
        .strip_prefix("\"\"\"")
        .and_then(|t| t.strip_suffix("\"\"\""))
        .ok_or_else(|| SchemaError::malformed("block string", span))?
        .replace("\\\"\"\"", "\"\"\"")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut lines: Vec<&str> = raw.split('\n').collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let indent = leading_whitespace(line);
            (indent < line.len()).then_some(indent)
        })
        .min();

    if let Some(indent) = common_indent {
        for line in lines.iter_mut().skip(1) {
            let current: &str = *line;
            let strip = indent.min(leading_whitespace(current));
            *line = &current[strip..];
        }
    }

    let is_blank = |line: &&str| leading_whitespace(line) == line.len();
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);

    Ok(lines[start..end].join("\n"))
}

fn leading_whitespace(line: &str) -> usize {
    line.bytes().take_while(|b| *b == b' ' || *b == b'\t').count()
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn first_inner<'i>(pair: Pair<'i, Rule>, construct: &str) -> Result<Pair<'i, Rule>, SchemaError> {
    let span = get_span(&pair);
    pair.into_inner()
        .next()
        .ok_or_else(|| SchemaError::malformed(construct, span))
}

fn collect_names(pair: Pair<Rule>) -> Vec<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::name)
        .map(|p| p.as_str().to_string())
        .collect()
}

fn unsupported(rule: Rule, span: Span) -> SchemaError {
    SchemaError::malformed(format!("construct: unsupported rule {:?}", rule), span)
}
