//! Canonical SDL printer.
//!
//! Output follows the graphql-js layout: definitions separated by a blank
//! line, two-space indented blocks, and argument lists that break onto
//! separate lines only when one of the arguments spans several lines.
//! Printing a re-parsed printout yields the same text.

use crate::syntax::{
    Argument, Definition, Directive, DirectiveDefinition, Document, EnumValueDefinition,
    FieldDefinition, InputValueDefinition, OperationTypeDefinition, SchemaDefinition,
    StringValue, TypeDefinition, TypeKind, Value,
};

/// Print a document as SDL text, terminated by a newline.
pub fn print(document: &Document) -> String {
    let mut out = join(document.definitions.iter().map(print_definition), "\n\n");
    out.push('\n');
    out
}

// ============================================================================
// DEFINITIONS
// ============================================================================

fn print_definition(definition: &Definition) -> String {
    match definition {
        Definition::Schema(schema) => print_schema(schema, false),
        Definition::SchemaExtension(schema) => print_schema(schema, true),
        Definition::Type(def) => print_type(def, false),
        Definition::TypeExtension(def) => print_type(def, true),
        Definition::Directive(def) => print_directive_definition(def),
    }
}

fn print_schema(schema: &SchemaDefinition, extension: bool) -> String {
    let keyword = if extension { "extend schema" } else { "schema" };
    let operations = schema
        .operation_types
        .iter()
        .map(print_operation_type)
        .collect();

    print_description(schema.description.as_ref())
        + &join(
            [
                keyword.to_string(),
                print_directives(&schema.directives),
                block(operations),
            ],
            " ",
        )
}

fn print_operation_type(operation: &OperationTypeDefinition) -> String {
    format!("{}: {}", operation.operation.as_str(), operation.type_name)
}

fn print_type(def: &TypeDefinition, extension: bool) -> String {
    let prefix = if extension { "extend " } else { "" };
    let directives = print_directives(&def.directives);

    let body = match &def.kind {
        TypeKind::Scalar => join(["scalar".to_string(), def.name.clone(), directives], " "),
        TypeKind::Object { implements, fields } | TypeKind::Interface { implements, fields } => {
            let keyword = if def.is_object() { "type" } else { "interface" };
            join(
                [
                    keyword.to_string(),
                    def.name.clone(),
                    wrap("implements ", &implements.join(" & "), ""),
                    directives,
                    block(fields.iter().map(print_field).collect()),
                ],
                " ",
            )
        }
        TypeKind::Union { members } => join(
            [
                "union".to_string(),
                def.name.clone(),
                directives,
                wrap("= ", &members.join(" | "), ""),
            ],
            " ",
        ),
        TypeKind::Enum { values } => join(
            [
                "enum".to_string(),
                def.name.clone(),
                directives,
                block(values.iter().map(print_enum_value).collect()),
            ],
            " ",
        ),
        TypeKind::InputObject { fields } => join(
            [
                "input".to_string(),
                def.name.clone(),
                directives,
                block(fields.iter().map(print_input_value).collect()),
            ],
            " ",
        ),
    };

    print_description(def.description.as_ref()) + prefix + &body
}

fn print_directive_definition(def: &DirectiveDefinition) -> String {
    let repeatable = if def.repeatable { " repeatable" } else { "" };
    format!(
        "{}directive @{}{}{} on {}",
        print_description(def.description.as_ref()),
        def.name,
        print_argument_definitions(&def.arguments),
        repeatable,
        def.locations.join(" | ")
    )
}

// ============================================================================
// FIELDS & VALUES
// ============================================================================

fn print_field(field: &FieldDefinition) -> String {
    format!(
        "{}{}{}: {}{}",
        print_description(field.description.as_ref()),
        field.name,
        print_argument_definitions(&field.arguments),
        field.ty,
        wrap(" ", &print_directives(&field.directives), "")
    )
}

fn print_argument_definitions(arguments: &[InputValueDefinition]) -> String {
    let printed: Vec<String> = arguments.iter().map(print_input_value).collect();
    if printed.iter().any(|arg| arg.contains('\n')) {
        wrap("(\n", &indent(&join(printed, "\n")), "\n)")
    } else {
        wrap("(", &join(printed, ", "), ")")
    }
}

fn print_input_value(input: &InputValueDefinition) -> String {
    let default = input
        .default_value
        .as_ref()
        .map(|value| format!("= {}", print_value(value)))
        .unwrap_or_default();

    print_description(input.description.as_ref())
        + &join(
            [
                format!("{}: {}", input.name, input.ty),
                default,
                print_directives(&input.directives),
            ],
            " ",
        )
}

fn print_enum_value(value: &EnumValueDefinition) -> String {
    print_description(value.description.as_ref())
        + &join(
            [value.name.clone(), print_directives(&value.directives)],
            " ",
        )
}

fn print_directives(directives: &[Directive]) -> String {
    join(directives.iter().map(print_directive), " ")
}

fn print_directive(directive: &Directive) -> String {
    let arguments = directive
        .arguments
        .as_deref()
        .map(|args| join(args.iter().map(print_argument), ", "))
        .unwrap_or_default();
    format!("@{}{}", directive.name, wrap("(", &arguments, ")"))
}

fn print_argument(argument: &Argument) -> String {
    format!("{}: {}", argument.name, print_value(&argument.value))
}

/// Print a literal value in SDL syntax.
pub fn print_value(value: &Value) -> String {
    match value {
        Value::Int(raw) | Value::Float(raw) => raw.clone(),
        Value::String(string) => print_string(string),
        Value::Boolean(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Enum(name) => name.clone(),
        Value::List(values) => format!("[{}]", join(values.iter().map(print_value), ", ")),
        Value::Object(fields) => format!(
            "{{{}}}",
            join(
                fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, print_value(&field.value))),
                ", "
            )
        ),
    }
}

// ============================================================================
// STRINGS
// ============================================================================

fn print_description(description: Option<&StringValue>) -> String {
    description
        .map(|d| format!("{}\n", print_string(d)))
        .unwrap_or_default()
}

fn print_string(string: &StringValue) -> String {
    if string.block {
        print_block_string(&string.value)
    } else {
        print_quoted_string(&string.value)
    }
}

fn print_quoted_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || (0x7F..=0x9F).contains(&(c as u32)) => {
                out.push_str(&format!("\\u{:04X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn print_block_string(value: &str) -> String {
    let escaped = value.replace("\"\"\"", "\\\"\"\"");
    let lines: Vec<&str> = escaped.split('\n').collect();
    let is_single_line = lines.len() == 1;

    // Leading whitespace on every later line would be eaten by dedent
    // unless the first line is empty.
    let force_leading_newline = lines.len() > 1
        && lines[1..]
            .iter()
            .all(|line| line.is_empty() || line.starts_with([' ', '\t']));
    let has_trailing_triple_quotes = escaped.ends_with("\\\"\"\"");
    let has_trailing_quote = value.ends_with('"') && !has_trailing_triple_quotes;
    let has_trailing_slash = value.ends_with('\\');
    let force_trailing_newline = has_trailing_quote || has_trailing_slash;
    let print_as_multiple_lines = !is_single_line
        || value.len() > 70
        || force_trailing_newline
        || force_leading_newline
        || has_trailing_triple_quotes;
    let skip_leading_newline = is_single_line && value.starts_with([' ', '\t']);

    let mut result = String::from("\"\"\"");
    if (print_as_multiple_lines && !skip_leading_newline) || force_leading_newline {
        result.push('\n');
    }
    result.push_str(&escaped);
    if print_as_multiple_lines || force_trailing_newline {
        result.push('\n');
    }
    result.push_str("\"\"\"");
    result
}

// ============================================================================
// LAYOUT HELPERS
// ============================================================================

fn join<I>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = String>,
{
    items
        .into_iter()
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn wrap(start: &str, content: &str, end: &str) -> String {
    if content.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", start, content, end)
    }
}

fn indent(content: &str) -> String {
    wrap("  ", &content.replace('\n', "\n  "), "")
}

fn block(items: Vec<String>) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!("{{\n{}\n}}", indent(&join(items, "\n")))
    }
}
