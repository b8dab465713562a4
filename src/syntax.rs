//! Syntax module for GraphQL SDL
//!
//! This module provides the owned Abstract Syntax Tree for schema documents,
//! with source location tracking on every node. Passes never mutate a
//! document in place; they build a new one (see [`visit`]).

use serde::Serialize;

pub mod parser;
pub mod printer;
pub mod visit;

pub use parser::parse;
pub use printer::print;

/// Represents a byte span in the source text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::from(span.start..span.end)
    }
}

// ============================================================================
// DOCUMENT & DEFINITIONS
// ============================================================================

/// A parsed SDL document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub definitions: Vec<Definition>,
    pub span: Span,
}

/// Top-level definitions of the type system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Definition {
    Schema(SchemaDefinition),
    SchemaExtension(SchemaDefinition),
    Type(TypeDefinition),
    TypeExtension(TypeDefinition),
    Directive(DirectiveDefinition),
}

impl Definition {
    pub fn span(&self) -> Span {
        match self {
            Definition::Schema(def) | Definition::SchemaExtension(def) => def.span,
            Definition::Type(def) | Definition::TypeExtension(def) => def.span,
            Definition::Directive(def) => def.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDefinition {
    pub description: Option<StringValue>,
    pub directives: Vec<Directive>,
    pub operation_types: Vec<OperationTypeDefinition>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationTypeDefinition {
    pub operation: OperationType,
    pub type_name: String,
    pub span: Span,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }
}

/// A named type definition or extension. Extensions never carry a description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub description: Option<StringValue>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeKind {
    Scalar,
    Object {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Interface {
        implements: Vec<String>,
        fields: Vec<FieldDefinition>,
    },
    Union {
        members: Vec<String>,
    },
    Enum {
        values: Vec<EnumValueDefinition>,
    },
    InputObject {
        fields: Vec<InputValueDefinition>,
    },
}

impl TypeDefinition {
    /// The field list of object and interface types; `None` for every other kind.
    pub fn fields(&self) -> Option<&[FieldDefinition]> {
        match &self.kind {
            TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub description: Option<StringValue>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputValueDefinition {
    pub description: Option<StringValue>,
    pub name: String,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueDefinition {
    pub description: Option<StringValue>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveDefinition {
    pub description: Option<StringValue>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub repeatable: bool,
    pub locations: Vec<String>,
    pub span: Span,
}

// ============================================================================
// DIRECTIVES, TYPES & VALUES
// ============================================================================

/// A directive application. `arguments` is `None` when no parenthesized
/// argument list was written at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: Option<Vec<Argument>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: String,
    pub value: Value,
    pub span: Span,
}

/// A type reference such as `[Todo!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Type {
    Named(String),
    List(Box<Type>),
    NonNull(Box<Type>),
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{}", name),
            Type::List(inner) => write!(f, "[{}]", inner),
            Type::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// A string literal; `block` records whether it was written as `"""..."""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringValue {
    pub value: String,
    pub block: bool,
}

/// Constant literal values. Numbers keep their source lexeme so that printing
/// never changes their spelling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Int(String),
    Float(String),
    String(StringValue),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<ObjectField>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectField {
    pub name: String,
    pub value: Value,
}

/// The kind tag of a literal value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Int,
    Float,
    String,
    Boolean,
    Null,
    Enum,
    List,
    Object,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::String => "String",
            ValueKind::Boolean => "Boolean",
            ValueKind::Null => "Null",
            ValueKind::Enum => "Enum",
            ValueKind::List => "List",
            ValueKind::Object => "Object",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
            Value::Enum(_) => ValueKind::Enum,
            Value::List(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

// ============================================================================
// NAMED NODES
// ============================================================================

/// Nodes that may carry a `name`, used to build localized error paths.
pub trait NamedNode {
    fn node_name(&self) -> Option<&str>;

    fn node_span(&self) -> Option<Span> {
        None
    }
}

macro_rules! impl_named_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl NamedNode for $ty {
                fn node_name(&self) -> Option<&str> {
                    Some(&self.name)
                }

                fn node_span(&self) -> Option<Span> {
                    Some(self.span)
                }
            }
        )*
    };
}

impl_named_node!(
    TypeDefinition,
    FieldDefinition,
    InputValueDefinition,
    EnumValueDefinition,
    DirectiveDefinition,
    Directive,
    Argument,
);

impl NamedNode for Document {
    fn node_name(&self) -> Option<&str> {
        None
    }
}

impl NamedNode for SchemaDefinition {
    fn node_name(&self) -> Option<&str> {
        None
    }
}

impl NamedNode for Definition {
    fn node_name(&self) -> Option<&str> {
        match self {
            Definition::Schema(_) | Definition::SchemaExtension(_) => None,
            Definition::Type(def) | Definition::TypeExtension(def) => Some(&def.name),
            Definition::Directive(def) => Some(&def.name),
        }
    }

    fn node_span(&self) -> Option<Span> {
        Some(self.span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_serializes_with_spans() {
        let doc = parse(r#"type Q { a: Int @AWSLambda(handler: "h") }"#).unwrap();
        let Definition::Type(def) = &doc.definitions[0] else {
            panic!("expected a type definition");
        };
        let directive = &def.fields().unwrap()[0].directives[0];

        let json = serde_json::to_value(directive).unwrap();
        assert_eq!(json["name"], "AWSLambda");
        assert_eq!(json["span"], serde_json::json!({"start": 16, "end": 40}));
        assert_eq!(
            json["arguments"][0]["value"],
            serde_json::json!({"String": {"value": "h", "block": false}})
        );
    }
}
