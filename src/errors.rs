//! Error Handling
//!
//! Two layers of failure exist while processing a schema:
//!
//! - syntax errors, reported verbatim by the pest grammar layer;
//! - directive errors, reported as a [`LocalizedError`] whose message is
//!   prefixed with the names of the nodes involved, e.g.
//!   `[GetTodo > AWSLambda]: Has no arguments.`
//!
//! Both are carried by [`SchemaError`], which also implements
//! [`miette::Diagnostic`] so the CLI can render a labeled source snippet.

use std::fmt;

use miette::{Diagnostic, LabeledSpan, SourceSpan};
use thiserror::Error;

use crate::syntax::{parser::Rule, Directive, FieldDefinition, NamedNode, Span};

// ============================================================================
// LOCALIZED ERRORS
// ============================================================================

/// An error pinpointing the nodes that caused it.
///
/// Its `Display` is `[a > b]: message`, or just `message` when none of the
/// nodes had a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedError {
    path: Vec<String>,
    message: String,
    span: Option<Span>,
}

impl LocalizedError {
    /// The node names making up the prefix, outermost first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Span of the innermost node that had one. Never part of the message.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl fmt::Display for LocalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}]: {}", self.path.join(" > "), self.message)
        }
    }
}

impl std::error::Error for LocalizedError {}

/// Builds a [`LocalizedError`] from an ordered sequence of nodes.
///
/// Pass a single node with `std::iter::once(node)`.
pub fn localized_error<'a, I>(nodes: I, message: impl Into<String>) -> LocalizedError
where
    I: IntoIterator<Item = &'a dyn NamedNode>,
{
    let mut path = Vec::new();
    let mut span = None;
    for node in nodes {
        if let Some(name) = node.node_name().filter(|name| !name.is_empty()) {
            path.push(name.to_string());
        }
        if let Some(node_span) = node.node_span() {
            span = Some(node_span);
        }
    }

    LocalizedError {
        path,
        message: message.into(),
        span,
    }
}

/// A [`localized_error`] whose path is always `[field, directive]`.
pub fn localized_field_error(
    directive: &Directive,
    field: &FieldDefinition,
    message: impl Into<String>,
) -> LocalizedError {
    localized_error([field as &dyn NamedNode, directive as &dyn NamedNode], message)
}

// ============================================================================
// SCHEMA ERRORS
// ============================================================================

/// Every way turning SDL text into bindings and a clean schema can fail.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The text is not valid SDL; the message is the grammar layer's own.
    #[error("{0}")]
    Syntax(Box<pest::error::Error<Rule>>),

    /// The parse tree did not have the shape the grammar promises.
    #[error("malformed {construct}")]
    Malformed { construct: String, span: Span },

    /// A directive on a field is missing or has badly typed arguments.
    #[error(transparent)]
    Directive(#[from] LocalizedError),
}

impl From<pest::error::Error<Rule>> for SchemaError {
    fn from(error: pest::error::Error<Rule>) -> Self {
        SchemaError::Syntax(Box::new(error))
    }
}

impl SchemaError {
    pub fn malformed(construct: impl Into<String>, span: Span) -> Self {
        SchemaError::Malformed {
            construct: construct.into(),
            span,
        }
    }

    pub const fn code_suffix(&self) -> &'static str {
        match self {
            SchemaError::Syntax(_) => "syntax",
            SchemaError::Malformed { .. } => "malformed",
            SchemaError::Directive(_) => "directive",
        }
    }

    fn primary_span(&self) -> Option<SourceSpan> {
        match self {
            SchemaError::Syntax(error) => Some(match error.location {
                pest::error::InputLocation::Pos(pos) => SourceSpan::from(pos..pos),
                pest::error::InputLocation::Span((start, end)) => SourceSpan::from(start..end),
            }),
            SchemaError::Malformed { span, .. } => Some((*span).into()),
            SchemaError::Directive(error) => error.span().map(SourceSpan::from),
        }
    }

    fn primary_label(&self) -> &'static str {
        match self {
            SchemaError::Syntax(_) => "unexpected input",
            SchemaError::Malformed { .. } => "malformed syntax",
            SchemaError::Directive(_) => "in this directive",
        }
    }
}

impl Diagnostic for SchemaError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("appsync_sdl::{}", self.code_suffix())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            SchemaError::Directive(_) => Some(Box::new(
                "@AWSLambda takes one required String argument: handler",
            )),
            SchemaError::Malformed { .. } => Some(Box::new(
                "This is an internal parser error. Please report this as a bug.",
            )),
            SchemaError::Syntax(_) => None,
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.primary_span()?;
        let labels = vec![LabeledSpan::new_with_span(
            Some(self.primary_label().to_string()),
            span,
        )];
        Some(Box::new(labels.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Document, Type};

    fn field(name: &str) -> FieldDefinition {
        FieldDefinition {
            description: None,
            name: name.to_string(),
            arguments: vec![],
            ty: Type::Named("String".into()),
            directives: vec![],
            span: Span { start: 0, end: 4 },
        }
    }

    fn directive(name: &str) -> Directive {
        Directive {
            name: name.to_string(),
            arguments: None,
            span: Span { start: 5, end: 15 },
        }
    }

    #[test]
    fn joins_names_with_angle_separator() {
        let err = localized_field_error(&directive("AWSLambda"), &field("author"), "oops");
        assert_eq!(err.to_string(), "[author > AWSLambda]: oops");
        assert_eq!(err.path(), ["author", "AWSLambda"]);
        assert_eq!(err.span(), Some(Span { start: 5, end: 15 }));
    }

    #[test]
    fn single_node_prefix() {
        let f = field("GetTodo");
        let err = localized_error(std::iter::once(&f as &dyn NamedNode), "bad");
        assert_eq!(err.to_string(), "[GetTodo]: bad");
    }

    #[test]
    fn nameless_nodes_contribute_nothing() {
        let doc = Document {
            definitions: vec![],
            span: Span::default(),
        };
        let d = directive("AWSLambda");
        let err = localized_error([&doc as &dyn NamedNode, &d as &dyn NamedNode], "bad");
        assert_eq!(err.to_string(), "[AWSLambda]: bad");

        let err = localized_error(std::iter::once(&doc as &dyn NamedNode), "bare");
        assert_eq!(err.to_string(), "bare");
    }

    #[test]
    fn empty_names_are_skipped() {
        let err = localized_field_error(&directive(""), &field(""), "nothing to name");
        assert_eq!(err.to_string(), "nothing to name");
    }

    #[test]
    fn directive_errors_carry_a_diagnostic_code() {
        let err = SchemaError::from(localized_field_error(
            &directive("AWSLambda"),
            &field("author"),
            "Has no arguments.",
        ));
        assert_eq!(err.to_string(), "[author > AWSLambda]: Has no arguments.");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("appsync_sdl::directive"));
    }
}
