//! `@AWSLambda` extraction.
//!
//! [`DirectiveScanner`] turns every `@AWSLambda(handler: "...")` field into a
//! [`Binding`] and strips the directive; [`SchemaNormalizer`] then cleans up
//! the rewritten tree before it is printed.

use std::collections::BTreeSet;
use std::convert::Infallible;

use serde::Serialize;

use crate::arguments::{get_directive, get_string_argument};
use crate::errors::{LocalizedError, SchemaError};
use crate::syntax::visit::{visit, FieldAncestry, Transform, Visitor};
use crate::syntax::{self, Definition, Document, FieldDefinition};

/// Name of the field directive binding a field to a Lambda handler.
pub const LAMBDA_DIRECTIVE: &str = "AWSLambda";

/// Required String argument of [`LAMBDA_DIRECTIVE`].
pub const HANDLER_ARGUMENT: &str = "handler";

// ============================================================================
// BINDINGS
// ============================================================================

/// A schema field bound to an external handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    parent_type: String,
    field_name: String,
    qualified_name: String,
    handler: String,
}

impl Binding {
    pub fn new(
        parent_type: impl Into<String>,
        field_name: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        let parent_type = parent_type.into();
        let field_name = field_name.into();
        let qualified_name = format!("{}_{}", parent_type, field_name);
        Self {
            parent_type,
            field_name,
            qualified_name,
            handler: handler.into(),
        }
    }

    /// The type whose field list holds the annotated field.
    pub fn parent_type(&self) -> &str {
        &self.parent_type
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// `parentType_fieldName`; the key generated resources are named by.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }
}

// ============================================================================
// DIRECTIVE SCANNER
// ============================================================================

/// Collects bindings while stripping `@AWSLambda` from the fields it visits.
#[derive(Debug, Default)]
pub struct DirectiveScanner {
    bindings: Vec<Binding>,
    deleted: BTreeSet<String>,
}

impl DirectiveScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings collected so far, in document order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Types the scan emptied by deleting fields. Stripping a directive never
    /// deletes a field, so this stays empty for `@AWSLambda`.
    pub fn deleted_types(&self) -> &BTreeSet<String> {
        &self.deleted
    }

    pub fn finish(self) -> (Vec<Binding>, BTreeSet<String>) {
        (self.bindings, self.deleted)
    }
}

impl Visitor for DirectiveScanner {
    type Error = LocalizedError;

    fn enter_field_definition(
        &mut self,
        field: &FieldDefinition,
        ancestry: FieldAncestry<'_>,
    ) -> Result<Transform<FieldDefinition>, LocalizedError> {
        let Some(directive) = get_directive(field, LAMBDA_DIRECTIVE) else {
            return Ok(Transform::Keep);
        };

        let handler = get_string_argument(directive, field, HANDLER_ARGUMENT, true)?;
        // An empty handler binds nothing, but the directive is still stripped.
        if let Some(handler) = handler.filter(|handler| !handler.is_empty()) {
            let binding = Binding::new(ancestry.enclosing_type(), &field.name, handler);
            tracing::debug!(
                qualified_name = binding.qualified_name(),
                handler = binding.handler(),
                "extracted binding"
            );
            self.bindings.push(binding);
        }

        Ok(Transform::Replace(FieldDefinition {
            directives: field
                .directives
                .iter()
                .filter(|d| d.name != LAMBDA_DIRECTIVE)
                .cloned()
                .collect(),
            ..field.clone()
        }))
    }
}

/// Scan `document`, returning its bindings and the directive-free copy.
pub fn extract(document: &Document) -> Result<(Vec<Binding>, Document), LocalizedError> {
    let mut scanner = DirectiveScanner::new();
    let rewritten = visit(document, &mut scanner)?;
    let (bindings, _) = scanner.finish();
    Ok((bindings, rewritten))
}

// ============================================================================
// SCHEMA NORMALIZER
// ============================================================================

/// Removes object types that lost all their fields during extraction.
///
/// Only types named in the deleted set are removed; an object type that was
/// written without fields stays.
#[derive(Debug, Default, Clone)]
pub struct SchemaNormalizer {
    deleted: BTreeSet<String>,
}

impl SchemaNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deleted(deleted: BTreeSet<String>) -> Self {
        Self { deleted }
    }

    pub fn track_deleted(&mut self, type_name: impl Into<String>) {
        self.deleted.insert(type_name.into());
    }

    pub fn normalize(&mut self, document: &Document) -> Document {
        match visit(document, self) {
            Ok(document) => document,
            Err(never) => match never {},
        }
    }
}

impl Visitor for SchemaNormalizer {
    type Error = Infallible;

    fn enter_definition(
        &mut self,
        definition: &Definition,
    ) -> Result<Transform<Definition>, Infallible> {
        if let Definition::Type(def) = definition {
            let emptied = def.is_object() && def.fields().map_or(true, <[_]>::is_empty);
            if emptied && self.deleted.contains(&def.name) {
                tracing::debug!(type_name = %def.name, "removed emptied type");
                return Ok(Transform::Delete);
            }
        }
        Ok(Transform::Keep)
    }
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Bindings and the clean schema produced from one SDL document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub bindings: Vec<Binding>,
    pub schema: String,
}

/// Parse `source`, extract its bindings and print the clean schema.
///
/// Either everything succeeds or the first error is returned; there are no
/// partial results.
pub fn extract_from_schema(source: &str) -> Result<Extraction, SchemaError> {
    let document = syntax::parse(source)?;

    let mut scanner = DirectiveScanner::new();
    let rewritten = visit(&document, &mut scanner)?;
    let (bindings, deleted) = scanner.finish();

    let normalized = SchemaNormalizer::with_deleted(deleted).normalize(&rewritten);
    tracing::debug!(bindings = bindings.len(), "schema extracted");

    Ok(Extraction {
        bindings,
        schema: syntax::print(&normalized),
    })
}
