//! Tree transformation over schema documents.
//!
//! A [`Visitor`] receives enter callbacks for the node kinds it cares about and
//! answers each with a [`Transform`]. [`visit`] builds a new document from those
//! answers; the input document is never modified.
//!
//! Traversal is depth-first in source order: each definition is entered, then
//! (for object and interface types and their extensions) each of its fields.

use crate::syntax::{Definition, Document, FieldDefinition, TypeDefinition, TypeKind};

/// What to do with a node after entering it.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform<T> {
    /// Keep the node as it is and walk its children.
    Keep,
    /// Use this node instead, then walk the replacement's children.
    Replace(T),
    /// Drop the node and its children from the output.
    Delete,
}

impl<T: Clone> Transform<T> {
    /// Resolve against the original node: `None` means the node is deleted.
    pub fn apply(self, original: &T) -> Option<T> {
        match self {
            Transform::Keep => Some(original.clone()),
            Transform::Replace(node) => Some(node),
            Transform::Delete => None,
        }
    }
}

/// Where a field definition sits in the document.
///
/// The grammar only allows field definitions inside the field list of an
/// object or interface type (or an extension of one), so a field always has
/// exactly one enclosing type.
#[derive(Debug, Clone, Copy)]
pub struct FieldAncestry<'a> {
    definition: &'a TypeDefinition,
    extension: bool,
}

impl<'a> FieldAncestry<'a> {
    /// Name of the type whose field list holds this field.
    pub fn enclosing_type(&self) -> &'a str {
        &self.definition.name
    }

    pub fn enclosing_definition(&self) -> &'a TypeDefinition {
        self.definition
    }

    /// Whether the enclosing type is an `extend type` / `extend interface`.
    pub fn is_extension(&self) -> bool {
        self.extension
    }
}

/// Enter callbacks, one per node kind. Every callback defaults to `Keep`.
pub trait Visitor {
    type Error;

    fn enter_definition(
        &mut self,
        _definition: &Definition,
    ) -> Result<Transform<Definition>, Self::Error> {
        Ok(Transform::Keep)
    }

    fn enter_field_definition(
        &mut self,
        _field: &FieldDefinition,
        _ancestry: FieldAncestry<'_>,
    ) -> Result<Transform<FieldDefinition>, Self::Error> {
        Ok(Transform::Keep)
    }
}

/// Walk `document` with `visitor`, returning the transformed copy.
///
/// The first callback error stops the walk; no partial document is returned.
pub fn visit<V>(document: &Document, visitor: &mut V) -> Result<Document, V::Error>
where
    V: Visitor + ?Sized,
{
    let mut definitions = Vec::with_capacity(document.definitions.len());

    for definition in &document.definitions {
        let Some(definition) = visitor.enter_definition(definition)?.apply(definition) else {
            continue;
        };
        definitions.push(walk_definition(definition, visitor)?);
    }

    Ok(Document {
        definitions,
        span: document.span,
    })
}

fn walk_definition<V>(definition: Definition, visitor: &mut V) -> Result<Definition, V::Error>
where
    V: Visitor + ?Sized,
{
    match definition {
        Definition::Type(def) => Ok(Definition::Type(walk_fields(def, false, visitor)?)),
        Definition::TypeExtension(def) => {
            Ok(Definition::TypeExtension(walk_fields(def, true, visitor)?))
        }
        other => Ok(other),
    }
}

fn walk_fields<V>(
    mut def: TypeDefinition,
    extension: bool,
    visitor: &mut V,
) -> Result<TypeDefinition, V::Error>
where
    V: Visitor + ?Sized,
{
    let Some(fields) = def.fields() else {
        return Ok(def);
    };

    let ancestry = FieldAncestry {
        definition: &def,
        extension,
    };
    let mut rewritten = Vec::with_capacity(fields.len());
    for field in fields {
        if let Some(field) = visitor.enter_field_definition(field, ancestry)?.apply(field) {
            rewritten.push(field);
        }
    }

    if let TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } = &mut def.kind {
        *fields = rewritten;
    }
    Ok(def)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse, print};
    use std::convert::Infallible;

    /// Records every enclosing type it sees and drops fields named `secret`.
    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, String, bool)>,
    }

    impl Visitor for Recorder {
        type Error = Infallible;

        fn enter_field_definition(
            &mut self,
            field: &FieldDefinition,
            ancestry: FieldAncestry<'_>,
        ) -> Result<Transform<FieldDefinition>, Infallible> {
            self.seen.push((
                ancestry.enclosing_type().to_string(),
                field.name.clone(),
                ancestry.is_extension(),
            ));
            if field.name == "secret" {
                return Ok(Transform::Delete);
            }
            Ok(Transform::Keep)
        }
    }

    #[test]
    fn test_fields_are_visited_in_document_order_with_their_enclosing_type() {
        let doc = parse(
            "type A { x: Int secret: Int } interface B { y: Int } input C { z: Int } extend type A { w: Int }",
        )
        .unwrap();
        let mut recorder = Recorder::default();
        let out = visit(&doc, &mut recorder).unwrap();

        let seen: Vec<_> = recorder
            .seen
            .iter()
            .map(|(t, f, e)| (t.as_str(), f.as_str(), *e))
            .collect();
        assert_eq!(
            seen,
            [
                ("A", "x", false),
                ("A", "secret", false),
                ("B", "y", false),
                ("A", "w", true)
            ]
        );
        assert!(!print(&out).contains("secret"));
        assert!(print(&doc).contains("secret"));
    }

    struct DropScalars;

    impl Visitor for DropScalars {
        type Error = Infallible;

        fn enter_definition(
            &mut self,
            definition: &Definition,
        ) -> Result<Transform<Definition>, Infallible> {
            match definition {
                Definition::Type(def) if matches!(def.kind, TypeKind::Scalar) => {
                    Ok(Transform::Delete)
                }
                _ => Ok(Transform::Keep),
            }
        }
    }

    #[test]
    fn test_definitions_can_be_deleted() {
        let doc = parse("scalar Date type A { a: Int }").unwrap();
        let out = visit(&doc, &mut DropScalars).unwrap();
        assert_eq!(out.definitions.len(), 1);
        assert_eq!(doc.definitions.len(), 2);
    }
}
