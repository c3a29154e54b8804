//! Fields with the same response name must be able to merge into a single response entry.
//!
//! <https://spec.graphql.org/October2021/#sec-Field-Selection-Merging>
//!
//! Two fields selected on different concrete object types can never both be present
//! in one response object. They may then use different fields or arguments,
//! but generated models still need them to have the same shape.

use crate::ast;
use crate::ast::Selection;
use crate::ast::Type;
use crate::ast::Value;
use crate::diagnostic::DiagnosticList;
use crate::schema::FieldDefinition;
use crate::validation::DiagnosticData;
use crate::validation::ValidationContext;
use crate::Name;
use crate::Node;
use crate::Schema;
use indexmap::IndexMap;
use std::collections::HashSet;

/// A field reached from the selection set being checked
struct CollectedField<'a> {
    field: &'a Node<ast::Field>,
    definition: Option<&'a Node<FieldDefinition>>,
    /// The parent type of this field and of each enclosing merged field, outermost first
    lineage: Vec<Name>,
    /// The outermost fragment this field was spread from.
    /// Pairs coming from the same fragment are checked with that fragment.
    origin: Option<Name>,
    /// Fragments being expanded where this field was reached
    expanding: HashSet<Name>,
}

pub(crate) fn validate_selection_set(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    parent_type: &Name,
    selections: &[Selection],
) {
    let mut fields = Vec::new();
    collect_fields(
        context,
        parent_type,
        selections,
        &[],
        None,
        &mut fields,
        &mut HashSet::new(),
    );
    check_fields(context, diagnostics, fields);
}

fn collect_fields<'a>(
    context: &ValidationContext<'a>,
    parent_type: &Name,
    selections: &'a [Selection],
    lineage: &[Name],
    origin: Option<&Name>,
    into: &mut Vec<CollectedField<'a>>,
    visiting: &mut HashSet<Name>,
) {
    let schema = context.schema;
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let mut field_lineage = lineage.to_vec();
                field_lineage.push(parent_type.clone());
                into.push(CollectedField {
                    field,
                    definition: schema.type_field(parent_type, &field.name),
                    lineage: field_lineage,
                    origin: origin.cloned(),
                    expanding: visiting.clone(),
                });
            }
            Selection::InlineFragment(inline) => {
                let type_condition = inline.type_condition.as_ref().unwrap_or(parent_type);
                if !schema.types.contains_key(type_condition) {
                    continue;
                }
                collect_fields(
                    context,
                    type_condition,
                    &inline.selection_set,
                    lineage,
                    origin,
                    into,
                    visiting,
                );
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = context.fragments.get(&spread.fragment_name) else {
                    continue;
                };
                let composite = schema
                    .types
                    .get(&fragment.type_condition)
                    .is_some_and(|ty| ty.is_composite());
                if !composite || !visiting.insert(fragment.name.clone()) {
                    continue;
                }
                collect_fields(
                    context,
                    &fragment.type_condition,
                    &fragment.selection_set,
                    lineage,
                    origin.or(Some(&fragment.name)),
                    into,
                    visiting,
                );
                visiting.remove(&fragment.name);
            }
        }
    }
}

fn check_fields(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    fields: Vec<CollectedField<'_>>,
) {
    let mut groups = IndexMap::<&Name, Vec<&CollectedField<'_>>>::new();
    for field in &fields {
        groups
            .entry(field.field.response_name())
            .or_default()
            .push(field);
    }
    for (response_name, group) in groups {
        for (index, a) in group.iter().enumerate() {
            for b in &group[index + 1..] {
                if a.origin.is_some() && a.origin == b.origin {
                    continue;
                }
                check_pair(context, diagnostics, response_name, a, b);
            }
        }

        let mut sub_fields = Vec::new();
        for field in &group {
            let Some(definition) = field.definition else {
                continue;
            };
            if field.field.selection_set.is_empty() {
                continue;
            }
            collect_fields(
                context,
                definition.ty.inner_named_type(),
                &field.field.selection_set,
                &field.lineage,
                field.origin.as_ref(),
                &mut sub_fields,
                &mut field.expanding.clone(),
            );
        }
        if !sub_fields.is_empty() {
            check_fields(context, diagnostics, sub_fields);
        }
    }
}

/// Two fields can never be in the same response object when, at some level,
/// they are selected on different object types
fn mutually_exclusive(schema: &Schema, a: &CollectedField<'_>, b: &CollectedField<'_>) -> bool {
    a.lineage
        .iter()
        .zip(&b.lineage)
        .any(|(a, b)| a != b && schema.get_object(a).is_some() && schema.get_object(b).is_some())
}

fn check_pair(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    response_name: &Name,
    a: &CollectedField<'_>,
    b: &CollectedField<'_>,
) {
    // Undefined fields are reported on their own
    let (Some(definition_a), Some(definition_b)) = (a.definition, b.definition) else {
        return;
    };
    if mutually_exclusive(context.schema, a, b) {
        if !context.options.check_fields_on_disjoint_types {
            return;
        }
        if let Err(reason) = same_response_shape(context.schema, &definition_a.ty, &definition_b.ty)
        {
            let data = |conflicting: &CollectedField<'_>| DiagnosticData::DifferentShape {
                response_name: response_name.clone(),
                reason: reason.clone(),
                conflicting_field: conflicting.field.location(),
            };
            diagnostics.push(a.field.location(), data(b));
            diagnostics.push(b.field.location(), data(a));
        }
        return;
    }

    let reason = if a.field.name != b.field.name {
        format!(
            "`{}` and `{}` are different fields",
            a.field.name, b.field.name
        )
    } else if !same_arguments(&a.field.arguments, &b.field.arguments) {
        "they have differing arguments".to_owned()
    } else if definition_a.ty != definition_b.ty {
        format!(
            "they return conflicting types `{}` and `{}`",
            definition_a.ty, definition_b.ty
        )
    } else {
        return;
    };
    let data = |conflicting: &CollectedField<'_>| DiagnosticData::ConflictingFields {
        response_name: response_name.clone(),
        reason: reason.clone(),
        conflicting_field: conflicting.field.location(),
    };
    diagnostics.push(a.field.location(), data(b));
    diagnostics.push(b.field.location(), data(a));
}

/// Lists and non-null markers must match, and leaf types must be identical
fn same_response_shape(schema: &Schema, a: &Type, b: &Type) -> Result<(), String> {
    let conflict = || format!("they return conflicting types `{a}` and `{b}`");
    match (a, b) {
        (Type::NonNullNamed(a_name), Type::NonNullNamed(b_name))
        | (Type::Named(a_name), Type::Named(b_name)) => {
            let is_leaf = |name: &Name| schema.types.get(name).is_some_and(|ty| ty.is_leaf());
            if a_name != b_name && (is_leaf(a_name) || is_leaf(b_name)) {
                Err(conflict())
            } else {
                Ok(())
            }
        }
        (Type::NonNullList(a_item), Type::NonNullList(b_item))
        | (Type::List(a_item), Type::List(b_item)) => same_response_shape(schema, a_item, b_item)
            .map_err(|_| conflict()),
        _ => Err(conflict()),
    }
}

/// Argument order does not matter
fn same_arguments(a: &[Node<ast::Argument>], b: &[Node<ast::Argument>]) -> bool {
    let names = |arguments: &[Node<ast::Argument>]| {
        arguments
            .iter()
            .map(|argument| argument.name.clone())
            .collect::<HashSet<_>>()
    };
    names(a) == names(b)
        && a.iter().all(|argument| {
            b.iter()
                .filter(|other| other.name == argument.name)
                .all(|other| same_value(&argument.value, &other.value))
        })
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_value(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(name, a)| {
                    b.iter()
                        .any(|(other_name, b)| name == other_name && same_value(a, b))
                })
        }
        _ => a == b,
    }
}
