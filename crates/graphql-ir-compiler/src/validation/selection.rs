use crate::ast;
use crate::ast::DirectiveLocation;
use crate::ast::Selection;
use crate::diagnostic::DiagnosticList;
use crate::validation::directive::validate_directives;
use crate::validation::value;
use crate::validation::DiagnosticData;
use crate::validation::ValidationContext;
use crate::validation::VariableReference;
use crate::Name;
use crate::Node;
use crate::Schema;

/// Whether some object could satisfy both type conditions
pub(crate) fn could_overlap(schema: &Schema, a: &str, b: &str) -> bool {
    !schema
        .possible_types(a)
        .is_disjoint(&schema.possible_types(b))
}

/// Check the selections made on `parent_type`.
///
/// Spread fragments are checked where they are defined, not here.
pub(crate) fn validate_selection_set(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    parent_type: &Name,
    selections: &[Selection],
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                validate_field(context, diagnostics, references, parent_type, field)
            }
            Selection::InlineFragment(inline) => {
                validate_inline_fragment(context, diagnostics, references, parent_type, inline)
            }
            Selection::FragmentSpread(spread) => {
                validate_fragment_spread(context, diagnostics, references, parent_type, spread)
            }
        }
    }
}

fn validate_field(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    parent_type: &Name,
    field: &Node<ast::Field>,
) {
    let schema = context.schema;
    validate_directives(
        schema,
        diagnostics,
        references,
        &field.directives,
        DirectiveLocation::Field,
    );

    let Some(definition) = schema.type_field(parent_type, &field.name) else {
        diagnostics.push(
            field.location(),
            DiagnosticData::UndefinedField {
                type_name: parent_type.clone(),
                field: field.name.clone(),
            },
        );
        return;
    };

    let response_name = field.response_name();
    if !context.options.allow_upper_case_fields && response_name.starts_with_uppercase() {
        diagnostics.push(
            response_name.location(),
            DiagnosticData::UpperCaseField {
                name: response_name.clone(),
            },
        );
    }

    let coordinate = format!("{parent_type}.{}", field.name);
    if let Some(reason) = value::deprecation_reason(&definition.directives) {
        diagnostics.push(
            field.location(),
            DiagnosticData::DeprecatedUsage {
                describe: "field",
                coordinate: coordinate.clone(),
                reason,
            },
        );
    }
    value::validate_arguments(
        schema,
        diagnostics,
        references,
        &definition.arguments,
        &field.arguments,
        &coordinate,
        field.location(),
    );

    let field_type = definition.ty.inner_named_type();
    match schema.types.get(field_type) {
        Some(ty) if ty.is_leaf() => {
            if !field.selection_set.is_empty() {
                diagnostics.push(
                    field.location(),
                    DiagnosticData::SubselectionOnLeaf {
                        field: field.name.clone(),
                        type_name: field_type.clone(),
                    },
                )
            }
        }
        Some(_) => {
            if field.selection_set.is_empty() {
                diagnostics.push(
                    field.location(),
                    DiagnosticData::MissingSubselection {
                        field: field.name.clone(),
                        type_name: field_type.clone(),
                    },
                )
            } else {
                validate_selection_set(
                    context,
                    diagnostics,
                    references,
                    field_type,
                    &field.selection_set,
                )
            }
        }
        // Reported with the schema
        None => {}
    }
}

/// Check a type condition. Returns false when the selections below it cannot be checked.
pub(crate) fn validate_type_condition(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    type_condition: &Name,
) -> bool {
    match schema.types.get(type_condition) {
        None => {
            diagnostics.push(
                type_condition.location(),
                DiagnosticData::UndefinedDefinition {
                    name: type_condition.clone(),
                },
            );
            false
        }
        Some(ty) if !ty.is_composite() => {
            diagnostics.push(
                type_condition.location(),
                DiagnosticData::InvalidTypeCondition {
                    name: type_condition.clone(),
                    describe_type: ty.describe(),
                },
            );
            false
        }
        Some(_) => true,
    }
}

fn validate_inline_fragment(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    parent_type: &Name,
    inline: &Node<ast::InlineFragment>,
) {
    let schema = context.schema;
    validate_directives(
        schema,
        diagnostics,
        references,
        &inline.directives,
        DirectiveLocation::InlineFragment,
    );
    let type_name = match &inline.type_condition {
        Some(type_condition) => {
            if !validate_type_condition(schema, diagnostics, type_condition) {
                return;
            }
            if !could_overlap(schema, parent_type, type_condition) {
                diagnostics.push(
                    inline.location(),
                    DiagnosticData::InvalidInlineFragment {
                        type_condition: type_condition.clone(),
                        type_name: parent_type.clone(),
                    },
                );
            }
            type_condition
        }
        None => parent_type,
    };
    validate_selection_set(
        context,
        diagnostics,
        references,
        type_name,
        &inline.selection_set,
    );
}

fn validate_fragment_spread(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    parent_type: &Name,
    spread: &Node<ast::FragmentSpread>,
) {
    let schema = context.schema;
    validate_directives(
        schema,
        diagnostics,
        references,
        &spread.directives,
        DirectiveLocation::FragmentSpread,
    );
    let Some(fragment) = context.fragments.get(&spread.fragment_name) else {
        diagnostics.push(
            spread.location(),
            DiagnosticData::UndefinedFragment {
                name: spread.fragment_name.clone(),
            },
        );
        return;
    };
    // Unknown type conditions are reported with the fragment definition
    let composite = schema
        .types
        .get(&fragment.type_condition)
        .is_some_and(|ty| ty.is_composite());
    if composite && !could_overlap(schema, parent_type, &fragment.type_condition) {
        diagnostics.push(
            spread.location(),
            DiagnosticData::InvalidFragmentSpread {
                name: fragment.name.clone(),
                type_condition: fragment.type_condition.clone(),
                type_name: parent_type.clone(),
            },
        );
    }
}
