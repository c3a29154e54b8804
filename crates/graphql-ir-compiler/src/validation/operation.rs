use crate::ast;
use crate::ast::OperationType;
use crate::ast::Selection;
use crate::diagnostic::DiagnosticList;
use crate::validation::directive::validate_directives;
use crate::validation::field_merging;
use crate::validation::fragment;
use crate::validation::selection;
use crate::validation::variable;
use crate::validation::DiagnosticData;
use crate::validation::ValidationContext;
use crate::Name;
use crate::Node;
use std::collections::HashSet;

pub(crate) fn validate_operation_definition(
    context: &ValidationContext<'_>,
    operation: &Node<ast::OperationDefinition>,
    diagnostics: &mut DiagnosticList,
) {
    let schema = context.schema;
    let mut references = Vec::new();

    validate_directives(
        schema,
        diagnostics,
        &mut references,
        &operation.directives,
        operation.operation_type.into(),
    );
    variable::validate_variable_definitions(context, diagnostics, &operation.variables);

    let Some(root) = schema.root_operation(operation.operation_type) else {
        diagnostics.push(
            operation.location(),
            DiagnosticData::UnsupportedOperation {
                operation_type: operation.operation_type,
            },
        );
        return;
    };

    if operation.operation_type == OperationType::Subscription {
        let mut response_names = HashSet::new();
        root_fields(
            context,
            &operation.selection_set,
            &mut response_names,
            &mut HashSet::new(),
        );
        if response_names.len() != 1 {
            diagnostics.push(
                operation.location(),
                DiagnosticData::SingleRootField {
                    fields: response_names.len(),
                },
            );
        }
    }

    selection::validate_selection_set(
        context,
        diagnostics,
        &mut references,
        root,
        &operation.selection_set,
    );
    field_merging::validate_selection_set(context, diagnostics, root, &operation.selection_set);

    let mut visited = HashSet::new();
    for spread in fragment::spreads(&operation.selection_set) {
        if let Some(definition) = context.fragments.get(&spread.fragment_name) {
            references.extend(fragment::collect_references(
                context,
                definition,
                &mut visited,
            ));
        }
    }
    variable::validate_variable_usages(diagnostics, &operation.variables, &references);
}

/// The short-hand anonymous form is only allowed for a document's single operation
pub(crate) fn validate_lone_anonymous(
    operations: &[Node<ast::OperationDefinition>],
    diagnostics: &mut DiagnosticList,
) {
    if operations.len() < 2 {
        return;
    }
    for operation in operations.iter().filter(|operation| operation.name.is_none()) {
        diagnostics.push(
            operation.location(),
            DiagnosticData::AnonymousOperation {
                operation_type: operation.operation_type,
                operations: operations.len(),
            },
        );
    }
}

/// Response names selected at the root, through fragments
fn root_fields<'a>(
    context: &ValidationContext<'a>,
    selections: &'a [Selection],
    into: &mut HashSet<&'a Name>,
    visited: &mut HashSet<&'a Name>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                into.insert(field.response_name());
            }
            Selection::InlineFragment(inline) => {
                root_fields(context, &inline.selection_set, into, visited)
            }
            Selection::FragmentSpread(spread) => {
                if let Some((name, definition)) =
                    context.fragments.get_key_value(&spread.fragment_name)
                {
                    if visited.insert(name) {
                        root_fields(context, &definition.selection_set, into, visited)
                    }
                }
            }
        }
    }
}
