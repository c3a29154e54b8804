use crate::ast;
use crate::ast::DirectiveLocation;
use crate::diagnostic::DiagnosticList;
use crate::validation::directive::report_variables;
use crate::validation::directive::validate_directives;
use crate::validation::value::coerce_value;
use crate::validation::DiagnosticData;
use crate::validation::ValidationContext;
use crate::validation::VariableReference;
use crate::validation::VariableUsage;
use crate::Name;
use crate::Node;
use std::collections::HashMap;

pub(crate) fn validate_variable_definitions(
    context: &ValidationContext<'_>,
    diagnostics: &mut DiagnosticList,
    variables: &[Node<ast::VariableDefinition>],
) {
    let schema = context.schema;
    let mut seen = HashMap::<&Name, &Node<ast::VariableDefinition>>::new();
    for variable in variables {
        let mut references = Vec::new();
        validate_directives(
            schema,
            diagnostics,
            &mut references,
            &variable.directives,
            DirectiveLocation::VariableDefinition,
        );
        report_variables(diagnostics, references);

        // Variable definitions must be unique.
        if let Some(original) = seen.get(&variable.name) {
            diagnostics.push(
                variable.location(),
                DiagnosticData::UniqueVariable {
                    name: variable.name.clone(),
                    original_definition: original.location(),
                },
            );
        } else {
            seen.insert(&variable.name, variable);
        }

        let type_name = variable.ty.inner_named_type();
        match schema.types.get(type_name) {
            None => diagnostics.push(
                type_name.location(),
                DiagnosticData::UndefinedDefinition {
                    name: type_name.clone(),
                },
            ),
            Some(ty) if !ty.is_input_type() => diagnostics.push(
                variable.location(),
                DiagnosticData::VariableInputType {
                    name: variable.name.clone(),
                    ty: type_name.clone(),
                    describe_type: ty.describe(),
                },
            ),
            Some(_) => {
                if let Some(default_value) = &variable.default_value {
                    let mut references = Vec::new();
                    coerce_value(
                        schema,
                        diagnostics,
                        &mut references,
                        &variable.ty,
                        default_value,
                        None,
                    );
                    report_variables(diagnostics, references);
                }
            }
        }
    }
}

/// Whether a variable defined as `variable` can be used at a position described by `usage`
///
/// <https://spec.graphql.org/October2021/#sec-All-Variable-Usages-are-Allowed>
pub(crate) fn is_variable_usage_allowed(
    variable: &ast::VariableDefinition,
    usage: &VariableUsage,
) -> bool {
    let variable_type = &*variable.ty;
    let location_type = &usage.expected_type;
    // A nullable variable may flow into a non-null position
    // if either side provides a default value.
    if location_type.is_non_null() && !variable_type.is_non_null() {
        let has_variable_default = variable
            .default_value
            .as_ref()
            .is_some_and(|value| !value.is_null());
        if !has_variable_default && usage.location_default.is_none() {
            return false;
        }
        return variable_type.is_assignable_to(&location_type.clone().nullable());
    }
    variable_type.is_assignable_to(location_type)
}

/// Check every variable reference of an operation, including those made in the fragments
/// it spreads, then report variables that are never used.
pub(crate) fn validate_variable_usages(
    diagnostics: &mut DiagnosticList,
    variables: &[Node<ast::VariableDefinition>],
    references: &[VariableReference],
) {
    for reference in references {
        let Some(variable) = variables.iter().find(|def| def.name == reference.name) else {
            diagnostics.push(
                reference.location,
                DiagnosticData::UndefinedVariable {
                    name: reference.name.clone(),
                },
            );
            continue;
        };
        if !is_variable_usage_allowed(variable, &reference.usage) {
            diagnostics.push(
                reference.location,
                DiagnosticData::DisallowedVariableUsage {
                    name: reference.name.clone(),
                    variable_type: variable.ty.to_string(),
                    position_type: reference.usage.expected_type.to_string(),
                },
            );
        }
    }

    for variable in variables {
        if !references.iter().any(|reference| reference.name == variable.name) {
            diagnostics.push(
                variable.location(),
                DiagnosticData::UnusedVariable {
                    name: variable.name.clone(),
                },
            );
        }
    }
}
