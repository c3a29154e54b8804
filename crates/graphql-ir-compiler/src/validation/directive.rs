use crate::ast;
use crate::ast::DirectiveLocation;
use crate::diagnostic::DiagnosticList;
use crate::validation::value;
use crate::validation::DiagnosticData;
use crate::validation::VariableReference;
use crate::Name;
use crate::Node;
use crate::Schema;
use std::collections::HashMap;

/// Check directive applications at one location.
///
/// Unknown directives are reported and their arguments are not checked.
pub(crate) fn validate_directives<'a>(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    directives: impl IntoIterator<Item = &'a Node<ast::Directive>>,
    location: DirectiveLocation,
) {
    let mut seen = HashMap::<&Name, &Node<ast::Directive>>::new();
    for directive in directives {
        let name = &directive.name;
        let Some(definition) = schema.directive_definitions.get(name) else {
            diagnostics.push(
                directive.location(),
                DiagnosticData::UnknownDirective { name: name.clone() },
            );
            continue;
        };

        if !definition.locations.contains(&location) {
            diagnostics.push(
                directive.location(),
                DiagnosticData::UnsupportedLocation {
                    name: name.clone(),
                    location,
                    valid_locations: definition.locations.clone(),
                },
            );
        }

        if !definition.repeatable {
            if let Some(original) = seen.get(name) {
                diagnostics.push(
                    directive.location(),
                    DiagnosticData::UniqueDirective {
                        name: name.clone(),
                        original_application: original.location(),
                    },
                );
            } else {
                seen.insert(name, directive);
            }
        }

        value::validate_arguments(
            schema,
            diagnostics,
            references,
            &definition.arguments,
            &directive.arguments,
            &format!("@{name}"),
            directive.location(),
        );

        // On a field, `@nonnull` marks that field itself
        if location == DirectiveLocation::Field
            && schema.original_directive_name(name) == Some("nonnull")
            && !directive.arguments.is_empty()
        {
            diagnostics.push(
                directive.location(),
                DiagnosticData::NonnullFieldArguments { name: name.clone() },
            );
        }
    }
}

/// Check directives in a type system definition, where variables are not allowed
pub(crate) fn validate_const_directives<'a>(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    directives: impl IntoIterator<Item = &'a Node<ast::Directive>>,
    location: DirectiveLocation,
) {
    let mut references = Vec::new();
    validate_directives(schema, diagnostics, &mut references, directives, location);
    report_variables(diagnostics, references);
}

pub(crate) fn report_variables(
    diagnostics: &mut DiagnosticList,
    references: Vec<VariableReference>,
) {
    for reference in references {
        diagnostics.push(
            reference.location,
            DiagnosticData::VariableInConstContext {
                name: reference.name,
            },
        );
    }
}
