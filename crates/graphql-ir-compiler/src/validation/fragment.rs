use crate::ast;
use crate::ast::DirectiveLocation;
use crate::ast::FragmentDefinition;
use crate::ast::Selection;
use crate::diagnostic::DiagnosticList;
use crate::validation::directive::validate_directives;
use crate::validation::field_merging;
use crate::validation::selection;
use crate::validation::DiagnosticData;
use crate::validation::ValidationContext;
use crate::validation::VariableReference;
use crate::validation::VariableUsage;
use crate::Name;
use crate::Node;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Fragment spreads found in `selections`, through fields and inline fragments
/// but not through other fragments
pub(crate) fn spreads(selections: &[Selection]) -> Vec<&Node<ast::FragmentSpread>> {
    let mut result = Vec::new();
    let mut stack = vec![selections];
    while let Some(selections) = stack.pop() {
        for selection in selections.iter().rev() {
            match selection {
                Selection::Field(field) => stack.push(&field.selection_set),
                Selection::InlineFragment(inline) => stack.push(&inline.selection_set),
                Selection::FragmentSpread(spread) => result.push(spread),
            }
        }
    }
    result
}

/// Names of every fragment reachable from `selections`, directly or through other fragments
pub(crate) fn spread_closure<'a>(
    fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    selections: &'a [Selection],
) -> HashSet<&'a Name> {
    let mut seen = HashSet::new();
    let mut stack: Vec<&Name> = spreads(selections)
        .into_iter()
        .map(|spread| &spread.fragment_name)
        .collect();
    while let Some(name) = stack.pop() {
        if let Some((name, fragment)) = fragments.get_key_value(name) {
            if seen.insert(name) {
                stack.extend(
                    spreads(&fragment.selection_set)
                        .into_iter()
                        .map(|spread| &spread.fragment_name),
                );
            }
        }
    }
    seen
}

/// Report fragments that spread themselves, directly or indirectly.
///
/// Each cycle is reported once, on the spread that closes it.
pub(crate) fn validate_fragment_cycles(
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    diagnostics: &mut DiagnosticList,
) {
    let mut finished = HashSet::new();
    for fragment in fragments.values() {
        let mut path = Vec::new();
        detect_cycles(fragments, fragment, &mut path, &mut finished, diagnostics);
    }
}

fn detect_cycles<'a>(
    fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    fragment: &'a Node<FragmentDefinition>,
    path: &mut Vec<&'a Name>,
    finished: &mut HashSet<&'a Name>,
    diagnostics: &mut DiagnosticList,
) {
    if finished.contains(&fragment.name) {
        return;
    }
    path.push(&fragment.name);
    for spread in spreads(&fragment.selection_set) {
        if let Some(start) = path.iter().position(|name| **name == spread.fragment_name) {
            let trace = path[start..]
                .iter()
                .map(|name| name.as_str())
                .chain([spread.fragment_name.as_str()])
                .collect::<Vec<_>>()
                .join(" -> ");
            diagnostics.push(
                spread.location(),
                DiagnosticData::RecursiveFragmentDefinition {
                    name: spread.fragment_name.clone(),
                    trace,
                },
            );
            continue;
        }
        if let Some(next) = fragments.get(&spread.fragment_name) {
            detect_cycles(fragments, next, path, finished, diagnostics);
        }
    }
    path.pop();
    finished.insert(&fragment.name);
}

/// Check the body of a fragment definition and the consistency of its variables
pub(crate) fn validate_fragment_definition(
    context: &ValidationContext<'_>,
    fragment: &Node<FragmentDefinition>,
    diagnostics: &mut DiagnosticList,
) {
    let schema = context.schema;
    let mut references = Vec::new();
    validate_directives(
        schema,
        diagnostics,
        &mut references,
        &fragment.directives,
        DirectiveLocation::FragmentDefinition,
    );
    if !selection::validate_type_condition(schema, diagnostics, &fragment.type_condition) {
        return;
    }
    selection::validate_selection_set(
        context,
        diagnostics,
        &mut references,
        &fragment.type_condition,
        &fragment.selection_set,
    );
    field_merging::validate_selection_set(
        context,
        diagnostics,
        &fragment.type_condition,
        &fragment.selection_set,
    );

    let mut visited = HashSet::from([fragment.name.clone()]);
    for spread in spreads(&fragment.selection_set) {
        if let Some(spread_fragment) = context.fragments.get(&spread.fragment_name) {
            references.extend(collect_references(context, spread_fragment, &mut visited));
        }
    }
    group_references(&fragment.name, references, diagnostics);
}

/// Variables used in a fragment and the fragments it spreads, without reporting issues.
///
/// Fragments already in `visited` contribute nothing.
pub(crate) fn collect_references(
    context: &ValidationContext<'_>,
    fragment: &Node<FragmentDefinition>,
    visited: &mut HashSet<Name>,
) -> Vec<VariableReference> {
    if !visited.insert(fragment.name.clone()) {
        return Vec::new();
    }
    if let Some(references) = context.upstream_variables(fragment) {
        return references;
    }
    let composite = context
        .schema
        .types
        .get(&fragment.type_condition)
        .is_some_and(|ty| ty.is_composite());
    if !composite {
        return Vec::new();
    }

    let mut scratch = DiagnosticList::new(Default::default());
    let mut references = Vec::new();
    validate_directives(
        context.schema,
        &mut scratch,
        &mut references,
        &fragment.directives,
        DirectiveLocation::FragmentDefinition,
    );
    selection::validate_selection_set(
        context,
        &mut scratch,
        &mut references,
        &fragment.type_condition,
        &fragment.selection_set,
    );
    for spread in spreads(&fragment.selection_set) {
        if let Some(spread_fragment) = context.fragments.get(&spread.fragment_name) {
            references.extend(collect_references(context, spread_fragment, visited));
        }
    }
    references
}

/// One usage per variable. A variable used with two different types is reported
/// and keeps the type of its first usage.
pub(crate) fn group_references(
    fragment_name: &Name,
    references: Vec<VariableReference>,
    diagnostics: &mut DiagnosticList,
) -> IndexMap<Name, VariableUsage> {
    let mut usages = IndexMap::<Name, VariableUsage>::new();
    for reference in references {
        match usages.entry(reference.name) {
            Entry::Occupied(entry) => {
                let first = &entry.get().expected_type;
                if *first != reference.usage.expected_type {
                    diagnostics.push(
                        reference.location,
                        DiagnosticData::InconsistentVariableType {
                            fragment: fragment_name.clone(),
                            name: entry.key().clone(),
                            first: first.to_string(),
                            second: reference.usage.expected_type.to_string(),
                        },
                    );
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(reference.usage);
            }
        }
    }
    usages
}
