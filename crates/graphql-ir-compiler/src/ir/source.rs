//! The documents sent to the server: client-only directives removed
//! and `__typename` added where generated code needs it.

use crate::ast;
use crate::ast::serialize::strip_list;
use crate::ast::strip_directives;
use crate::ast::FragmentDefinition;
use crate::ast::OperationDefinition;
use crate::ast::Selection;
use crate::ir::AddTypename;
use crate::name;
use crate::Name;
use crate::Node;
use crate::Schema;
use indexmap::IndexMap;

/// The operation followed by the fragments named in `fragment_names`
pub(crate) fn operation_source(
    schema: &Schema,
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    operation: &Node<OperationDefinition>,
    fragment_names: &[Name],
    add_typename: AddTypename,
) -> String {
    let strip = schema.directives_to_strip();
    let mut printed = operation.clone();
    let inner = printed.make_mut();
    inner.directives = strip_list(&operation.directives, strip);
    let selections = strip_directives(&operation.selection_set, strip);
    inner.selection_set = match schema.root_operation(operation.operation_type) {
        Some(root) => with_typename(schema, root, &selections, add_typename),
        None => selections,
    };
    let mut source = printed.to_string();
    append_fragments(schema, fragments, fragment_names, add_typename, &mut source);
    source
}

/// The fragment followed by the fragments named in `fragment_names`
pub(crate) fn fragment_source(
    schema: &Schema,
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    fragment: &Node<FragmentDefinition>,
    fragment_names: &[Name],
    add_typename: AddTypename,
) -> String {
    let mut source = print_fragment(schema, fragment, add_typename);
    append_fragments(schema, fragments, fragment_names, add_typename, &mut source);
    source
}

fn append_fragments(
    schema: &Schema,
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    fragment_names: &[Name],
    add_typename: AddTypename,
    source: &mut String,
) {
    for name in fragment_names {
        if let Some(fragment) = fragments.get(name) {
            source.push_str("\n\n");
            source.push_str(&print_fragment(schema, fragment, add_typename));
        }
    }
}

fn print_fragment(
    schema: &Schema,
    fragment: &Node<FragmentDefinition>,
    add_typename: AddTypename,
) -> String {
    let strip = schema.directives_to_strip();
    let mut printed = fragment.clone();
    let inner = printed.make_mut();
    inner.directives = strip_list(&fragment.directives, strip);
    inner.selection_set = field_selections(
        schema,
        &fragment.type_condition,
        &strip_directives(&fragment.selection_set, strip),
        add_typename,
    );
    printed.to_string()
}

/// Sub-selections of a field of type `ty`, with `__typename` first if needed
fn field_selections(
    schema: &Schema,
    ty: &Name,
    selections: &[Selection],
    add_typename: AddTypename,
) -> Vec<Selection> {
    let mut result = with_typename(schema, ty, selections, add_typename);
    let wanted = match add_typename {
        AddTypename::Always => true,
        AddTypename::IfAbstract => schema.types.get(ty).is_some_and(|ty| ty.is_abstract()),
        AddTypename::Never => false,
    };
    let present = result.iter().any(|selection| match selection {
        Selection::Field(field) => field.alias.is_none() && field.name == "__typename",
        _ => false,
    });
    if wanted && !present {
        let typename = ast::Field {
            alias: None,
            name: name!("__typename"),
            arguments: Vec::new(),
            directives: Default::default(),
            selection_set: Vec::new(),
        };
        result.insert(0, Selection::Field(Node::new(typename)));
    }
    result
}

/// Apply `add_typename` to the fields of `selections`, not to `selections` itself
fn with_typename(
    schema: &Schema,
    parent_type: &Name,
    selections: &[Selection],
    add_typename: AddTypename,
) -> Vec<Selection> {
    selections
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) => {
                if field.selection_set.is_empty() {
                    return selection.clone();
                }
                let Some(definition) = schema.type_field(parent_type, &field.name) else {
                    return selection.clone();
                };
                let mut new = field.clone();
                new.make_mut().selection_set = field_selections(
                    schema,
                    definition.ty.inner_named_type(),
                    &field.selection_set,
                    add_typename,
                );
                Selection::Field(new)
            }
            Selection::InlineFragment(inline) => {
                let type_condition = inline.type_condition.as_ref().unwrap_or(parent_type);
                let mut new = inline.clone();
                new.make_mut().selection_set =
                    with_typename(schema, type_condition, &inline.selection_set, add_typename);
                Selection::InlineFragment(new)
            }
            Selection::FragmentSpread(_) => selection.clone(),
        })
        .collect()
}
