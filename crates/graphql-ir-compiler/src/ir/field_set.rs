//! Turns selection sets into field sets, one per shape,
//! connected by the field sets they implement.

use crate::ast;
use crate::ast::FragmentDefinition;
use crate::ast::Selection;
use crate::condition::BooleanExpression;
use crate::diagnostic::DiagnosticList;
use crate::ir::metadata::ResolverEntry;
use crate::ir::metadata::ResolverKey;
use crate::ir::metadata::ResolverKind;
use crate::ir::shapes::common_ancestors;
use crate::ir::shapes::direct_ancestors;
use crate::ir::shapes::TypeIndex;
use crate::ir::shapes::TypeSet;
use crate::ir::IrArgument;
use crate::ir::IrError;
use crate::ir::IrField;
use crate::ir::IrFieldSet;
use crate::ir::IrType;
use crate::name;
use crate::schema::validation::nonnull_type;
use crate::validation::value::deprecation_reason;
use crate::validation::value::validate_arguments;
use crate::Name;
use crate::Node;
use crate::Schema;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// A field selected in a field set, and the condition under which it is reached
struct Occurrence<'a> {
    field: &'a Node<ast::Field>,
    parent_type: Name,
    condition: BooleanExpression,
}

pub(crate) struct IrBuilder<'a> {
    schema: &'a Schema,
    index: TypeIndex,
    fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    /// Type set of every field set built so far, by path
    built: HashMap<String, TypeSet>,
    fragment_roots: HashMap<Name, Arc<IrField>>,
    building_fragments: HashSet<Name>,
    pub(crate) resolver_entries: Vec<ResolverEntry>,
}

impl<'a> IrBuilder<'a> {
    pub(crate) fn new(
        schema: &'a Schema,
        fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    ) -> Self {
        Self {
            schema,
            index: TypeIndex::new(schema),
            fragments,
            built: HashMap::new(),
            fragment_roots: HashMap::new(),
            building_fragments: HashSet::new(),
            resolver_entries: Vec::new(),
        }
    }

    /// The `data` field of an operation or fragment, selecting `selections` on `base`
    pub(crate) fn root_field(
        &mut self,
        path: &str,
        model_prefix: &str,
        base: &Name,
        selections: &'a [Selection],
    ) -> Result<IrField, IrError> {
        let data = name!("data");
        let field_sets = self.field_sets(path, model_prefix, &data, base, &[selections], &[])?;
        let base_path = field_sets
            .first()
            .map(|field_set| field_set.path.clone())
            .ok_or_else(|| IrError::EmptyField {
                path: path.to_owned(),
            })?;
        Ok(IrField {
            name: data.clone(),
            alias: None,
            response_name: data,
            ty: IrType::Model(base_path).non_null(),
            arguments: Vec::new(),
            description: None,
            deprecation_reason: None,
            condition: BooleanExpression::True,
            field_sets,
        })
    }

    /// The root field of a fragment, built once and shared by every spread
    pub(crate) fn fragment_root(&mut self, name: &Name) -> Result<Arc<IrField>, IrError> {
        if let Some(root) = self.fragment_roots.get(name) {
            return Ok(root.clone());
        }
        let fragments = self.fragments;
        let fragment = fragments
            .get(name)
            .ok_or_else(|| IrError::UndefinedFragment { name: name.clone() })?;
        if !self.building_fragments.insert(name.clone()) {
            return Err(IrError::RecursiveFragment { name: name.clone() });
        }
        let root = self.root_field(
            &format!("fragment.{name}"),
            name,
            &fragment.type_condition,
            &fragment.selection_set,
        );
        self.building_fragments.remove(name);
        let root = Arc::new(root?);
        self.fragment_roots.insert(name.clone(), root.clone());
        self.resolver_entries.push(ResolverEntry {
            key: ResolverKey {
                kind: ResolverKind::Fragment,
                id: name.to_string(),
            },
            name: name.to_string(),
        });
        Ok(root)
    }

    /// One field set per shape of `base`, the base field set first,
    /// then in ascending type set size
    fn field_sets(
        &mut self,
        field_path: &str,
        model_prefix: &str,
        response_name: &Name,
        base: &Name,
        selection_sets: &[&'a [Selection]],
        cousins: &[IrField],
    ) -> Result<Vec<IrFieldSet>, IrError> {
        let fragments = self.fragments;

        let mut conditions = BTreeSet::from([base.clone()]);
        for &selections in selection_sets {
            type_conditions(fragments, base, selections, &mut conditions, &mut HashSet::new());
        }
        let shapes = self.index.shapes(base, &conditions);
        let shape_sets: Vec<TypeSet> = shapes
            .iter()
            .map(|shape| shape.type_set.clone())
            .collect();
        let mut type_sets: BTreeSet<TypeSet> = shape_sets.iter().cloned().collect();
        type_sets.extend(common_ancestors(&shape_sets));
        type_sets.insert(TypeSet::new([base.clone()]));
        let mut type_sets: Vec<TypeSet> = type_sets.into_iter().collect();
        type_sets.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        log::trace!(
            "`{field_path}`: {} field sets for {} type conditions",
            type_sets.len(),
            conditions.len()
        );

        let mut built = Vec::<IrFieldSet>::with_capacity(type_sets.len());
        for type_set in type_sets {
            let model = model_name(response_name, base, &type_set);
            let path = format!("{field_path}.{model}");
            if let Some(previous) = self.built.insert(path.clone(), type_set.clone()) {
                return Err(if previous == type_set {
                    IrError::DuplicateFieldSet { path }
                } else {
                    IrError::ModelNameClash {
                        path,
                        first: previous,
                        second: type_set,
                    }
                });
            }

            let mut occurrences = IndexMap::<Name, Vec<Occurrence<'a>>>::new();
            let mut spreads = Vec::new();
            for &selections in selection_sets {
                collect_fields(
                    fragments,
                    base,
                    selections,
                    &type_set,
                    &BooleanExpression::True,
                    &mut occurrences,
                    &mut spreads,
                    &mut HashSet::new(),
                );
            }
            let mut fragment_roots = Vec::with_capacity(spreads.len());
            for fragment_name in &spreads {
                fragment_roots.push(self.fragment_root(fragment_name)?);
            }

            let mut ancestors = implemented(&type_set, &built);
            for cousin in cousins
                .iter()
                .chain(fragment_roots.iter().map(|root| &**root))
            {
                ancestors.extend(implemented(&type_set, &cousin.field_sets));
            }
            let implements = ancestors
                .iter()
                .map(|ancestor| ancestor.path.clone())
                .collect();

            let model_path = format!("{model_prefix}.{model}");
            let mut fields = Vec::with_capacity(occurrences.len());
            for (child_name, child_occurrences) in &occurrences {
                let child_cousins: Vec<IrField> = ancestors
                    .iter()
                    .filter_map(|ancestor| {
                        ancestor
                            .fields
                            .iter()
                            .find(|field| field.response_name == *child_name)
                    })
                    .cloned()
                    .collect();
                fields.push(self.build_field(
                    &path,
                    &model_path,
                    child_name,
                    child_occurrences,
                    &child_cousins,
                )?);
            }

            let possible_types = shapes
                .iter()
                .filter(|shape| shape.type_set.implements(&type_set))
                .flat_map(|shape| shape.possible_types.iter().cloned())
                .collect();
            let condition = BooleanExpression::and(
                type_set
                    .iter()
                    .filter(|condition| *condition != base)
                    .map(|condition| BooleanExpression::type_condition(condition.as_str())),
            )
            .simplify();
            self.resolver_entries.push(ResolverEntry {
                key: ResolverKey {
                    kind: ResolverKind::Model,
                    id: path.clone(),
                },
                name: model_path,
            });
            log::trace!("built field set `{path}`");
            built.push(IrFieldSet {
                path,
                type_set,
                possible_types,
                fields,
                implements,
                condition,
            });
        }
        Ok(built)
    }

    /// Merge the occurrences of one response name into a field
    fn build_field(
        &mut self,
        parent_path: &str,
        model_prefix: &str,
        response_name: &Name,
        occurrences: &[Occurrence<'a>],
        cousins: &[IrField],
    ) -> Result<IrField, IrError> {
        let schema = self.schema;
        let field_path = format!("{parent_path}.{response_name}");
        let [first, ..] = occurrences else {
            return Err(IrError::EmptyField { path: field_path });
        };
        let undefined = || IrError::UndefinedField {
            type_name: first.parent_type.clone(),
            field: first.field.name.clone(),
        };
        let parent = schema.types.get(&first.parent_type).ok_or_else(undefined)?;
        let definition = schema
            .type_field(&first.parent_type, &first.field.name)
            .ok_or_else(undefined)?;

        let mut scratch = DiagnosticList::new(Default::default());
        let arguments = validate_arguments(
            schema,
            &mut scratch,
            &mut Vec::new(),
            &definition.arguments,
            &first.field.arguments,
            &format!("{}.{}", first.parent_type, first.field.name),
            first.field.location(),
        )
        .into_iter()
        .map(|argument| IrArgument {
            name: argument.name.clone(),
            value: argument.value.clone(),
        })
        .collect();

        let mut ty = nonnull_type(schema, parent, definition);
        let nonnull_in_document = occurrences.iter().any(|occurrence| {
            occurrence.field.directives.iter().any(|directive| {
                schema.original_directive_name(&directive.name) == Some("nonnull")
            })
        });
        if nonnull_in_document {
            ty = ty.non_null();
        }
        let inner = definition.ty.inner_named_type();
        let composite = schema.types.get(inner).is_some_and(|ty| ty.is_composite());
        let (ty, field_sets) = if composite {
            let selection_sets: Vec<&'a [Selection]> = occurrences
                .iter()
                .map(|occurrence| {
                    let field: &'a Node<ast::Field> = occurrence.field;
                    field.selection_set.as_slice()
                })
                .collect();
            let field_sets = self.field_sets(
                &field_path,
                model_prefix,
                response_name,
                inner,
                &selection_sets,
                cousins,
            )?;
            let base_path = field_sets.first().map(|base| base.path.as_str());
            (IrType::from_type(schema, &ty, base_path), field_sets)
        } else {
            (IrType::from_type(schema, &ty, None), Vec::new())
        };

        Ok(IrField {
            name: first.field.name.clone(),
            alias: first.field.alias.clone(),
            response_name: response_name.clone(),
            ty,
            arguments,
            description: definition
                .description
                .as_ref()
                .map(|description| description.as_str().to_owned()),
            deprecation_reason: deprecation_reason(&definition.directives),
            condition: BooleanExpression::or(
                occurrences
                    .iter()
                    .map(|occurrence| occurrence.condition.clone()),
            )
            .simplify(),
            field_sets,
        })
    }
}

/// The field sets of `candidates` that `type_set` implements directly
fn implemented<'f>(type_set: &TypeSet, candidates: &'f [IrFieldSet]) -> Vec<&'f IrFieldSet> {
    let type_sets: Vec<TypeSet> = candidates
        .iter()
        .map(|candidate| candidate.type_set.clone())
        .collect();
    let direct = direct_ancestors(type_set, &type_sets);
    candidates
        .iter()
        .filter(|candidate| direct.contains(&&candidate.type_set))
        .collect()
}

/// `node` with `{User, Node}` on base `Node` becomes `NodeOnUser`
fn model_name(response_name: &str, base: &str, type_set: &TypeSet) -> String {
    let mut chars = response_name.chars();
    let mut model: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase())
        .into_iter()
        .chain(chars)
        .collect();
    for condition in type_set.iter().filter(|condition| *condition != base) {
        model.push_str("On");
        model.push_str(condition);
    }
    model
}

/// Type conditions of the inline fragments and fragment spreads in `selections`,
/// not looking into fields
fn type_conditions(
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    parent_type: &Name,
    selections: &[Selection],
    into: &mut BTreeSet<Name>,
    visiting: &mut HashSet<Name>,
) {
    for selection in selections {
        match selection {
            Selection::Field(_) => {}
            Selection::InlineFragment(inline) => {
                let type_condition = inline.type_condition.as_ref().unwrap_or(parent_type);
                into.insert(type_condition.clone());
                type_conditions(
                    fragments,
                    type_condition,
                    &inline.selection_set,
                    into,
                    visiting,
                );
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if visiting.insert(fragment.name.clone()) {
                    into.insert(fragment.type_condition.clone());
                    type_conditions(
                        fragments,
                        &fragment.type_condition,
                        &fragment.selection_set,
                        into,
                        visiting,
                    );
                }
            }
        }
    }
}

/// Fields of `selections` present in objects of `type_set`, grouped by response name.
///
/// Fragments are entered only if their type condition is in `type_set`.
/// Names of the fragments spread directly, not through another fragment, go to `spreads`.
#[allow(clippy::too_many_arguments)]
fn collect_fields<'a>(
    fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    parent_type: &Name,
    selections: &'a [Selection],
    type_set: &TypeSet,
    condition: &BooleanExpression,
    into: &mut IndexMap<Name, Vec<Occurrence<'a>>>,
    spreads: &mut Vec<Name>,
    visiting: &mut HashSet<Name>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let condition = BooleanExpression::and([
                    condition.clone(),
                    BooleanExpression::from_directives(&field.directives),
                ])
                .simplify();
                into.entry(field.response_name().clone())
                    .or_default()
                    .push(Occurrence {
                        field,
                        parent_type: parent_type.clone(),
                        condition,
                    });
            }
            Selection::InlineFragment(inline) => {
                let type_condition = inline.type_condition.as_ref().unwrap_or(parent_type);
                if !type_set.contains(type_condition) {
                    continue;
                }
                let condition = BooleanExpression::and([
                    condition.clone(),
                    BooleanExpression::from_directives(&inline.directives),
                ]);
                collect_fields(
                    fragments,
                    type_condition,
                    &inline.selection_set,
                    type_set,
                    &condition,
                    into,
                    spreads,
                    visiting,
                );
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = fragments.get(&spread.fragment_name) else {
                    continue;
                };
                if !type_set.contains(&fragment.type_condition)
                    || !visiting.insert(fragment.name.clone())
                {
                    continue;
                }
                if !spreads.contains(&fragment.name) {
                    spreads.push(fragment.name.clone());
                }
                let condition = BooleanExpression::and([
                    condition.clone(),
                    BooleanExpression::from_directives(&spread.directives),
                ]);
                collect_fields(
                    fragments,
                    &fragment.type_condition,
                    &fragment.selection_set,
                    type_set,
                    &condition,
                    into,
                    &mut Vec::new(),
                    visiting,
                );
                visiting.remove(&fragment.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names() {
        let type_set = TypeSet::new([name!("Node"), name!("User")]);
        assert_eq!(model_name("node", "Node", &type_set), "NodeOnUser");
        assert_eq!(
            model_name("data", "Query", &TypeSet::new([name!("Query")])),
            "Data"
        );
    }
}
