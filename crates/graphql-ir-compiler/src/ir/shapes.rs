//! Shapes: the groups of concrete object types that a selection set
//! can resolve to at runtime, distinguished by which type conditions they satisfy.

use crate::Name;
use crate::Schema;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;

/// A set of type conditions, always including the base type of the selection
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TypeSet(pub BTreeSet<Name>);

impl TypeSet {
    pub fn new(conditions: impl IntoIterator<Item = Name>) -> Self {
        Self(conditions.into_iter().collect())
    }

    /// Whether an object satisfying every condition of `self` also satisfies
    /// every condition of `other`, that is `self ⊇ other`
    pub fn implements(&self, other: &TypeSet) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn intersection(&self, other: &TypeSet) -> TypeSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn contains(&self, condition: &str) -> bool {
        self.0.contains(condition)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.0.iter()
    }
}

impl FromIterator<Name> for TypeSet {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, name) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// The conditions every object of this shape satisfies, among those selected on
    pub type_set: TypeSet,
    /// The concrete object types of this shape
    pub possible_types: BTreeSet<Name>,
}

/// Group the possible types of `base` by the subset of `conditions` they satisfy.
///
/// Every possible type of `base` belongs to exactly one of the returned shapes,
/// which are sorted by type set.
pub fn compute_shapes(schema: &Schema, base: &str, conditions: &BTreeSet<Name>) -> Vec<Shape> {
    TypeIndex::new(schema).shapes(base, conditions)
}

/// Super types of every object type of a schema, and the object types below every type
pub(crate) struct TypeIndex {
    super_types: HashMap<Name, BTreeSet<Name>>,
    possible_types: HashMap<Name, BTreeSet<Name>>,
}

impl TypeIndex {
    pub(crate) fn new(schema: &Schema) -> Self {
        let super_types = schema.object_super_types();
        let mut possible_types = HashMap::<Name, BTreeSet<Name>>::new();
        for (object, supers) in &super_types {
            for super_type in supers {
                possible_types
                    .entry(super_type.clone())
                    .or_default()
                    .insert(object.clone());
            }
        }
        Self {
            super_types,
            possible_types,
        }
    }

    /// See [`compute_shapes`]
    pub(crate) fn shapes(&self, base: &str, conditions: &BTreeSet<Name>) -> Vec<Shape> {
        let mut shapes = BTreeMap::<TypeSet, BTreeSet<Name>>::new();
        for object in self.possible_types.get(base).into_iter().flatten() {
            let type_set = self
                .super_types
                .get(object)
                .into_iter()
                .flatten()
                .filter(|super_type| conditions.contains(*super_type))
                .cloned()
                .collect::<TypeSet>();
            shapes.entry(type_set).or_default().insert(object.clone());
        }
        log::trace!("{} shapes for `{base}`", shapes.len());
        shapes
            .into_iter()
            .map(|(type_set, possible_types)| Shape {
                type_set,
                possible_types,
            })
            .collect()
    }
}

/// Type sets shared by two or more of `type_sets` that are not one of them:
/// the non-empty pairwise intersections, closed under further intersection.
///
/// Sorted by type set.
pub fn common_ancestors(type_sets: &[TypeSet]) -> Vec<TypeSet> {
    let mut known: BTreeSet<TypeSet> = type_sets.iter().cloned().collect();
    let mut ancestors = BTreeSet::new();
    loop {
        let all: Vec<&TypeSet> = known.iter().collect();
        let mut discovered = BTreeSet::new();
        for (index, a) in all.iter().enumerate() {
            for b in &all[index + 1..] {
                let intersection = a.intersection(b);
                if !intersection.is_empty() && !known.contains(&intersection) {
                    discovered.insert(intersection);
                }
            }
        }
        if discovered.is_empty() {
            break;
        }
        for type_set in discovered {
            known.insert(type_set.clone());
            ancestors.insert(type_set);
        }
    }
    ancestors.into_iter().collect()
}

/// The members of `candidates` that `type_set` implements, an equal one included,
/// without those already implied by a more specific candidate
pub fn direct_ancestors<'a>(type_set: &TypeSet, candidates: &'a [TypeSet]) -> Vec<&'a TypeSet> {
    let implemented: Vec<&TypeSet> = candidates
        .iter()
        .filter(|candidate| type_set.implements(candidate))
        .collect();
    implemented
        .iter()
        .filter(|candidate| {
            !implemented
                .iter()
                .any(|other| other != *candidate && other.implements(candidate))
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name;

    fn schema() -> Schema {
        let source = r#"
            type Query { animal: Animal }
            interface Animal { name: String }
            interface Pet { name: String }
            interface Wild { name: String }
            type Dog implements Animal & Pet { name: String }
            type Cat implements Animal & Pet { name: String }
            type Wolf implements Animal & Wild { name: String }
            type Fish implements Animal { name: String }
            union Mammal = Dog | Cat | Wolf
        "#;
        Schema::parse_and_validate(source, "schema.graphql")
            .into_result()
            .map(|schema| schema.into_inner())
            .unwrap()
    }

    fn set(names: &[&str]) -> TypeSet {
        names.iter().map(|name| Name::new(name).unwrap()).collect()
    }

    /// Every subset of the abstract and concrete types, with `Animal` always included
    fn condition_sets() -> Vec<BTreeSet<Name>> {
        let optional = ["Pet", "Wild", "Mammal", "Dog", "Fish"];
        (0..1 << optional.len())
            .map(|mask| {
                let mut conditions = BTreeSet::from([name!("Animal")]);
                for (index, name) in optional.iter().enumerate() {
                    if mask & (1 << index) != 0 {
                        conditions.insert(Name::new(name).unwrap());
                    }
                }
                conditions
            })
            .collect()
    }

    #[test]
    fn shapes_cover_possible_types_exactly_once() {
        let schema = schema();
        let possible_types = schema.possible_types("Animal");
        for conditions in condition_sets() {
            let shapes = compute_shapes(&schema, "Animal", &conditions);
            let mut covered = BTreeSet::new();
            for shape in &shapes {
                assert!(shape.type_set.contains("Animal"));
                assert!(shape.type_set.0.is_subset(&conditions));
                for object in &shape.possible_types {
                    assert!(covered.insert(object.clone()), "{object} in two shapes");
                }
            }
            assert_eq!(covered, possible_types, "{conditions:?}");
        }
    }

    #[test]
    fn shapes_by_condition() {
        let schema = schema();
        let conditions = BTreeSet::from([name!("Animal"), name!("Pet"), name!("Dog")]);
        let shapes = compute_shapes(&schema, "Animal", &conditions);
        let shapes: Vec<(String, Vec<&str>)> = shapes
            .iter()
            .map(|shape| {
                (
                    shape.type_set.to_string(),
                    shape.possible_types.iter().map(|name| name.as_str()).collect(),
                )
            })
            .collect();
        assert_eq!(
            shapes,
            [
                ("{Animal}".to_owned(), vec!["Fish", "Wolf"]),
                ("{Animal, Dog, Pet}".to_owned(), vec!["Dog"]),
                ("{Animal, Pet}".to_owned(), vec!["Cat"]),
            ]
        );
    }

    #[test]
    fn index_agrees_with_schema() {
        let schema = schema();
        let index = TypeIndex::new(&schema);
        for name in ["Animal", "Pet", "Wild", "Mammal", "Dog", "Query", "String"] {
            let possible_types = index.possible_types.get(name).cloned().unwrap_or_default();
            assert_eq!(possible_types, schema.possible_types(name), "{name}");
        }
        for (object, super_types) in &index.super_types {
            assert_eq!(*super_types, schema.super_types(object), "{object}");
        }
    }

    #[test]
    fn no_possible_types() {
        let schema = schema();
        let shapes = compute_shapes(&schema, "Query", &BTreeSet::from([name!("Query")]));
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].type_set, set(&["Query"]));
        assert!(compute_shapes(&schema, "Undefined", &BTreeSet::new()).is_empty());
    }

    #[test]
    fn ancestors_are_closed_under_intersection() {
        let shapes = [
            set(&["Animal", "Pet", "Dog"]),
            set(&["Animal", "Pet", "Mammal"]),
            set(&["Animal", "Wild", "Mammal"]),
        ];
        let ancestors = common_ancestors(&shapes);
        assert_eq!(
            ancestors,
            [
                set(&["Animal"]),
                set(&["Animal", "Mammal"]),
                set(&["Animal", "Pet"]),
            ]
        );
        let all: Vec<TypeSet> = shapes.iter().chain(&ancestors).cloned().collect();
        for a in &all {
            for b in &all {
                let intersection = a.intersection(b);
                if !intersection.is_empty() {
                    assert!(all.contains(&intersection), "{a} ∩ {b}");
                }
            }
        }
    }

    #[test]
    fn disjoint_shapes_have_no_ancestor() {
        assert!(common_ancestors(&[set(&["A"]), set(&["B"])]).is_empty());
        assert!(common_ancestors(&[]).is_empty());
    }

    #[test]
    fn direct_ancestors_are_reduced() {
        let candidates = [
            set(&["Animal"]),
            set(&["Animal", "Pet"]),
            set(&["Animal", "Mammal"]),
            set(&["Animal", "Pet", "Dog"]),
        ];
        let direct = direct_ancestors(&set(&["Animal", "Pet", "Mammal"]), &candidates);
        assert_eq!(direct, [&candidates[1], &candidates[2]]);
        let direct = direct_ancestors(&set(&["Animal", "Wild"]), &candidates);
        assert_eq!(direct, [&candidates[0]]);
        let direct = direct_ancestors(&candidates[1], &candidates);
        assert_eq!(direct, [&candidates[1]]);
        assert!(direct_ancestors(&set(&["Plant"]), &candidates).is_empty());
    }
}
