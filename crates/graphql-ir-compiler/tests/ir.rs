use crate::document;
use crate::messages;
use crate::schema;
use crate::validate;
use crate::validate_with;
use expect_test::expect;
use graphql_ir_compiler::ir::build_ir;
use graphql_ir_compiler::ir::AddTypename;
use graphql_ir_compiler::ir::CodegenMetadata;
use graphql_ir_compiler::ir::IrError;
use graphql_ir_compiler::ir::IrField;
use graphql_ir_compiler::ir::IrOperations;
use graphql_ir_compiler::ir::IrOptions;
use graphql_ir_compiler::ir::IrType;
use graphql_ir_compiler::ir::ResolverKind;
use graphql_ir_compiler::ir::TypeSet;
use graphql_ir_compiler::name;
use graphql_ir_compiler::validation::ValidationOptions;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;
use pretty_assertions::assert_eq;

fn animal_schema() -> Valid<Schema> {
    schema(
        r#"
        type Query {
          animal: Animal
          nearby(radius: Float, kinds: [String!]): [Animal!]!
        }
        interface Node { id: ID! }
        interface Animal {
          "The name given by the owner"
          name: String!
        }
        interface Pet { owner: String }
        type Dog implements Animal & Pet & Node {
          id: ID!
          name: String!
          owner: String
          barks: Boolean!
          sound: String @deprecated(reason: "Use `barks`")
        }
        type Cat implements Animal & Pet { name: String! owner: String meows: Boolean! }
        type Fish implements Animal { name: String! }
        "#,
    )
}

#[track_caller]
fn build(schema: &Valid<Schema>, source: &str, options: &IrOptions) -> IrOperations {
    let issues = validate_with(
        schema,
        source,
        &ValidationOptions {
            upstream: options.upstream.clone(),
            ..Default::default()
        },
    );
    assert!(!issues.has_errors(), "{issues}");
    build_ir(schema, &document(source), options).unwrap()
}

fn root_field<'a>(ir: &'a IrOperations, response_name: &str) -> &'a IrField {
    ir.operations[0].data_field.field_sets[0]
        .field(response_name)
        .unwrap()
}

fn paths(field: &IrField) -> Vec<&str> {
    field.field_sets.iter().map(|set| set.path.as_str()).collect()
}

fn response_names(field: &IrField, index: usize) -> Vec<&str> {
    field.field_sets[index]
        .fields
        .iter()
        .map(|field| field.response_name.as_str())
        .collect()
}

#[test]
fn one_field_set_per_shape() {
    let ir = build(
        &animal_schema(),
        r#"
        query GetAnimal {
          animal {
            name
            ... on Pet {
              owner
              ... on Dog { barks }
            }
          }
        }
        "#,
        &IrOptions::new(),
    );
    let operation = &ir.operations[0];
    assert_eq!(operation.name, "GetAnimal");
    assert_eq!(operation.data_field.field_sets[0].path, "operation.GetAnimal.Data");

    let animal = root_field(&ir, "animal");
    assert_eq!(
        paths(animal),
        [
            "operation.GetAnimal.Data.animal.Animal",
            "operation.GetAnimal.Data.animal.AnimalOnPet",
            "operation.GetAnimal.Data.animal.AnimalOnDogOnPet",
        ]
    );
    assert_eq!(
        animal.ty,
        IrType::Model("operation.GetAnimal.Data.animal.Animal".to_owned())
    );
    assert_eq!(response_names(animal, 0), ["name"]);
    assert_eq!(response_names(animal, 1), ["name", "owner"]);
    assert_eq!(response_names(animal, 2), ["name", "owner", "barks"]);

    let possible_types: Vec<Vec<&str>> = animal
        .field_sets
        .iter()
        .map(|set| set.possible_types.iter().map(|name| name.as_str()).collect())
        .collect();
    assert_eq!(
        possible_types,
        [vec!["Cat", "Dog", "Fish"], vec!["Cat", "Dog"], vec!["Dog"]]
    );

    let implements: Vec<Vec<&str>> = animal
        .field_sets
        .iter()
        .map(|set| set.implements.iter().map(|path| path.as_str()).collect())
        .collect();
    assert_eq!(
        implements,
        [
            vec![],
            vec!["operation.GetAnimal.Data.animal.Animal"],
            // Implied through `AnimalOnPet`
            vec!["operation.GetAnimal.Data.animal.AnimalOnPet"],
        ]
    );

    let conditions: Vec<String> = animal
        .field_sets
        .iter()
        .map(|set| set.condition.to_string())
        .collect();
    assert_eq!(conditions, ["true", "Pet", "(Dog && Pet)"]);
}

#[test]
fn resolver_entries_name_models() {
    let ir = build(
        &animal_schema(),
        r#"
        query GetAnimal { animal { name ...PetFields } }
        fragment PetFields on Pet { owner }
        "#,
        &IrOptions::new(),
    );
    let metadata = &ir.metadata;
    assert_eq!(
        metadata.resolve(ResolverKind::Model, "operation.GetAnimal.Data"),
        Some("GetAnimal.Data")
    );
    assert_eq!(
        metadata.resolve(ResolverKind::Model, "operation.GetAnimal.Data.animal.AnimalOnPet"),
        Some("GetAnimal.Data.AnimalOnPet")
    );
    assert_eq!(
        metadata.resolve(ResolverKind::Model, "fragment.PetFields.Data"),
        Some("PetFields.Data")
    );
    assert_eq!(
        metadata.resolve(ResolverKind::Fragment, "PetFields"),
        Some("PetFields")
    );
    assert_eq!(metadata.resolve(ResolverKind::Fragment, "GetAnimal"), None);
}

#[test]
fn field_sets_implement_spread_fragments() {
    let ir = build(
        &animal_schema(),
        r#"
        query GetAnimal { animal { name ...PetFields } }
        fragment PetFields on Pet { owner }
        "#,
        &IrOptions::new(),
    );
    let animal = root_field(&ir, "animal");
    assert_eq!(
        paths(animal),
        [
            "operation.GetAnimal.Data.animal.Animal",
            "operation.GetAnimal.Data.animal.AnimalOnPet",
        ]
    );
    let on_pet: Vec<&str> = animal.field_sets[1]
        .implements
        .iter()
        .map(|path| path.as_str())
        .collect();
    assert_eq!(
        on_pet,
        ["fragment.PetFields.Data", "operation.GetAnimal.Data.animal.Animal"]
    );
    assert_eq!(response_names(animal, 1), ["name", "owner"]);

    assert_eq!(ir.operations[0].fragment_names, [name!("PetFields")]);
    let fragment = ir.fragment("PetFields").unwrap();
    assert_eq!(fragment.type_condition, "Pet");
    assert_eq!(paths(&fragment.data_field), ["fragment.PetFields.Data"]);
    let possible_types: Vec<&str> = fragment.data_field.field_sets[0]
        .possible_types
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(possible_types, ["Cat", "Dog"]);
}

#[test]
fn include_and_skip_conditions() {
    let ir = build(
        &animal_schema(),
        r#"
        query GetAnimal($a: Boolean!, $b: Boolean!, $c: Boolean!, $d: Boolean!) {
          animal {
            name @include(if: $a)
            ... on Pet {
              name @include(if: $b)
            }
            ... on Pet @include(if: $c) {
              owner @skip(if: $d)
            }
          }
        }
        "#,
        &IrOptions::new(),
    );
    let animal = root_field(&ir, "animal");
    assert_eq!(
        paths(animal),
        [
            "operation.GetAnimal.Data.animal.Animal",
            "operation.GetAnimal.Data.animal.AnimalOnPet",
        ]
    );
    let base = &animal.field_sets[0];
    assert_eq!(response_names(animal, 0), ["name"]);
    assert_eq!(base.field("name").unwrap().condition.to_string(), "$a");

    let on_pet = &animal.field_sets[1];
    assert_eq!(response_names(animal, 1), ["name", "owner"]);
    // Either occurrence selects it
    assert_eq!(on_pet.field("name").unwrap().condition.to_string(), "($a || $b)");
    // Both the fragment and the field directives apply
    assert_eq!(on_pet.field("owner").unwrap().condition.to_string(), "(!$d && $c)");

    let variables: Vec<String> = ir.operations[0]
        .variables
        .iter()
        .map(|variable| format!("{}: {}", variable.name, variable.ty))
        .collect();
    assert_eq!(
        variables,
        ["a: Boolean!", "b: Boolean!", "c: Boolean!", "d: Boolean!"]
    );
}

const NEARBY: &str = r#"
query Nearby($radius: Float = 1.5) {
  nearby(radius: $radius) {
    name
    ... on Dog {
      barks
    }
    ...PetFields
  }
}

fragment PetFields on Pet {
  owner @nonnull
}
"#;

#[test]
fn sources_get_typename_on_abstract_types() {
    let ir = build(&animal_schema(), NEARBY, &IrOptions::new());
    let expected = expect![[r#"
        query Nearby($radius: Float = 1.5) {
          nearby(radius: $radius) {
            __typename
            name
            ... on Dog {
              barks
            }
            ...PetFields
          }
        }

        fragment PetFields on Pet {
          __typename
          owner
        }"#]];
    expected.assert_eq(&ir.operations[0].source);

    let expected = expect![[r#"
        fragment PetFields on Pet {
          __typename
          owner
        }"#]];
    expected.assert_eq(&ir.fragments[0].source);

    let ir = build(
        &animal_schema(),
        NEARBY,
        &IrOptions::new().add_typename(AddTypename::Never),
    );
    assert!(!ir.operations[0].source.contains("__typename"));
    assert!(!ir.operations[0].source.contains("@nonnull"));
}

#[test]
fn variables_and_arguments() {
    let ir = build(
        &animal_schema(),
        r#"query Nearby { nearby(radius: 5, kinds: "dog") { name } }"#,
        &IrOptions::new(),
    );
    let nearby = root_field(&ir, "nearby");
    let arguments: Vec<String> = nearby
        .arguments
        .iter()
        .map(|argument| format!("{}: {}", argument.name, argument.value))
        .collect();
    assert_eq!(arguments, ["radius: 5.0", r#"kinds: ["dog"]"#]);
    assert_eq!(
        nearby.ty.to_string(),
        "[<operation.Nearby.Data.nearby.Nearby>!]!"
    );

    let ir = build(&animal_schema(), NEARBY, &IrOptions::new());
    let variable = &ir.operations[0].variables[0];
    assert_eq!(variable.name, "radius");
    assert_eq!(variable.ty, IrType::Scalar(name!("Float")));
    assert_eq!(variable.default_value.as_ref().unwrap().to_string(), "1.5");
}

#[test]
fn descriptions_and_deprecations() {
    let schema = animal_schema();
    let source = r#"query GetAnimal { animal { name ... on Dog { sound } } }"#;
    let issues = validate(&schema, source);
    assert_eq!(
        messages(&issues),
        ["use of deprecated field `Dog.sound`: Use `barks`"]
    );

    let ir = build(&schema, source, &IrOptions::new());
    let animal = root_field(&ir, "animal");
    assert_eq!(
        paths(animal),
        [
            "operation.GetAnimal.Data.animal.Animal",
            "operation.GetAnimal.Data.animal.AnimalOnDog",
        ]
    );
    let name = animal.field_sets[0].field("name").unwrap();
    assert_eq!(name.description.as_deref(), Some("The name given by the owner"));
    assert_eq!(name.deprecation_reason, None);
    assert_eq!(name.ty, IrType::Scalar(name!("String")).non_null());
    let sound = animal.field_sets[1].field("sound").unwrap();
    assert_eq!(sound.deprecation_reason.as_deref(), Some("Use `barks`"));
}

#[test]
fn fragments_from_upstream_modules() {
    let schema = animal_schema();
    let upstream = build(
        &schema,
        "fragment PetFields on Pet { owner }",
        &IrOptions::new(),
    );
    assert!(upstream.metadata.fragment("PetFields").is_some());
    let json = upstream.metadata.to_json().unwrap();
    let metadata = CodegenMetadata::from_json(&json).unwrap();
    assert_eq!(metadata, upstream.metadata);

    let source = r#"query GetAnimal { animal { name ...PetFields } }"#;
    let issues = validate(&schema, source);
    assert_eq!(
        messages(&issues),
        ["cannot find fragment `PetFields` in this document"]
    );

    let ir = build(&schema, source, &IrOptions::new().upstream(metadata));
    assert!(ir.fragments.is_empty());
    assert!(ir.metadata.fragments.is_empty());
    let animal = root_field(&ir, "animal");
    assert!(animal.field_sets[1]
        .implements
        .contains("fragment.PetFields.Data"));
    assert!(ir.operations[0]
        .source
        .ends_with("fragment PetFields on Pet {\n  __typename\n  owner\n}"));
}

#[test]
fn clashing_model_names() {
    let schema = schema(
        r#"
        type Query { animal: Animal }
        interface Animal { name: String! }
        interface Pet { name: String! }
        interface Wild { name: String! }
        interface PetOnWild { name: String! }
        type Fox implements Animal & Pet & Wild { name: String! }
        type Hybrid implements Animal & PetOnWild { name: String! }
        "#,
    );
    let source = r#"
        query GetAnimal {
          animal {
            ... on Pet { name }
            ... on Wild { name }
            ... on PetOnWild { name }
          }
        }
    "#;
    let issues = validate(&schema, source);
    assert!(issues.is_empty(), "{issues}");
    let error = build_ir(&schema, &document(source), &IrOptions::new()).unwrap_err();
    assert_eq!(
        error,
        IrError::ModelNameClash {
            path: "operation.GetAnimal.Data.animal.AnimalOnPetOnWild".to_owned(),
            first: TypeSet::new([name!("Animal"), name!("PetOnWild")]),
            second: TypeSet::new([name!("Animal"), name!("Pet"), name!("Wild")]),
        }
    );
    assert_eq!(
        error.to_string(),
        "type sets {Animal, PetOnWild} and {Animal, Pet, Wild} both name the field set \
         `operation.GetAnimal.Data.animal.AnimalOnPetOnWild`"
    );
}
