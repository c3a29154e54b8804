use crate::document;
use crate::messages;
use crate::schema;
use crate::validate;
use graphql_ir_compiler::ir::build_ir;
use graphql_ir_compiler::ir::IrOptions;
use graphql_ir_compiler::schema::DirectiveLocation;
use graphql_ir_compiler::Schema;

#[track_caller]
fn errors(sdl: &str) -> Vec<String> {
    let issues = Schema::parse_and_validate(sdl, "schema.graphql")
        .into_result()
        .unwrap_err();
    assert!(issues.has_errors(), "{issues}");
    messages(&issues)
}

#[test]
fn duplicate_definitions() {
    assert_eq!(
        errors("type Query { a: Int } type User { id: ID } type User { name: String }"),
        ["the type `User` is defined multiple times in the schema"]
    );
    assert_eq!(
        errors("type Query { a: Int } directive @audit on FIELD directive @audit on OBJECT"),
        ["the directive `@audit` is defined multiple times in the schema"]
    );
    assert_eq!(
        errors("schema { query: Query } schema { query: Query } type Query { a: Int }"),
        ["duplicate definitions for the `schema` definition"]
    );
    assert_eq!(
        errors("schema { query: Query query: Query } type Query { a: Int }"),
        ["duplicate query root operation type"]
    );
}

#[test]
fn extensions_must_not_redefine_members() {
    let query = "type Query { a: Int }";
    assert_eq!(
        errors(&format!(
            "{query} type User {{ id: ID }} extend type User {{ id: ID }}"
        )),
        ["field `id` is defined multiple times on `User`"]
    );
    assert_eq!(
        errors(&format!("{query} enum Color {{ RED }} extend enum Color {{ RED }}")),
        ["enum value `RED` is defined multiple times on `Color`"]
    );
    assert_eq!(
        errors(&format!(
            "{query} input Filter {{ q: String }} extend input Filter {{ q: String }}"
        )),
        ["input field `q` is defined multiple times on `Filter`"]
    );
    assert_eq!(
        errors(&format!(
            "{query} type A {{ a: Int }} union U = A extend union U = A"
        )),
        ["member type `A` is defined multiple times on `U`"]
    );
    assert_eq!(
        errors(&format!(
            "{query} interface Node {{ id: ID }} \
             type User implements Node {{ id: ID }} \
             extend type User implements Node"
        )),
        ["interface `Node` is defined multiple times on `User`"]
    );
}

#[test]
fn extensions_need_a_matching_definition() {
    assert_eq!(
        errors("type Query { a: Int } extend type Ghost { a: Int }"),
        ["cannot extend undefined type `Ghost`"]
    );
    assert_eq!(
        errors("type Query { a: Int } type User { id: ID } extend union User = Query"),
        ["cannot extend an object type `User` with a union type extension"]
    );
}

#[test]
fn root_operations() {
    assert_eq!(
        errors("type User { id: ID }"),
        ["missing query root operation type in schema definition"]
    );
    assert_eq!(
        errors("type Mutation { send: Boolean }"),
        ["missing query root operation type in schema definition"]
    );
    assert_eq!(
        errors("schema { query: Root } type Query { a: Int }"),
        ["the query root operation type `Root` is not defined"]
    );
    assert_eq!(
        errors("schema { query: Filter } input Filter { a: Int }"),
        ["`Filter` root operation type must be an object type, found an input object type"]
    );

    let schema = schema("type Query { a: Int } type Mutation { send: Boolean }");
    assert_eq!(schema.schema_definition.query.as_deref(), Some("Query"));
    assert_eq!(schema.schema_definition.mutation.as_deref(), Some("Mutation"));
    assert_eq!(schema.schema_definition.subscription, None);
}

#[test]
fn names_starting_with_two_underscores_are_reserved() {
    assert_eq!(
        errors("type Query { a: Int } type __Secret { a: Int }"),
        ["`__Secret` is reserved: names starting with `__` belong to the introspection system"]
    );
    assert_eq!(
        errors("type Query { a: Int __hidden: Int }"),
        ["`__hidden` is reserved: names starting with `__` belong to the introspection system"]
    );
}

#[test]
fn fields_and_interfaces() {
    assert_eq!(
        errors("type Query { a: Int } interface Node"),
        ["an interface type `Node` must define at least one field"]
    );
    assert_eq!(
        errors("type Query { a: Int } type Empty"),
        ["an object type `Empty` must define at least one field"]
    );
    assert_eq!(
        errors("type Query { a: Int } type User implements Node { id: ID }"),
        ["`User` implements undefined interface `Node`"]
    );
    assert_eq!(
        errors("type Query { a: Int } scalar Date type User implements Date { id: ID }"),
        ["`User` cannot implement `Date`, which is a scalar type"]
    );
}

#[test]
fn built_in_definitions_can_be_replaced() {
    let result = Schema::parse_and_validate(
        r#"
        scalar String
        directive @skip(if: Boolean!) on FIELD
        type Query { a: String }
        "#,
        "schema.graphql",
    );
    assert!(result.issues.is_empty(), "{}", result.issues);
    let schema = result.into_result().unwrap();
    assert!(!schema.types["String"].is_built_in());
    assert_eq!(
        schema.directive_definitions["skip"].locations,
        [DirectiveLocation::Field]
    );

    // Apollo directives are replaced too, with a warning
    let result = Schema::parse_and_validate(
        "directive @nonnull on FIELD type Query { a: String }",
        "schema.graphql",
    );
    assert_eq!(
        messages(&result.issues),
        ["the directive `@nonnull` is also defined by Apollo, this definition replaces it"]
    );
    assert!(!result.issues.has_errors());
    let schema = result.into_result().unwrap();
    assert_eq!(
        schema.directive_definitions["nonnull"].locations,
        [DirectiveLocation::Field]
    );
}

#[test]
fn compiling_twice_gives_the_same_result() {
    let sdl = r#"
        type Query { animal: Animal }
        interface Animal { name: String! }
        interface Pet { owner: String }
        type Dog implements Animal & Pet { name: String! owner: String old: Int @deprecated }
        type Cat implements Animal & Pet { name: String! owner: String }
        union Mammal = Dog | Cat
    "#;
    assert_eq!(schema(sdl), schema(sdl));
    let schema = schema(sdl);

    let invalid = r#"
        query GetAnimal($unused: Int) {
          animal { name nope ... on Dog { old } ... on Plant { leaves } }
        }
    "#;
    let first = validate(&schema, invalid);
    let second = validate(&schema, invalid);
    assert!(first.len() > 2, "{first}");
    assert_eq!(messages(&first), messages(&second));
    assert_eq!(first.to_string(), second.to_string());

    let source = r#"
        query GetAnimal {
          animal { name ... on Pet { owner ... on Dog { old } } ... on Mammal { __typename } }
        }
    "#;
    assert!(!validate(&schema, source).has_errors());
    let options = IrOptions::new();
    let first = build_ir(&schema, &document(source), &options).unwrap();
    let second = build_ir(&schema, &document(source), &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
