use crate::messages;
use crate::schema;
use graphql_ir_compiler::Schema;
use unindent::unindent;

fn key_fields(schema: &Schema, type_name: &str) -> Vec<String> {
    schema
        .key_fields(type_name)
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn declared_on_an_object() {
    let schema = schema(
        r#"
        type Query { book: Book }
        type Book @typePolicy(keyFields: "isbn edition") { isbn: String! edition: Int! title: String }
        "#,
    );
    assert_eq!(key_fields(&schema, "Book"), ["isbn", "edition"]);
    assert!(key_fields(&schema, "Query").is_empty());
}

#[test]
fn inherited_from_interfaces() {
    let schema = schema(
        r#"
        type Query { node: Node }
        interface Node @typePolicy(keyFields: "id") { id: ID! }
        interface Entity implements Node { id: ID! }
        type User implements Entity & Node { id: ID! name: String }
        "#,
    );
    assert_eq!(key_fields(&schema, "Node"), ["id"]);
    assert_eq!(key_fields(&schema, "Entity"), ["id"]);
    assert_eq!(key_fields(&schema, "User"), ["id"]);
}

#[test]
fn identical_inherited_keys_do_not_conflict() {
    let schema = schema(
        r#"
        type Query { node: Node }
        interface Node @typePolicy(keyFields: "id") { id: ID! }
        interface Account @typePolicy(keyFields: "id") { id: ID! }
        type User implements Node & Account { id: ID! }
        "#,
    );
    assert_eq!(key_fields(&schema, "User"), ["id"]);
}

#[test]
fn conflicting_inherited_keys() {
    let input = unindent(
        r#"
        type Query { node: Node }
        interface Node @typePolicy(keyFields: "id") { id: ID! email: String! }
        interface Account @typePolicy(keyFields: "email") { id: ID! email: String! }
        type User implements Node & Account { id: ID! email: String! }
        "#,
    );
    let issues = Schema::parse_and_validate(input, "schema.graphql")
        .into_result()
        .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["type `User` inherits conflicting key fields `id` and `email`"]
    );
    let location = issues.iter().next().unwrap().location.as_ref().unwrap();
    assert_eq!((location.line, location.column), (4, 6));
}

#[test]
fn inheriting_type_cannot_declare_keys() {
    let issues = Schema::parse_and_validate(
        r#"
        type Query { node: Node }
        interface Node @typePolicy(keyFields: "id") { id: ID! }
        type User implements Node @typePolicy(keyFields: "name") { id: ID! name: String! }
        "#,
        "schema.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["type `User` cannot declare key fields, it inherits them from `Node`"]
    );
}

#[test]
fn keys_must_be_plain_fields_of_the_type() {
    let issues = Schema::parse_and_validate(
        r#"
        type Query { book: Book }
        type Book @typePolicy(keyFields: "isbn") { id: ID! }
        "#,
        "schema.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["invalid key fields on `Book`: `isbn` is not a field of `Book`"]
    );

    let issues = Schema::parse_and_validate(
        r#"
        type Query { book: Book }
        type Book @typePolicy(keyFields: "id: isbn") { isbn: ID! }
        "#,
        "schema.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["invalid key fields on `Book`: `id: isbn` is not a plain field"]
    );
}
