use crate::document;
use crate::messages;
use crate::schema;
use crate::validate;
use graphql_ir_compiler::ir::build_ir;
use graphql_ir_compiler::ir::IrError;
use graphql_ir_compiler::ir::IrOptions;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;

fn library_schema() -> Valid<Schema> {
    schema(
        r#"
        type Query { node(id: ID!): Node books: [Book!]! }
        interface Node { id: ID! }
        type User implements Node { id: ID! name: String bestFriend: User }
        type Book { title: String! }
        "#,
    )
}

const CYCLE: &str = r#"
fragment A on User { name ...B }
fragment B on User { bestFriend { ...C } }
fragment C on User { ...A }
"#;

#[test]
fn fragment_cycle_is_reported_once() {
    let issues = validate(&library_schema(), CYCLE);
    let cycles: Vec<String> = messages(&issues)
        .into_iter()
        .filter(|message| message.contains("cannot reference itself"))
        .collect();
    assert_eq!(cycles, ["`A` fragment cannot reference itself: A -> B -> C -> A"]);
}

#[test]
fn fragment_cycle_stops_ir_building() {
    let error = build_ir(&library_schema(), &document(CYCLE), &IrOptions::new()).unwrap_err();
    assert!(
        matches!(error, IrError::RecursiveFragment { .. }),
        "{error}"
    );
}

#[test]
fn undefined_fragment() {
    let issues = validate(
        &library_schema(),
        r#"query GetNode { node(id: "1") { id ...Missing } }"#,
    );
    assert_eq!(
        messages(&issues),
        ["cannot find fragment `Missing` in this document"]
    );
}

#[test]
fn spread_that_can_never_apply() {
    let issues = validate(
        &library_schema(),
        r#"
        query GetNode { node(id: "1") { ...BookFields } }
        fragment BookFields on Book { title }
        "#,
    );
    assert_eq!(
        messages(&issues),
        ["fragment `BookFields` cannot be spread here as objects of type `Node` \
          can never be of type `Book`"]
    );

    let issues = validate(
        &library_schema(),
        r#"query GetBooks { books { ... on User { name } } }"#,
    );
    assert_eq!(
        messages(&issues),
        ["inline fragment cannot be spread here as objects of type `Book` \
          can never be of type `User`"]
    );
}

#[test]
fn type_condition_on_a_leaf_type() {
    let issues = validate(&library_schema(), "fragment Title on String { length }");
    assert_eq!(
        messages(&issues),
        ["type condition `String` must be a composite type, found a scalar type"]
    );
}
