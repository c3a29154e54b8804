use crate::document;
use crate::messages;
use crate::schema;
use crate::validate;
use graphql_ir_compiler::diagnostic::IssueKind;
use graphql_ir_compiler::validation::infer_fragment_variables;
use graphql_ir_compiler::DiagnosticList;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;

fn user_schema() -> Valid<Schema> {
    schema(
        r#"
        type Query { node(id: ID!): Node user(name: String): User }
        interface Node { id: ID! }
        type User implements Node {
          id: ID!
          name: String
          friends(first: Int, after: String): [User!]!
          avatar(size: Int! = 64): String
        }
        "#,
    )
}

#[test]
fn unused_variable_is_a_warning() {
    let issues = validate(
        &user_schema(),
        r#"query GetNode($id: ID!, $extra: Int) { node(id: $id) { id } }"#,
    );
    assert_eq!(messages(&issues), ["unused variable: `$extra`"]);
    let issue = issues.iter().next().unwrap();
    assert_eq!(issue.kind, IssueKind::UnusedVariable);
    assert!(issue.is_warning());
}

#[test]
fn undefined_variable() {
    let issues = validate(&user_schema(), "query GetNode { node(id: $id) { id } }");
    assert_eq!(messages(&issues), ["variable `$id` is not defined"]);
}

#[test]
fn nullable_variable_in_non_null_position() {
    let schema = user_schema();
    let issues = validate(&schema, "query GetNode($id: ID) { node(id: $id) { id } }");
    assert_eq!(
        messages(&issues),
        ["variable `$id` of type `ID` cannot be used for a value of type `ID!`"]
    );

    // A default value on either side makes it fine
    let issues = validate(&schema, r#"query GetNode($id: ID = "1") { node(id: $id) { id } }"#);
    assert!(issues.is_empty(), "{issues}");
    let issues = validate(
        &schema,
        r#"query GetUser($size: Int) { user { avatar(size: $size) } }"#,
    );
    assert!(issues.is_empty(), "{issues}");
}

#[test]
fn duplicate_variable() {
    let issues = validate(
        &user_schema(),
        "query GetNode($id: ID!, $id: ID!) { node(id: $id) { id } }",
    );
    assert_eq!(messages(&issues), ["the variable `$id` is declared multiple times"]);
}

#[test]
fn variable_of_output_type() {
    let issues = validate(
        &user_schema(),
        r#"query GetNode($user: User) { node(id: "1") { id } }"#,
    );
    let expected = "`$user` variable must be of an input type, `User` is an object type";
    assert!(messages(&issues).iter().any(|message| message == expected));
}

#[test]
fn variables_used_in_fragments_count_as_used() {
    let issues = validate(
        &user_schema(),
        r#"
        query GetUser($first: Int) { user { ...Friends } }
        fragment Friends on User { friends(first: $first) { id } }
        "#,
    );
    assert!(issues.is_empty(), "{issues}");

    let issues = validate(
        &user_schema(),
        r#"
        query GetUser { user { ...Friends } }
        fragment Friends on User { friends(first: $first) { id } }
        "#,
    );
    assert_eq!(messages(&issues), ["variable `$first` is not defined"]);
}

#[test]
fn fragment_variables_are_inferred() {
    let schema = user_schema();
    let document = document(
        r#"
        fragment Friends on User {
          friends(first: $first, after: $cursor) { ...Avatar }
        }
        fragment Avatar on User { avatar(size: $size) }
        "#,
    );
    let mut diagnostics = DiagnosticList::new(Default::default());
    let variables = infer_fragment_variables(
        &schema,
        &document.fragments["Friends"],
        &document.fragments,
        &mut diagnostics,
    );
    assert!(diagnostics.is_empty(), "{diagnostics}");
    let inferred: Vec<(String, String)> = variables
        .iter()
        .map(|(name, usage)| (name.to_string(), usage.expected_type.to_string()))
        .collect();
    assert_eq!(
        inferred,
        [
            ("first".to_owned(), "Int".to_owned()),
            ("cursor".to_owned(), "String".to_owned()),
            ("size".to_owned(), "Int!".to_owned()),
        ]
    );
    assert!(variables["size"].location_default.is_some());
}

#[test]
fn inconsistent_fragment_variable() {
    let issues = validate(
        &user_schema(),
        r#"
        fragment Friends on User {
          friends(first: $value, after: $value) { id }
        }
        "#,
    );
    assert_eq!(
        messages(&issues),
        ["variable `$value` is used as both `Int` and `String` in fragment `Friends`"]
    );
}
