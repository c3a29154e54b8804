use crate::messages;
use crate::schema;
use crate::validate;
use graphql_ir_compiler::validation::validate_fragment;
use graphql_ir_compiler::validation::validate_operation;
use graphql_ir_compiler::validation::ValidationOptions;
use graphql_ir_compiler::ExecutableDocument;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;

fn chat_schema() -> Valid<Schema> {
    schema(
        r#"
        type Query { messages: [Message!]! }
        type Subscription { messageAdded: Message! userJoined: String! }
        type Message {
          text: String!
          author: String @deprecated(reason: "Use `sender`")
          sender: String
        }
        "#,
    )
}

#[test]
fn duplicate_names() {
    let issues = ExecutableDocument::parse(
        r#"
        query Messages { messages { text } }
        query Messages { messages { sender } }
        fragment Text on Message { text }
        fragment Text on Message { sender }
        "#,
        "query.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        [
            "the operation `Messages` is defined multiple times",
            "the fragment `Text` is defined multiple times",
        ]
    );
}

#[test]
fn type_system_definitions_are_rejected() {
    let issues = ExecutableDocument::parse(
        "type Extra { name: String } query Messages { messages { text } }",
        "query.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["executable documents must not contain an object type definition"]
    );
}

#[test]
fn anonymous_operation_must_be_alone() {
    let schema = chat_schema();
    let issues = validate(&schema, "{ messages { text } }");
    assert!(issues.is_empty(), "{issues}");

    let issues = validate(
        &schema,
        "{ messages { text } } query Messages { messages { sender } }",
    );
    assert_eq!(
        messages(&issues),
        ["an anonymous query must be the only operation, this document has 2"]
    );
}

#[test]
fn subscription_selects_one_root_field() {
    let issues = validate(
        &chat_schema(),
        "subscription Events { messageAdded { text } userJoined }",
    );
    assert_eq!(
        messages(&issues),
        ["a subscription must select exactly one root field, found 2"]
    );
}

#[test]
fn operation_type_missing_from_schema() {
    let issues = validate(&chat_schema(), "mutation Send { send }");
    assert_eq!(
        messages(&issues),
        ["the schema does not define a mutation root operation type"]
    );
}

#[test]
fn deprecated_field_is_a_warning() {
    let issues = validate(&chat_schema(), "query Messages { messages { author } }");
    assert_eq!(
        messages(&issues),
        ["use of deprecated field `Message.author`: Use `sender`"]
    );
    assert!(!issues.has_errors());
}

#[test]
fn leaf_and_composite_selections() {
    let schema = chat_schema();
    let issues = validate(&schema, "query Messages { messages }");
    assert_eq!(
        messages(&issues),
        ["field `messages` of type `Message` must have a selection of subfields"]
    );
    let issues = validate(&schema, "query Messages { messages { text { length } } }");
    assert_eq!(
        messages(&issues),
        ["field `text` of type `String` must not have a selection set"]
    );
    let issues = validate(&schema, "query Messages { messages { body } }");
    assert_eq!(messages(&issues), ["Can't query `body` on type `Message`"]);
}

#[test]
fn single_operation_or_fragment() {
    let schema = chat_schema();
    let document = ExecutableDocument::parse(
        r#"
        query Texts { messages { ...Text } }
        query Broken { messages { body } }
        fragment Text on Message { text }
        fragment Unused on Message { nope }
        "#,
        "query.graphql",
    )
    .into_result()
    .unwrap();
    let options = ValidationOptions::new();

    let texts = document.get_operation("Texts").unwrap();
    let issues = validate_operation(&schema, &document, texts, &options);
    assert!(issues.is_empty(), "{issues}");

    let broken = document.get_operation("Broken").unwrap();
    let issues = validate_operation(&schema, &document, broken, &options);
    assert_eq!(issues.len(), 1, "{issues}");

    let unused = &document.fragments["Unused"];
    let issues = validate_fragment(&schema, &document, unused, &options);
    assert_eq!(messages(&issues), ["Can't query `nope` on type `Message`"]);
}
