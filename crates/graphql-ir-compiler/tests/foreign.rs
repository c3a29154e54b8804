use crate::messages;
use crate::schema;
use crate::validate;
use graphql_ir_compiler::ast::DirectiveLocation;
use graphql_ir_compiler::diagnostic::IssueKind;
use graphql_ir_compiler::Schema;

#[test]
fn kotlin_labs_is_available_without_link() {
    let schema = schema(
        r#"
        type Query { me: User }
        type User @typePolicy(keyFields: "id") @nonnull(fields: "name") { id: ID! name: String }
        "#,
    );
    assert_eq!(schema.original_directive_name("nonnull"), Some("nonnull"));
    assert!(schema.directive_definitions.contains_key("requiresOptIn"));
    assert!(schema
        .directives_to_strip()
        .iter()
        .any(|name| name == "optional"));
    assert_eq!(schema.key_fields("User").len(), 1);
}

#[test]
fn unimported_symbols_are_prefixed() {
    let schema = schema(
        r#"
        extend schema @link(url: "https://specs.apollo.dev/nullability/v0.1", import: ["@catch"])
        type Query { me: String }
        "#,
    );
    assert!(schema.directive_definitions.contains_key("catch"));
    assert!(schema
        .directive_definitions
        .contains_key("nullability__ignoreErrors"));
    assert!(schema
        .directive_definitions
        .contains_key("nullability__semanticNonNull"));
    assert!(schema.types.contains_key("nullability__CatchTo"));
    assert_eq!(
        schema.original_directive_name("nullability__ignoreErrors"),
        Some("ignoreErrors")
    );
    assert!(schema
        .directives_to_strip()
        .iter()
        .any(|name| name == "nullability__ignoreErrors"));
    // `@link` brings its own definitions
    assert!(schema.directive_definitions.contains_key("link"));
    assert!(schema.types.contains_key("link__Purpose"));
}

#[test]
fn custom_prefix_and_aliases() {
    let schema = schema(
        r#"
        extend schema @link(
          url: "https://specs.apollo.dev/kotlin_labs/v0.3"
          as: "kl"
          import: [{ name: "@typePolicy", as: "@policy" }]
        )
        type Query { book: Book }
        type Book @policy(keyFields: "id") { id: ID! }
        "#,
    );
    assert!(schema.directive_definitions.contains_key("kl__nonnull"));
    assert!(!schema.directive_definitions.contains_key("nonnull"));
    assert_eq!(schema.original_directive_name("policy"), Some("typePolicy"));
    assert_eq!(
        schema.foreign_directive("typePolicy").map(|def| def.name.as_str()),
        Some("policy")
    );
    assert_eq!(schema.key_fields("Book").len(), 1);

    let issues = validate(&schema, "query GetBook { book @nonnull { id } }");
    assert_eq!(messages(&issues), ["unknown directive `@nonnull`"]);
    assert_eq!(issues.iter().next().unwrap().kind, IssueKind::UnknownDirective);
    assert!(!issues.has_errors());
}

#[test]
fn unknown_foreign_schema() {
    let issues = Schema::parse_and_validate(
        r#"
        extend schema @link(url: "https://specs.apollo.dev/unknown/v9.9")
        type Query { me: String }
        "#,
        "schema.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["unknown foreign schema `https://specs.apollo.dev/unknown/v9.9`"]
    );
}

#[test]
fn unknown_import() {
    let issues = Schema::parse_and_validate(
        r#"
        extend schema @link(url: "https://specs.apollo.dev/cache/v0.1", import: ["@cacheForever"])
        type Query { me: String }
        "#,
        "schema.graphql",
    )
    .into_result()
    .unwrap_err();
    assert_eq!(
        messages(&issues),
        ["invalid `@link` directive: `@cacheForever` is not defined by cache/v0.1"]
    );
}

#[test]
fn user_definition_replaces_automatic_one() {
    let result = Schema::parse_and_validate(
        r#"
        directive @nonnull on FIELD
        type Query { me: String }
        "#,
        "schema.graphql",
    );
    let issues = &result.issues;
    assert_eq!(issues.len(), 1, "{issues}");
    let issue = issues.iter().next().unwrap();
    assert_eq!(issue.kind, IssueKind::DirectiveRedefinition);
    assert!(issue.is_warning());

    let schema = result.value.unwrap();
    assert_eq!(
        schema.directive_definitions["nonnull"].locations,
        [DirectiveLocation::Field]
    );
}
