use crate::document;
use crate::schema;
use crate::validate;
use crate::validate_with;
use graphql_ir_compiler::diagnostic::IssueKind;
use graphql_ir_compiler::diagnostic::Severity;
use graphql_ir_compiler::ir::build_ir;
use graphql_ir_compiler::ir::compute_shapes;
use graphql_ir_compiler::ir::IrOptions;
use graphql_ir_compiler::ir::IrType;
use graphql_ir_compiler::name;
use graphql_ir_compiler::validation::ValidationOptions;
use graphql_ir_compiler::Schema;
use std::collections::BTreeSet;

const NODE_SCHEMA: &str = r#"
type Query { node(id: ID!): Node }
interface Node { id: ID! }
type User implements Node { id: ID! name: String! }
"#;

#[test]
fn inline_fragment_on_implementation_adds_a_narrower_shape() {
    let schema = schema(NODE_SCHEMA);
    let query = r#"{ node(id: "1") { id ... on User { name } } }"#;
    let issues = validate(&schema, query);
    assert!(issues.is_empty(), "{issues}");

    let conditions = BTreeSet::from([name!("Node"), name!("User")]);
    let shapes = compute_shapes(&schema, "Node", &conditions);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].type_set.to_string(), "{Node, User}");
    assert_eq!(shapes[0].possible_types, BTreeSet::from([name!("User")]));

    let ir = build_ir(&schema, &document(query), &IrOptions::new()).unwrap();
    let operation = &ir.operations[0];
    assert_eq!(operation.name, "Query");
    let node = operation.data_field.field_sets[0].field("node").unwrap();
    let type_sets: Vec<String> = node
        .field_sets
        .iter()
        .map(|field_set| field_set.type_set.to_string())
        .collect();
    assert_eq!(type_sets, ["{Node}", "{Node, User}"]);
    assert_eq!(
        node.field_sets[1].implements,
        BTreeSet::from(["operation.Query.Data.node.Node".to_owned()])
    );
}

#[test]
fn upper_case_alias_is_reported() {
    let schema = schema(NODE_SCHEMA);
    let query = r#"query GetNode { node(id: "1") { Id: id } }"#;

    let issues = validate(&schema, query);
    assert_eq!(issues.len(), 1, "{issues}");
    let issue = issues.iter().next().unwrap();
    assert_eq!(issue.kind, IssueKind::UpperCaseField);
    assert_eq!(issue.severity, Severity::Error);

    let options = ValidationOptions::new().allow_upper_case_fields(true);
    let issues = validate_with(&schema, query, &options);
    assert!(issues.is_empty(), "{issues}");
}

#[test]
fn disjoint_types_may_use_different_arguments() {
    let schema = schema(
        r#"
        type Query { search: [SearchResult!]! }
        union SearchResult = Photo | Video
        type Photo { url(size: Int): String }
        type Video { url(size: Int): String }
        "#,
    );
    let issues = validate(
        &schema,
        r#"
        query Search {
          search {
            ... on Photo { url(size: 100) }
            ... on Video { url(size: 200) }
          }
        }
        "#,
    );
    assert!(issues.is_empty(), "{issues}");
}

#[test]
fn fragment_on_undefined_type_is_not_checked_further() {
    let schema = schema(NODE_SCHEMA);
    let issues = validate(&schema, "fragment UserFields on Missing { doesNotExist }");

    assert_eq!(issues.len(), 1, "{issues}");
    let issue = issues.iter().next().unwrap();
    assert_eq!(issue.kind, IssueKind::ValidationError);
    assert_eq!(issue.message, "cannot find type `Missing` in this document");
    let location = issue.location.as_ref().unwrap();
    assert_eq!((location.line, location.column), (1, 24));
}

#[test]
fn linked_nonnull_on_field_and_object() {
    let link = r#"
    extend schema @link(url: "https://specs.apollo.dev/kotlin_labs/v0.1", import: ["@nonnull"])
    type Query { user: User }
    "#;
    let schema = schema(&format!("{link} type User {{ id: ID! name: String }}"));
    let query = "query GetUser { user @nonnull { name @nonnull } }";
    let issues = validate(&schema, query);
    assert!(issues.is_empty(), "{issues}");

    let ir = build_ir(&schema, &document(query), &IrOptions::new()).unwrap();
    let user = ir.operations[0].data_field.field_sets[0].field("user").unwrap();
    assert!(user.ty.is_non_null());
    let name = user.field_sets[0].field("name").unwrap();
    assert_eq!(name.ty, IrType::Scalar(name!("String")).non_null());
    assert!(!ir.operations[0].source.contains("@nonnull"));

    let result = Schema::parse_and_validate(
        format!("{link} type User @nonnull {{ id: ID! name: String }}"),
        "schema.graphql",
    );
    assert!(result.value.is_none());
    let errors: Vec<_> = result.issues.errors().collect();
    assert_eq!(errors.len(), 1, "{}", result.issues);
    assert_eq!(
        errors[0].message,
        "`@nonnull` on object `User` requires a non-empty `fields` selection"
    );
}
