use crate::messages;
use crate::schema;
use crate::validate;
use crate::validate_with;
use graphql_ir_compiler::diagnostic::IssueKind;
use graphql_ir_compiler::diagnostic::IssueSeverities;
use graphql_ir_compiler::diagnostic::Severity;
use graphql_ir_compiler::validation::ValidationOptions;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;

fn media_schema() -> Valid<Schema> {
    schema(
        r#"
        type Query { search: [SearchResult!]! node(id: ID!): Node }
        union SearchResult = Photo | Video
        interface Node { id: ID! }
        type Photo implements Node { id: ID! url(size: Int): String size: Int }
        type Video implements Node { id: ID! url(size: Int): String size: String }
        "#,
    )
}

#[test]
fn differing_arguments_on_the_same_type() {
    let issues = validate(
        &media_schema(),
        r#"
        query Search {
          search {
            ... on Photo { url(size: 100) }
            ... on Photo { url(size: 200) }
          }
        }
        "#,
    );
    assert_eq!(
        messages(&issues),
        [
            "fields `url` conflict because they have differing arguments",
            "fields `url` conflict because they have differing arguments",
        ]
    );
}

#[test]
fn same_response_name_for_different_fields() {
    let issues = validate(
        &media_schema(),
        r#"
        query GetNode {
          node(id: "1") {
            ... on Photo { label: id }
            ... on Photo { label: url }
          }
        }
        "#,
    );
    assert_eq!(issues.len(), 2, "{issues}");
    assert!(issues
        .iter()
        .all(|issue| issue.message
            == "fields `label` conflict because `id` and `url` are different fields"));
}

#[test]
fn argument_order_does_not_matter() {
    let schema = schema(
        r#"
        type Query { photo: Photo }
        type Photo { url(width: Int, height: Int): String }
        "#,
    );
    let issues = validate(
        &schema,
        "query GetPhoto { photo { url(width: 1, height: 2) url(height: 2, width: 1) } }",
    );
    assert!(issues.is_empty(), "{issues}");
}

const DIFFERENT_SHAPES: &str = r#"
query Search {
  search {
    ... on Photo { size }
    ... on Video { size }
  }
}
"#;

#[test]
fn disjoint_types_need_the_same_shape() {
    let issues = validate(&media_schema(), DIFFERENT_SHAPES);
    assert_eq!(issues.len(), 2, "{issues}");
    for issue in issues.iter() {
        assert_eq!(issue.kind, IssueKind::DifferentShape);
        assert_eq!(issue.severity, Severity::Error);
        assert!(
            issue
                .message
                .starts_with("fields `size` conflict because they return conflicting types"),
            "{}",
            issue.message
        );
    }
}

#[test]
fn different_shapes_can_be_warnings_or_ignored() {
    let options = ValidationOptions::new()
        .severities(IssueSeverities::default().different_shape(Severity::Warning));
    let issues = validate_with(&media_schema(), DIFFERENT_SHAPES, &options);
    assert_eq!(issues.warnings().count(), 2);
    assert!(!issues.has_errors());

    let options = ValidationOptions::new().check_fields_on_disjoint_types(false);
    let issues = validate_with(&media_schema(), DIFFERENT_SHAPES, &options);
    assert!(issues.is_empty(), "{issues}");
}

#[test]
fn conflict_inside_a_fragment_is_reported_once() {
    let issues = validate(
        &media_schema(),
        r#"
        query Search {
          search { ...PhotoFields }
          node(id: "1") { ...PhotoFields }
        }

        fragment PhotoFields on Photo {
          url(size: 1)
          url(size: 2)
        }
        "#,
    );
    assert_eq!(issues.len(), 2, "{issues}");
    let location = issues.iter().next().unwrap().location.as_ref().unwrap();
    assert_eq!(location.line, 8);
}

#[test]
fn nested_fields_are_merged() {
    let schema = schema(
        r#"
        type Query { me: User }
        type User { name: String friend: User }
        "#,
    );
    let issues = validate(
        &schema,
        r#"
        query Me {
          me { friend { label: name } }
          me { friend { label: friend { name } } }
        }
        "#,
    );
    assert_eq!(issues.len(), 2, "{issues}");
    assert!(messages(&issues)[0].contains("`name` and `friend` are different fields"));
}
