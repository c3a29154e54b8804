use crate::document;
use crate::schema;
use graphql_ir_compiler::diagnostic::Severity;
use graphql_ir_compiler::ir::build_ir;
use graphql_ir_compiler::ir::IrOptions;
use graphql_ir_compiler::ir::ResolverKind;
use graphql_ir_compiler::name;
use graphql_ir_compiler::schema::CodegenSchema;
use graphql_ir_compiler::validation::ValidationOptions;

const SDL: &str = r#"
scalar Date
type Query { books: [Book!]! }
type Book @typePolicy(keyFields: "isbn") {
  isbn: String!
  "When the book came out"
  published: Date
}
"#;

#[test]
fn schema_survives_persistence() {
    let codegen = CodegenSchema::new(schema(SDL))
        .scalar_mapping(name!("Date"), "java.time.LocalDate")
        .generate_data_builders(true);
    let json = codegen.to_json().unwrap();
    let loaded = CodegenSchema::from_json(&json).unwrap();
    assert_eq!(loaded, codegen);
    assert_eq!(loaded.scalar_mapping["Date"], "java.time.LocalDate");
    assert!(loaded.generate_data_builders);

    let schema = loaded.valid_schema();
    let key_fields: Vec<&str> = schema
        .key_fields
        .get("Book")
        .unwrap()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(key_fields, ["isbn"]);
    // Source maps are not persisted
    assert!(schema.sources.is_empty());

    let ir = build_ir(
        &schema,
        &document("query Books { books { isbn published } }"),
        &IrOptions::new(),
    )
    .unwrap();
    let published = ir.operations[0].data_field.field_sets[0]
        .field("books")
        .unwrap()
        .field_sets[0]
        .field("published")
        .unwrap();
    assert_eq!(published.description.as_deref(), Some("When the book came out"));
}

#[test]
fn metadata_json_layout() {
    let schema = schema(SDL);
    let ir = build_ir(
        &schema,
        &document("fragment BookFields on Book { isbn }"),
        &IrOptions::new(),
    )
    .unwrap();
    let json = ir.metadata.to_json().unwrap();
    assert!(json.contains("\"resolverEntries\""), "{json}");
    assert!(json.contains("\"fragment\""), "{json}");

    let value = serde_json::to_value(&ir.metadata).unwrap();
    let entries = value["resolverEntries"].as_array().unwrap();
    let fragment_entry = entries
        .iter()
        .find(|entry| entry["key"]["kind"] == "fragment")
        .unwrap();
    assert_eq!(fragment_entry["key"]["id"], "BookFields");
    assert_eq!(fragment_entry["name"], "BookFields");
    assert_eq!(
        ir.metadata.resolve(ResolverKind::Model, "fragment.BookFields.Data"),
        Some("BookFields.Data")
    );
}

#[test]
fn ir_serializes_to_json() {
    let schema = schema(SDL);
    let ir = build_ir(
        &schema,
        &document("query Books { books { isbn } }"),
        &IrOptions::new(),
    )
    .unwrap();
    let value = serde_json::to_value(&ir).unwrap();
    let operation = &value["operations"][0];
    assert_eq!(operation["name"], "Books");
    assert_eq!(operation["operationType"], "query");
    let books = &operation["dataField"]["fieldSets"][0]["fields"][0];
    assert_eq!(books["responseName"], "books");
    assert_eq!(books["fieldSets"][0]["path"], "operation.Books.Data.books.Books");
    assert_eq!(books["fieldSets"][0]["typeSet"][0], "Book");
}

#[test]
fn options_from_configuration() {
    let options: ValidationOptions = serde_json::from_str(
        r#"{
          "allowUpperCaseFields": true,
          "severities": { "deprecatedUsage": "error", "unusedVariable": "error" }
        }"#,
    )
    .unwrap();
    assert!(options.allow_upper_case_fields);
    assert!(options.check_fields_on_disjoint_types);
    assert_eq!(options.severities.deprecated_usage, Severity::Error);
    assert_eq!(options.severities.unused_variable, Severity::Error);
    assert_eq!(options.severities.unknown_directive, Severity::Warning);
}
