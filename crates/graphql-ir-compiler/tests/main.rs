mod codegen;
mod executable;
mod field_merging;
mod foreign;
mod fragments;
mod ir;
mod key_fields;
mod scenarios;
mod schema;
mod variables;

use graphql_ir_compiler::validation::validate_executable_document;
use graphql_ir_compiler::validation::ValidationOptions;
use graphql_ir_compiler::DiagnosticList;
use graphql_ir_compiler::ExecutableDocument;
use graphql_ir_compiler::Schema;
use graphql_ir_compiler::Valid;

#[track_caller]
pub(crate) fn schema(sdl: &str) -> Valid<Schema> {
    let _ = env_logger::builder().is_test(true).try_init();
    match Schema::parse_and_validate(sdl, "schema.graphql").into_result() {
        Ok(schema) => schema,
        Err(issues) => panic!("invalid schema:\n{issues}"),
    }
}

#[track_caller]
pub(crate) fn document(source: &str) -> ExecutableDocument {
    match ExecutableDocument::parse(source, "query.graphql").into_result() {
        Ok(document) => document,
        Err(issues) => panic!("invalid document:\n{issues}"),
    }
}

pub(crate) fn validate(schema: &Valid<Schema>, source: &str) -> DiagnosticList {
    validate_with(schema, source, &ValidationOptions::new())
}

pub(crate) fn validate_with(
    schema: &Valid<Schema>,
    source: &str,
    options: &ValidationOptions,
) -> DiagnosticList {
    validate_executable_document(schema, &document(source), options)
}

pub(crate) fn messages(issues: &DiagnosticList) -> Vec<String> {
    issues.iter().map(|issue| issue.message.clone()).collect()
}
