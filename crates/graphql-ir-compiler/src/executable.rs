//! Operations and fragments of an executable document, separated from other definitions.

use crate::ast;
use crate::ast::FragmentDefinition;
use crate::ast::OperationDefinition;
use crate::diagnostic::CompileResult;
use crate::diagnostic::DiagnosticList;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::Name;
use crate::Node;
use crate::Parser;
use crate::SourceMap;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::path::Path;

/// The operations and fragments of one or more documents.
///
/// Building one only checks that names are unique,
/// see [`validate_executable_document`][crate::validation::validate_executable_document]
/// for validation against a schema.
#[derive(Debug, Clone, Default)]
pub struct ExecutableDocument {
    /// Source files the definitions were parsed from
    pub sources: SourceMap,
    /// Operations in document order, anonymous ones included
    pub operations: Vec<Node<OperationDefinition>>,
    pub fragments: IndexMap<Name, Node<FragmentDefinition>>,
}

impl ExecutableDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an executable document with the default parser configuration
    pub fn parse(source_text: impl Into<String>, path: impl AsRef<Path>) -> CompileResult<Self> {
        let mut errors = DiagnosticList::new(Default::default());
        let document =
            Parser::new().parse_ast_inner(source_text, path, FileId::new(), &mut errors);
        let mut executable = Self::new();
        executable.add_definitions(&document, &mut errors);
        executable.sources = errors.sources.clone();
        errors.into_compile_result(executable)
    }

    /// Collect the executable definitions of a parsed document.
    /// Type system definitions are reported as errors.
    pub fn from_ast(document: &ast::Document) -> CompileResult<Self> {
        let mut errors = DiagnosticList::new(document.sources.clone());
        let mut executable = Self::new();
        executable.add_definitions(document, &mut errors);
        executable.sources = errors.sources.clone();
        errors.into_compile_result(executable)
    }

    fn add_definitions(&mut self, document: &ast::Document, errors: &mut DiagnosticList) {
        for definition in &document.definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => {
                    if let Some(name) = &operation.name {
                        if let Some(original) = self.get_operation(name) {
                            errors.push(
                                name.location(),
                                DiagnosticData::DuplicateOperationName {
                                    name: name.clone(),
                                    original_definition: original.location(),
                                },
                            );
                            continue;
                        }
                    }
                    self.operations.push(operation.clone());
                }
                ast::Definition::FragmentDefinition(fragment) => {
                    match self.fragments.entry(fragment.name.clone()) {
                        Entry::Occupied(entry) => errors.push(
                            fragment.name.location(),
                            DiagnosticData::DuplicateFragmentName {
                                name: fragment.name.clone(),
                                original_definition: entry.get().location(),
                            },
                        ),
                        Entry::Vacant(entry) => {
                            entry.insert(fragment.clone());
                        }
                    }
                }
                _ => errors.push(
                    definition.location(),
                    DiagnosticData::TypeSystemDefinitionInExecutable {
                        describe: definition.describe(),
                    },
                ),
            }
        }
        log::debug!(
            "collected {} operations and {} fragments",
            self.operations.len(),
            self.fragments.len()
        );
    }

    /// Returns the named operation
    pub fn get_operation(&self, name: &str) -> Option<&Node<OperationDefinition>> {
        self.operations
            .iter()
            .find(|operation| operation.name.as_ref().is_some_and(|op_name| op_name == name))
    }
}
