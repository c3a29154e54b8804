//! Validation of executable documents against a schema.
//!
//! Schema rules run as part of [`SchemaBuilder::build`][crate::SchemaBuilder::build].
//! The rules here check operations and fragments, and collect how variables are used.

use crate::ast::FragmentDefinition;
use crate::ast::OperationDefinition;
use crate::ast::Type;
use crate::ast::Value;
use crate::diagnostic::DiagnosticList;
use crate::diagnostic::IssueSeverities;
use crate::executable::ExecutableDocument;
use crate::ir::CodegenMetadata;
use crate::Name;
use crate::Node;
use crate::NodeLocation;
use crate::Schema;
use indexmap::IndexMap;
use std::collections::HashSet;

pub(crate) mod diagnostics;
pub(crate) mod directive;
pub(crate) mod field_merging;
pub(crate) mod fragment;
pub(crate) mod operation;
pub(crate) mod selection;
pub(crate) mod value;
pub(crate) mod variable;

pub(crate) use diagnostics::DiagnosticData;

/// Wraps a value that has passed validation.
///
/// A `Valid<Schema>` can only be obtained from [`SchemaBuilder::build`][crate::SchemaBuilder::build]
/// or by explicitly asserting validity with [`Valid::assume_valid`].
/// Document validation and IR building require one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(transparent)]
pub struct Valid<T>(pub(crate) T);

impl<T> Valid<T> {
    /// Construct a `Valid` value without running validation.
    ///
    /// This is meant for values that were validated before, for example
    /// a schema deserialized from a previous compilation.
    pub fn assume_valid(value: T) -> Self {
        Self(value)
    }

    /// Extract the inner value, for example to modify it
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Valid<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> AsRef<T> for Valid<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

/// Knobs for document validation.
///
/// Deserializable so that build tools can read it from a configuration file:
///
/// ```rust
/// use graphql_ir_compiler::validation::ValidationOptions;
///
/// let options: ValidationOptions =
///     serde_json::from_str(r#"{"allowUpperCaseFields": true}"#).unwrap();
/// assert!(options.allow_upper_case_fields);
/// assert!(options.check_fields_on_disjoint_types);
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Severity of the configurable issue kinds
    pub severities: IssueSeverities,
    /// Accept field names and aliases starting with an uppercase letter
    pub allow_upper_case_fields: bool,
    /// Report fields of disjoint object types whose response shapes differ
    pub check_fields_on_disjoint_types: bool,
    /// Fragments compiled in an upstream module, available to spreads in this document
    #[serde(skip)]
    pub upstream: Option<CodegenMetadata>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            severities: IssueSeverities::default(),
            allow_upper_case_fields: false,
            check_fields_on_disjoint_types: true,
            upstream: None,
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn severities(mut self, severities: IssueSeverities) -> Self {
        self.severities = severities;
        self
    }

    pub fn allow_upper_case_fields(mut self, allow: bool) -> Self {
        self.allow_upper_case_fields = allow;
        self
    }

    pub fn check_fields_on_disjoint_types(mut self, check: bool) -> Self {
        self.check_fields_on_disjoint_types = check;
        self
    }

    pub fn upstream(mut self, metadata: CodegenMetadata) -> Self {
        self.upstream = Some(metadata);
        self
    }
}

/// How a variable is used at one position in a document
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableUsage {
    /// The type expected at the position where the variable is used
    pub expected_type: Type,
    /// Default value of the argument or input field the variable is passed to
    pub location_default: Option<Node<Value>>,
}

/// A variable used somewhere in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    pub name: Name,
    pub usage: VariableUsage,
    pub location: Option<NodeLocation>,
}

/// Read-only state shared by the rules while validating one document
pub(crate) struct ValidationContext<'a> {
    pub(crate) schema: &'a Schema,
    /// Fragments of the document, then those of upstream modules
    pub(crate) fragments: &'a IndexMap<Name, Node<FragmentDefinition>>,
    pub(crate) options: &'a ValidationOptions,
}

impl<'a> ValidationContext<'a> {
    /// Variables used by an upstream fragment, as recorded when it was compiled.
    /// `None` for a fragment of the document being validated.
    pub(crate) fn upstream_variables(
        &self,
        fragment: &Node<FragmentDefinition>,
    ) -> Option<Vec<VariableReference>> {
        let upstream = self.options.upstream.as_ref()?;
        let fragment = upstream
            .fragments
            .iter()
            .find(|upstream| upstream.definition == *fragment)?;
        Some(
            fragment
                .variables
                .iter()
                .map(|(name, usage)| VariableReference {
                    name: name.clone(),
                    usage: usage.clone(),
                    location: None,
                })
                .collect(),
        )
    }
}

/// Fragments defined in `document`, followed by upstream fragments it does not redefine
pub(crate) fn known_fragments(
    document: &ExecutableDocument,
    options: &ValidationOptions,
) -> IndexMap<Name, Node<FragmentDefinition>> {
    let mut fragments = document.fragments.clone();
    if let Some(upstream) = &options.upstream {
        for fragment in &upstream.fragments {
            fragments
                .entry(fragment.definition.name.clone())
                .or_insert_with(|| fragment.definition.clone());
        }
    }
    fragments
}

/// Validate every operation and fragment of `document`.
///
/// The returned list holds both errors and warnings.
pub fn validate_executable_document(
    schema: &Valid<Schema>,
    document: &ExecutableDocument,
    options: &ValidationOptions,
) -> DiagnosticList {
    let mut diagnostics =
        DiagnosticList::new(document.sources.clone()).with_severities(options.severities.clone());
    let fragments = known_fragments(document, options);
    let context = ValidationContext {
        schema,
        fragments: &fragments,
        options,
    };
    fragment::validate_fragment_cycles(&document.fragments, &mut diagnostics);
    operation::validate_lone_anonymous(&document.operations, &mut diagnostics);
    for definition in document.fragments.values() {
        fragment::validate_fragment_definition(&context, definition, &mut diagnostics);
    }
    for operation in &document.operations {
        operation::validate_operation_definition(&context, operation, &mut diagnostics);
    }
    log::debug!(
        "validated {} operations and {} fragments: {} issues",
        document.operations.len(),
        document.fragments.len(),
        diagnostics.len()
    );
    diagnostics
}

/// Validate a single operation of `document`, together with the fragments it uses.
pub fn validate_operation(
    schema: &Valid<Schema>,
    document: &ExecutableDocument,
    operation: &Node<OperationDefinition>,
    options: &ValidationOptions,
) -> DiagnosticList {
    let mut diagnostics =
        DiagnosticList::new(document.sources.clone()).with_severities(options.severities.clone());
    let fragments = known_fragments(document, options);
    let context = ValidationContext {
        schema,
        fragments: &fragments,
        options,
    };
    let used: HashSet<&Name> = fragment::spread_closure(&fragments, &operation.selection_set);
    for definition in document.fragments.values() {
        if used.contains(&definition.name) {
            fragment::validate_fragment_definition(&context, definition, &mut diagnostics);
        }
    }
    if operation.name.is_none() && document.operations.len() > 1 {
        diagnostics.push(
            operation.location(),
            DiagnosticData::AnonymousOperation {
                operation_type: operation.operation_type,
                operations: document.operations.len(),
            },
        );
    }
    operation::validate_operation_definition(&context, operation, &mut diagnostics);
    diagnostics
}

/// Validate a single fragment definition of `document`
pub fn validate_fragment(
    schema: &Valid<Schema>,
    document: &ExecutableDocument,
    definition: &Node<FragmentDefinition>,
    options: &ValidationOptions,
) -> DiagnosticList {
    let mut diagnostics =
        DiagnosticList::new(document.sources.clone()).with_severities(options.severities.clone());
    let fragments = known_fragments(document, options);
    let context = ValidationContext {
        schema,
        fragments: &fragments,
        options,
    };
    fragment::validate_fragment_definition(&context, definition, &mut diagnostics);
    diagnostics
}

/// Infer the variables a fragment uses, including through the fragments it spreads,
/// with the type each of them is expected to have.
///
/// A variable used with two different types is reported as inconsistent
/// and keeps the first type.
pub fn infer_fragment_variables(
    schema: &Valid<Schema>,
    definition: &Node<FragmentDefinition>,
    fragments: &IndexMap<Name, Node<FragmentDefinition>>,
    diagnostics: &mut DiagnosticList,
) -> IndexMap<Name, VariableUsage> {
    let options = ValidationOptions::default();
    let context = ValidationContext {
        schema,
        fragments,
        options: &options,
    };
    let references = fragment::collect_references(&context, definition, &mut HashSet::new());
    fragment::group_references(&definition.name, references, diagnostics)
}
