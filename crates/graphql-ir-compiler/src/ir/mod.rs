//! Intermediate representation consumed by code generation.
//!
//! Every field with a selection set gets one [`IrFieldSet`] per shape:
//! per combination of type conditions that objects at that position can satisfy.
//! Field sets record the other field sets they implement, so that generated models
//! can share interfaces.
//!
//! ## Example
//!
//! ```
//! use graphql_ir_compiler::ir::{build_ir, IrOptions};
//! use graphql_ir_compiler::{ExecutableDocument, Schema};
//!
//! let schema = Schema::parse_and_validate(
//!     r#"
//!     type Query { node(id: ID!): Node }
//!     interface Node { id: ID! }
//!     type User implements Node { id: ID! name: String! }
//!     "#,
//!     "schema.graphql",
//! )
//! .into_result()
//! .unwrap();
//! let document = ExecutableDocument::parse(
//!     r#"query GetNode { node(id: "1") { id ... on User { name } } }"#,
//!     "query.graphql",
//! )
//! .into_result()
//! .unwrap();
//!
//! let ir = build_ir(&schema, &document, &IrOptions::new()).unwrap();
//! let node = ir.operations[0].data_field.field_sets[0].field("node").unwrap();
//! let paths: Vec<_> = node.field_sets.iter().map(|set| set.path.as_str()).collect();
//! assert_eq!(
//!     paths,
//!     ["operation.GetNode.Data.node.Node", "operation.GetNode.Data.node.NodeOnUser"]
//! );
//! ```

use crate::ast::OperationType;
use crate::ast::Value;
use crate::condition::BooleanExpression;
use crate::diagnostic::DiagnosticList;
use crate::executable::ExecutableDocument;
use crate::validation::fragment::spread_closure;
use crate::validation::infer_fragment_variables;
use crate::validation::known_fragments;
use crate::validation::Valid;
use crate::validation::ValidationOptions;
use crate::Name;
use crate::Node;
use crate::Schema;
use std::collections::BTreeSet;

pub(crate) mod field_set;
pub(crate) mod metadata;
pub(crate) mod shapes;
pub(crate) mod source;
pub(crate) mod ty;

pub use self::metadata::CodegenMetadata;
pub use self::metadata::ResolverEntry;
pub use self::metadata::ResolverKey;
pub use self::metadata::ResolverKind;
pub use self::metadata::UpstreamFragment;
pub use self::shapes::common_ancestors;
pub use self::shapes::compute_shapes;
pub use self::shapes::direct_ancestors;
pub use self::shapes::Shape;
pub use self::shapes::TypeSet;
pub use self::ty::IrType;

/// Configuration of [`build_ir`]
///
/// ```
/// use graphql_ir_compiler::ir::{AddTypename, IrOptions};
///
/// let options: IrOptions = serde_json::from_str(r#"{"addTypename": "always"}"#).unwrap();
/// assert_eq!(options.add_typename, AddTypename::Always);
/// ```
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrOptions {
    /// Fragments compiled by upstream modules, which operations may spread
    pub upstream: Option<CodegenMetadata>,
    pub add_typename: AddTypename,
}

impl IrOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upstream(mut self, metadata: CodegenMetadata) -> Self {
        self.upstream = Some(metadata);
        self
    }

    pub fn add_typename(mut self, add_typename: AddTypename) -> Self {
        self.add_typename = add_typename;
        self
    }
}

/// Where `__typename` is added to the documents sent to the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddTypename {
    /// In selection sets on interfaces and unions
    #[default]
    IfAbstract,
    /// In every selection set of a field or fragment
    Always,
    Never,
}

/// Inconsistent input reached the IR builder.
///
/// Documents that passed validation never produce these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IrError {
    #[error("the schema has no `{}` root operation", .operation_type.name())]
    MissingRootOperation { operation_type: OperationType },
    #[error("type `{type_name}` does not have a field `{field}`")]
    UndefinedField { type_name: Name, field: Name },
    #[error("cannot find fragment `{name}`")]
    UndefinedFragment { name: Name },
    #[error("fragment `{name}` spreads itself")]
    RecursiveFragment { name: Name },
    #[error("field set `{path}` was built twice")]
    DuplicateFieldSet { path: String },
    #[error("type sets {first} and {second} both name the field set `{path}`")]
    ModelNameClash {
        path: String,
        first: TypeSet,
        second: TypeSet,
    },
    #[error("no field selected at `{path}`")]
    EmptyField { path: String },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperations {
    pub operations: Vec<IrOperation>,
    /// Fragments defined in the document, not those of upstream modules
    pub fragments: Vec<IrNamedFragment>,
    /// What modules depending on this one need
    pub metadata: CodegenMetadata,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperation {
    /// The root type name for an anonymous operation
    pub name: Name,
    pub operation_type: OperationType,
    /// The root operation type
    pub type_condition: Name,
    pub variables: Vec<IrVariable>,
    pub data_field: IrField,
    /// The document sent to the server
    pub source: String,
    /// Fragments used by the operation, directly or not
    pub fragment_names: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrNamedFragment {
    pub name: Name,
    pub type_condition: Name,
    /// Inferred from usages, as fragments do not declare variables
    pub variables: Vec<IrVariable>,
    pub data_field: IrField,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrVariable {
    pub name: Name,
    pub ty: IrType,
    pub default_value: Option<Node<Value>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IrArgument {
    pub name: Name,
    /// Coerced to the type of the argument definition
    pub value: Node<Value>,
}

/// A response entry, merged from every selection with its response name
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrField {
    pub name: Name,
    pub alias: Option<Name>,
    pub response_name: Name,
    /// References the base field set if the field has a selection set
    pub ty: IrType,
    pub arguments: Vec<IrArgument>,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    /// When the field is present in the response
    pub condition: BooleanExpression,
    /// Empty for leaf fields. Otherwise the base field set first,
    /// then in ascending type set size.
    pub field_sets: Vec<IrFieldSet>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrFieldSet {
    /// Unique in the whole IR, for example `operation.GetNode.Data.node.NodeOnUser`
    pub path: String,
    pub type_set: TypeSet,
    /// The concrete object types that satisfy every condition of `type_set`
    pub possible_types: BTreeSet<Name>,
    pub fields: Vec<IrField>,
    /// Paths of the field sets this one implements directly
    pub implements: BTreeSet<String>,
    /// The type conditions of `type_set` other than the base type
    pub condition: BooleanExpression,
}

impl IrOperations {
    pub fn operation(&self, name: &str) -> Option<&IrOperation> {
        self.operations
            .iter()
            .find(|operation| operation.name == name)
    }

    pub fn fragment(&self, name: &str) -> Option<&IrNamedFragment> {
        self.fragments.iter().find(|fragment| fragment.name == name)
    }
}

impl IrField {
    /// The field set of the field's own type
    pub fn base_field_set(&self) -> Option<&IrFieldSet> {
        self.field_sets.first()
    }

    pub fn field_set(&self, type_set: &TypeSet) -> Option<&IrFieldSet> {
        self.field_sets
            .iter()
            .find(|field_set| field_set.type_set == *type_set)
    }

    /// This field's field sets and those of every nested field
    pub fn all_field_sets(&self) -> Vec<&IrFieldSet> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(field) = stack.pop() {
            for field_set in &field.field_sets {
                result.push(field_set);
                stack.extend(&field_set.fields);
            }
        }
        result
    }
}

impl IrFieldSet {
    pub fn field(&self, response_name: &str) -> Option<&IrField> {
        self.fields
            .iter()
            .find(|field| field.response_name == response_name)
    }
}

/// Build the IR of every operation and fragment of `document`.
///
/// The document is expected to have passed
/// [`validate_executable_document`][crate::validation::validate_executable_document]
/// with the same upstream metadata.
pub fn build_ir(
    schema: &Valid<Schema>,
    document: &ExecutableDocument,
    options: &IrOptions,
) -> Result<IrOperations, IrError> {
    let validation_options = ValidationOptions {
        upstream: options.upstream.clone(),
        ..Default::default()
    };
    let fragments = known_fragments(document, &validation_options);
    let mut builder = field_set::IrBuilder::new(schema, &fragments);

    let mut operations = Vec::with_capacity(document.operations.len());
    for operation in &document.operations {
        let root = schema.root_operation(operation.operation_type).ok_or(
            IrError::MissingRootOperation {
                operation_type: operation.operation_type,
            },
        )?;
        // The short-hand form is named after its root type
        let name = operation.name.clone().unwrap_or_else(|| root.clone());
        let data_field = builder.root_field(
            &format!("operation.{name}"),
            &name,
            root,
            &operation.selection_set,
        )?;
        let fragment_names = used_fragments(&fragments, &operation.selection_set);
        let source = source::operation_source(
            schema,
            &fragments,
            operation,
            &fragment_names,
            options.add_typename,
        );
        let variables = operation
            .variables
            .iter()
            .map(|variable| IrVariable {
                name: variable.name.clone(),
                ty: IrType::from_type(schema, &variable.ty, None),
                default_value: variable.default_value.clone(),
            })
            .collect();
        operations.push(IrOperation {
            name,
            operation_type: operation.operation_type,
            type_condition: root.clone(),
            variables,
            data_field,
            source,
            fragment_names,
        });
    }

    let mut ir_fragments = Vec::with_capacity(document.fragments.len());
    let mut metadata_fragments = Vec::with_capacity(document.fragments.len());
    let mut scratch = DiagnosticList::new(Default::default());
    for definition in document.fragments.values() {
        let data_field = builder.fragment_root(&definition.name)?;
        let usages = infer_fragment_variables(schema, definition, &fragments, &mut scratch);
        let variables = usages
            .iter()
            .map(|(name, usage)| IrVariable {
                name: name.clone(),
                ty: IrType::from_type(schema, &usage.expected_type, None),
                default_value: None,
            })
            .collect();
        let fragment_names = used_fragments(&fragments, &definition.selection_set);
        let source = source::fragment_source(
            schema,
            &fragments,
            definition,
            &fragment_names,
            options.add_typename,
        );
        ir_fragments.push(IrNamedFragment {
            name: definition.name.clone(),
            type_condition: definition.type_condition.clone(),
            variables,
            data_field: (*data_field).clone(),
            source,
        });
        metadata_fragments.push(UpstreamFragment {
            definition: definition.clone(),
            variables: usages,
        });
    }

    log::debug!(
        "built IR for {} operations and {} fragments: {} resolver entries",
        operations.len(),
        ir_fragments.len(),
        builder.resolver_entries.len()
    );
    Ok(IrOperations {
        operations,
        fragments: ir_fragments,
        metadata: CodegenMetadata {
            fragments: metadata_fragments,
            resolver_entries: builder.resolver_entries,
        },
    })
}

/// Sorted names of the fragments reachable from `selections`
fn used_fragments(
    fragments: &indexmap::IndexMap<Name, Node<crate::ast::FragmentDefinition>>,
    selections: &[crate::ast::Selection],
) -> Vec<Name> {
    let mut names: Vec<Name> = spread_closure(fragments, selections)
        .into_iter()
        .cloned()
        .collect();
    names.sort();
    names
}
