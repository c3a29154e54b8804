use crate::ast::DirectiveLocation;
use crate::ast::OperationType;
use crate::diagnostic::CliReport;
use crate::diagnostic::IssueKind;
use crate::Name;
use crate::NodeLocation;
use thiserror::Error;

/// Structured data about a diagnostic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub(crate) enum DiagnosticData {
    #[error("syntax error: {message}")]
    SyntaxError { message: String },
    #[error("parser limit reached: {message}")]
    ParserLimit { message: String },

    #[error("duplicate definitions for the `schema` definition")]
    DuplicateSchemaDefinition {
        original_definition: Option<NodeLocation>,
    },
    #[error("the directive `@{name}` is defined multiple times in the schema")]
    DuplicateDirectiveDefinition {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("the directive `@{name}` is also defined by Apollo, this definition replaces it")]
    DirectiveRedefinition { name: Name },
    #[error("the type `{name}` is defined multiple times in the schema")]
    DuplicateTypeDefinition {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("missing query root operation type in schema definition")]
    QueryRootOperationType,
    #[error("the {operation_type} root operation type `{name}` is not defined")]
    UndefinedRootOperationType {
        operation_type: OperationType,
        name: Name,
    },
    #[error("`{name}` root operation type must be an object type, found {describe_type}")]
    RootOperationObjectType {
        name: Name,
        describe_type: &'static str,
    },
    #[error("duplicate {operation_type} root operation type")]
    DuplicateRootOperation {
        operation_type: OperationType,
        original_definition: Option<NodeLocation>,
    },
    #[error("a schema extension requires a schema definition")]
    SchemaExtensionWithoutDefinition,
    #[error("cannot extend undefined type `{name}`")]
    ExtensionWithoutDefinition { name: Name },
    #[error("cannot extend {describe_type} `{name}` with {describe_extension}")]
    ExtensionKindMismatch {
        name: Name,
        describe_type: &'static str,
        describe_extension: &'static str,
    },
    #[error("{describe_member} `{name}` is defined multiple times on `{type_name}`")]
    DuplicateMember {
        describe_member: &'static str,
        name: Name,
        type_name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("`{name}` is reserved: names starting with `__` belong to the introspection system")]
    ReservedName { name: Name },
    #[error("{describe_type} `{name}` must define at least one field")]
    EmptyFields {
        describe_type: &'static str,
        name: Name,
    },
    #[error("`{type_name}` implements undefined interface `{interface}`")]
    UndefinedInterface { type_name: Name, interface: Name },
    #[error("`{type_name}` cannot implement `{interface}`, which is {describe_type}")]
    ImplementsNonInterface {
        type_name: Name,
        interface: Name,
        describe_type: &'static str,
    },
    #[error("union member `{name}` of `{union_name}` must be an object type")]
    UnionMemberObjectType { union_name: Name, name: Name },
    #[error("cannot find type `{name}` in this document")]
    UndefinedDefinition { name: Name },
    #[error("`{coordinate}` must return an output type, `{name}` is {describe_type}")]
    OutputType {
        coordinate: String,
        name: Name,
        describe_type: &'static str,
    },
    #[error("`{coordinate}` must be of an input type, `{name}` is {describe_type}")]
    InputType {
        coordinate: String,
        name: Name,
        describe_type: &'static str,
    },

    #[error("unknown foreign schema `{url}`")]
    UnknownForeignSchema { url: String },
    #[error("invalid `@link` directive: {message}")]
    InvalidLink { message: String },
    #[error("invalid key fields on `{type_name}`: {message}")]
    InvalidKeyFields { type_name: Name, message: String },
    #[error("type `{type_name}` inherits conflicting key fields `{first}` and `{second}`")]
    ConflictingKeyFields {
        type_name: Name,
        first: String,
        second: String,
    },
    #[error("type `{type_name}` cannot declare key fields, it inherits them from `{super_type}`")]
    KeyFieldsOnInheritingType { type_name: Name, super_type: Name },
    #[error("`@{name}` takes no arguments when used on a field")]
    NonnullFieldArguments { name: Name },
    #[error("`@{name}` on object `{type_name}` requires a non-empty `fields` selection")]
    NonnullObjectFields { name: Name, type_name: Name },
    #[error("`@{name}` on `{type_name}` references undefined field `{field}`")]
    NonnullUndefinedField {
        name: Name,
        type_name: Name,
        field: String,
    },

    #[error("executable documents must not contain {describe}")]
    TypeSystemDefinitionInExecutable { describe: &'static str },
    #[error("the operation `{name}` is defined multiple times")]
    DuplicateOperationName {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("the fragment `{name}` is defined multiple times")]
    DuplicateFragmentName {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error(
        "an anonymous {operation_type} must be the only operation, \
         this document has {operations}"
    )]
    AnonymousOperation {
        operation_type: OperationType,
        operations: usize,
    },
    #[error("the schema does not define a {operation_type} root operation type")]
    UnsupportedOperation { operation_type: OperationType },
    #[error("a subscription must select exactly one root field, found {fields}")]
    SingleRootField { fields: usize },
    #[error("Can't query `{field}` on type `{type_name}`")]
    UndefinedField { type_name: Name, field: Name },
    #[error(
        "capitalized field names are not supported as they clash with model names: \
         alias `{name}` to a name starting with a lowercase letter"
    )]
    UpperCaseField { name: Name },
    #[error("field `{field}` of type `{type_name}` must not have a selection set")]
    SubselectionOnLeaf { field: Name, type_name: Name },
    #[error("field `{field}` of type `{type_name}` must have a selection of subfields")]
    MissingSubselection { field: Name, type_name: Name },
    #[error("use of deprecated {describe} `{coordinate}`: {reason}")]
    DeprecatedUsage {
        describe: &'static str,
        coordinate: String,
        reason: String,
    },
    #[error("type condition `{name}` must be a composite type, found {describe_type}")]
    InvalidTypeCondition {
        name: Name,
        describe_type: &'static str,
    },
    #[error(
        "inline fragment cannot be spread here as objects of type `{type_name}` \
         can never be of type `{type_condition}`"
    )]
    InvalidInlineFragment {
        type_condition: Name,
        type_name: Name,
    },
    #[error(
        "fragment `{name}` cannot be spread here as objects of type `{type_name}` \
         can never be of type `{type_condition}`"
    )]
    InvalidFragmentSpread {
        name: Name,
        type_condition: Name,
        type_name: Name,
    },
    #[error("cannot find fragment `{name}` in this document")]
    UndefinedFragment { name: Name },
    #[error("`{name}` fragment cannot reference itself: {trace}")]
    RecursiveFragmentDefinition { name: Name, trace: String },

    #[error("the variable `${name}` is declared multiple times")]
    UniqueVariable {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("`${name}` variable must be of an input type, `{ty}` is {describe_type}")]
    VariableInputType {
        name: Name,
        ty: Name,
        describe_type: &'static str,
    },
    #[error("variable `${name}` is not defined")]
    UndefinedVariable { name: Name },
    #[error(
        "variable `${name}` of type `{variable_type}` cannot be used \
         for a value of type `{position_type}`"
    )]
    DisallowedVariableUsage {
        name: Name,
        variable_type: String,
        position_type: String,
    },
    #[error("unused variable: `${name}`")]
    UnusedVariable { name: Name },
    #[error("variable `${name}` is used as both `{first}` and `{second}` in fragment `{fragment}`")]
    InconsistentVariableType {
        fragment: Name,
        name: Name,
        first: String,
        second: String,
    },
    #[error("variable `${name}` is not allowed in a constant value")]
    VariableInConstContext { name: Name },

    #[error("unknown directive `@{name}`")]
    UnknownDirective { name: Name },
    #[error("`@{name}` directive is not supported for {location} location")]
    UnsupportedLocation {
        name: Name,
        location: DirectiveLocation,
        valid_locations: Vec<DirectiveLocation>,
    },
    #[error("non-repeatable directive `@{name}` can only be used once at this location")]
    UniqueDirective {
        name: Name,
        original_application: Option<NodeLocation>,
    },
    #[error("the argument `{name}` is provided multiple times")]
    UniqueArgument {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("the argument `{name}` is not supported by `{coordinate}`")]
    UndefinedArgument { name: Name, coordinate: String },
    #[error("the required argument `{coordinate}({name}:)` is not provided")]
    RequiredArgument { name: Name, coordinate: String },
    #[error("expected value of type {ty}, found {describe_value_type}")]
    UnsupportedValueType {
        ty: String,
        describe_value_type: &'static str,
    },
    #[error("int cannot represent non 32-bit signed integer value: {value}")]
    IntCoercionError { value: String },
    #[error("float cannot represent non-finite 64-bit floating point value: {value}")]
    FloatCoercionError { value: String },
    #[error("value `{value}` does not exist on `{definition}`")]
    UndefinedEnumValue { value: Name, definition: Name },
    #[error("field `{value}` does not exist on `{definition}`")]
    UndefinedInputValue { value: Name, definition: Name },
    #[error("the value `{name}` is defined multiple times")]
    UniqueInputValue {
        name: Name,
        original_definition: Option<NodeLocation>,
    },
    #[error("the required field `{coordinate}` is not provided")]
    RequiredField { coordinate: String },

    #[error("fields `{response_name}` conflict because {reason}")]
    ConflictingFields {
        response_name: Name,
        reason: String,
        conflicting_field: Option<NodeLocation>,
    },
    #[error(
        "fields `{response_name}` conflict because {reason}: fields on disjoint types \
         must still have the same shape"
    )]
    DifferentShape {
        response_name: Name,
        reason: String,
        conflicting_field: Option<NodeLocation>,
    },
}

impl DiagnosticData {
    pub(crate) fn kind(&self) -> IssueKind {
        match self {
            DiagnosticData::SyntaxError { .. } | DiagnosticData::ParserLimit { .. } => {
                IssueKind::ParsingError
            }
            DiagnosticData::DeprecatedUsage { .. } => IssueKind::DeprecatedUsage,
            DiagnosticData::UnusedVariable { .. } => IssueKind::UnusedVariable,
            DiagnosticData::UnknownDirective { .. } => IssueKind::UnknownDirective,
            DiagnosticData::UpperCaseField { .. } => IssueKind::UpperCaseField,
            DiagnosticData::DifferentShape { .. } => IssueKind::DifferentShape,
            DiagnosticData::DirectiveRedefinition { .. } => IssueKind::DirectiveRedefinition,
            _ => IssueKind::ValidationError,
        }
    }

    /// Add source labels to a pretty-printed report
    pub(crate) fn report(&self, main_location: Option<NodeLocation>, report: &mut CliReport) {
        match self {
            DiagnosticData::DuplicateSchemaDefinition {
                original_definition,
            }
            | DiagnosticData::DuplicateDirectiveDefinition {
                original_definition,
                ..
            }
            | DiagnosticData::DuplicateTypeDefinition {
                original_definition,
                ..
            }
            | DiagnosticData::DuplicateMember {
                original_definition,
                ..
            }
            | DiagnosticData::DuplicateRootOperation {
                original_definition,
                ..
            }
            | DiagnosticData::DuplicateOperationName {
                original_definition,
                ..
            }
            | DiagnosticData::DuplicateFragmentName {
                original_definition,
                ..
            }
            | DiagnosticData::UniqueVariable {
                original_definition,
                ..
            }
            | DiagnosticData::UniqueArgument {
                original_definition,
                ..
            }
            | DiagnosticData::UniqueInputValue {
                original_definition,
                ..
            } => {
                report.with_label_opt(*original_definition, "previous definition here");
                report.with_label_opt(main_location, "redefined here");
            }
            DiagnosticData::UniqueDirective {
                original_application,
                ..
            } => {
                report.with_label_opt(*original_application, "first use here");
                report.with_label_opt(main_location, "used again here");
            }
            DiagnosticData::ConflictingFields {
                conflicting_field, ..
            }
            | DiagnosticData::DifferentShape {
                conflicting_field, ..
            } => {
                report.with_label_opt(main_location, "this field");
                report.with_label_opt(*conflicting_field, "conflicts with this field");
            }
            DiagnosticData::UnsupportedLocation {
                valid_locations, ..
            } => {
                report.with_label_opt(main_location, "directive used here");
                let locations = valid_locations
                    .iter()
                    .map(|location| location.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                report.with_help(format!("the directive is valid on: {locations}"));
            }
            DiagnosticData::UpperCaseField { name } => {
                report.with_label_opt(
                    main_location,
                    format!("`{name}` starts with an uppercase letter"),
                );
            }
            DiagnosticData::UnknownDirective { .. } => {
                report.with_label_opt(main_location, "not defined in the schema");
            }
            _ => report.with_label_opt(main_location, self.to_string()),
        }
    }
}
