//! High-level representation of a GraphQL schema,
//! with type extensions merged and `@link` imports resolved.

use crate::ast;
use crate::ast::DirectiveList;
use crate::diagnostic::CompileResult;
use crate::name;
use crate::validation::Valid;
use crate::Name;
use crate::Node;
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

pub(crate) mod codegen;
pub(crate) mod foreign;
pub(crate) mod from_ast;
pub(crate) mod key_fields;
pub(crate) mod validation;

pub use self::codegen::CodegenSchema;
pub use self::from_ast::SchemaBuilder;
pub use crate::ast::DirectiveDefinition;
pub use crate::ast::DirectiveLocation;
pub use crate::ast::EnumValueDefinition;
pub use crate::ast::FieldDefinition;
pub use crate::ast::InputValueDefinition;
pub use crate::ast::NamedType;
pub use crate::ast::Type;

/// Path used in diagnostics for definitions that come with every schema
pub(crate) const BUILT_IN_PATH: &str = "built_in.graphql";

/// High-level representation of a GraphQL schema
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct Schema {
    /// Source files that were parsed to contribute to this schema.
    /// Not persisted.
    #[serde(skip)]
    pub sources: crate::SourceMap,

    /// The `schema` definition and its extensions, defining root operations
    pub schema_definition: Node<SchemaDefinition>,

    /// Built-in, imported and explicit directive definitions
    pub directive_definitions: IndexMap<Name, Node<DirectiveDefinition>>,

    /// Built-in scalars, introspection types, imported and explicit types,
    /// each with its extensions folded in
    pub types: IndexMap<NamedType, ExtendedType>,

    /// Fields forming the cache identity of object, interface and union types.
    /// Types without key fields have no entry.
    pub key_fields: IndexMap<Name, IndexSet<Name>>,

    /// Symbols imported with `@link`, from their name in the foreign schema
    /// (`@nonnull`, `CatchTo`) to their name in this schema (`@kotlin_labs__nonnull`)
    pub foreign_names: IndexMap<String, String>,

    /// Client-only directives to remove before a document is sent to a server
    pub directives_to_strip: Vec<String>,
}

/// The `schema` definition and its extensions, defining root operations
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct SchemaDefinition {
    pub description: Option<Node<String>>,
    pub directives: DirectiveList,

    /// Name of the object type for the `query` root operation
    pub query: Option<Name>,

    /// Name of the object type for the `mutation` root operation
    pub mutation: Option<Name>,

    /// Name of the object type for the `subscription` root operation
    pub subscription: Option<Name>,
}

/// The definition of a named type, with all information from type extensions folded in.
///
/// The source location is that of the "main" definition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind")]
pub enum ExtendedType {
    Scalar(Node<ScalarType>),
    Object(Node<ObjectType>),
    Interface(Node<InterfaceType>),
    Union(Node<UnionType>),
    Enum(Node<EnumType>),
    InputObject(Node<InputObjectType>),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScalarType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub directives: DirectiveList,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub implements_interfaces: IndexSet<Name>,
    pub directives: DirectiveList,

    /// Explicit field definitions.
    ///
    /// When looking up a definition,
    /// consider using [`Schema::type_field`] instead to include `__typename`.
    pub fields: IndexMap<Name, Node<FieldDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub implements_interfaces: IndexSet<Name>,
    pub directives: DirectiveList,
    pub fields: IndexMap<Name, Node<FieldDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnionType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub directives: DirectiveList,
    pub members: IndexSet<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EnumType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub directives: DirectiveList,
    pub values: IndexMap<Name, Node<EnumValueDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InputObjectType {
    pub description: Option<Node<String>>,
    pub name: Name,
    pub directives: DirectiveList,
    pub fields: IndexMap<Name, Node<InputValueDefinition>>,
}

impl Schema {
    /// Returns a new builder for creating a Schema from AST documents
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Parse a single source file into a schema and validate it.
    ///
    /// Create a [`Parser`][crate::Parser] and a [`SchemaBuilder`]
    /// to combine multiple files or configure parser limits.
    pub fn parse_and_validate(
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> CompileResult<Valid<Self>> {
        SchemaBuilder::new().parse(source_text, path).build()
    }

    pub fn get_scalar(&self, name: &str) -> Option<&Node<ScalarType>> {
        if let Some(ExtendedType::Scalar(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    pub fn get_object(&self, name: &str) -> Option<&Node<ObjectType>> {
        if let Some(ExtendedType::Object(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    pub fn get_interface(&self, name: &str) -> Option<&Node<InterfaceType>> {
        if let Some(ExtendedType::Interface(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    pub fn get_union(&self, name: &str) -> Option<&Node<UnionType>> {
        if let Some(ExtendedType::Union(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    pub fn get_enum(&self, name: &str) -> Option<&Node<EnumType>> {
        if let Some(ExtendedType::Enum(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    pub fn get_input_object(&self, name: &str) -> Option<&Node<InputObjectType>> {
        if let Some(ExtendedType::InputObject(ty)) = self.types.get(name) {
            Some(ty)
        } else {
            None
        }
    }

    /// Returns the name of the object type for the root operation with the given operation kind
    pub fn root_operation(&self, operation_type: ast::OperationType) -> Option<&NamedType> {
        match operation_type {
            ast::OperationType::Query => &self.schema_definition.query,
            ast::OperationType::Mutation => &self.schema_definition.mutation,
            ast::OperationType::Subscription => &self.schema_definition.subscription,
        }
        .as_ref()
    }

    /// Returns the definition of a type’s explicit field or meta-field.
    pub fn type_field(&self, type_name: &str, field_name: &str) -> Option<&Node<FieldDefinition>> {
        use ExtendedType::*;
        let ty_def = self.types.get(type_name)?;
        let explicit_field = match ty_def {
            Object(ty) => ty.fields.get(field_name),
            Interface(ty) => ty.fields.get(field_name),
            Scalar(_) | Union(_) | Enum(_) | InputObject(_) => None,
        };
        if explicit_field.is_some() {
            return explicit_field;
        }
        let meta = MetaFieldDefinitions::get();
        if field_name == "__typename" && matches!(ty_def, Object(_) | Interface(_) | Union(_)) {
            return Some(&meta.__typename);
        }
        if self.schema_definition.query.as_ref().is_some_and(|query| query == type_name) {
            match field_name {
                "__schema" => return Some(&meta.__schema),
                "__type" => return Some(&meta.__type),
                _ => {}
            }
        }
        None
    }

    /// Returns whether `maybe_subtype` is a subtype of `abstract_type`, which means either:
    ///
    /// * `maybe_subtype` implements the interface `abstract_type`
    /// * `maybe_subtype` is a member of the union type `abstract_type`
    pub fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.types.get(abstract_type).is_some_and(|ty| match ty {
            ExtendedType::Interface(_) => self.types.get(maybe_subtype).is_some_and(|ty2| {
                match ty2 {
                    ExtendedType::Object(def) => &def.implements_interfaces,
                    ExtendedType::Interface(def) => &def.implements_interfaces,
                    ExtendedType::Scalar(_)
                    | ExtendedType::Union(_)
                    | ExtendedType::Enum(_)
                    | ExtendedType::InputObject(_) => return false,
                }
                .contains(abstract_type)
            }),
            ExtendedType::Union(def) => def.members.contains(maybe_subtype),
            ExtendedType::Scalar(_)
            | ExtendedType::Object(_)
            | ExtendedType::Enum(_)
            | ExtendedType::InputObject(_) => false,
        })
    }

    /// Returns the concrete object types that can be found where `name` is expected:
    /// the object itself, the implementers of an interface, or the members of a union.
    pub fn possible_types(&self, name: &str) -> BTreeSet<Name> {
        match self.types.get(name) {
            Some(ExtendedType::Object(def)) => [def.name.clone()].into(),
            Some(ExtendedType::Interface(_)) => self
                .types
                .values()
                .filter_map(|ty| match ty {
                    ExtendedType::Object(def)
                        if self.with_interfaces(&def.name).contains(name) =>
                    {
                        Some(def.name.clone())
                    }
                    _ => None,
                })
                .collect(),
            Some(ExtendedType::Union(def)) => def
                .members
                .iter()
                .filter(|member| self.get_object(member).is_some())
                .cloned()
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Returns every type condition that an object of type `name` satisfies:
    /// the type itself, the interfaces it implements (transitively)
    /// and the unions it is a member of.
    pub fn super_types(&self, name: &str) -> BTreeSet<Name> {
        let mut result = self.with_interfaces(name);
        if result.is_empty() {
            return result;
        }
        for ty in self.types.values() {
            if let ExtendedType::Union(def) = ty {
                if def.members.contains(name) {
                    result.insert(def.name.clone());
                }
            }
        }
        result
    }

    /// Super types of every object type, computed in one pass over the schema
    pub(crate) fn object_super_types(&self) -> HashMap<Name, BTreeSet<Name>> {
        let mut unions = HashMap::<&Name, Vec<&Name>>::new();
        for ty in self.types.values() {
            if let ExtendedType::Union(def) = ty {
                for member in &def.members {
                    unions.entry(member).or_default().push(&def.name);
                }
            }
        }
        self.types
            .values()
            .filter_map(|ty| match ty {
                ExtendedType::Object(def) => {
                    let mut super_types = self.with_interfaces(&def.name);
                    if let Some(containing) = unions.get(&def.name) {
                        super_types.extend(containing.iter().map(|&union_name| union_name.clone()));
                    }
                    Some((def.name.clone(), super_types))
                }
                _ => None,
            })
            .collect()
    }

    /// `name` and the interfaces it implements, transitively
    fn with_interfaces(&self, name: &str) -> BTreeSet<Name> {
        let mut result = BTreeSet::new();
        let Some(ty) = self.types.get(name) else {
            return result;
        };
        result.insert(ty.name().clone());
        let mut stack: Vec<&Name> = ty.implements_interfaces().iter().collect();
        while let Some(interface) = stack.pop() {
            if result.insert(interface.clone()) {
                if let Some(def) = self.get_interface(interface) {
                    stack.extend(def.implements_interfaces.iter());
                }
            }
        }
        result
    }

    /// Returns whether the type `ty` is defined as is an input type
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_input_type(&self, ty: &Type) -> bool {
        self.types
            .get(ty.inner_named_type())
            .is_some_and(|def| def.is_input_type())
    }

    /// Returns whether the type `ty` is defined as is an output type
    ///
    /// <https://spec.graphql.org/October2021/#sec-Input-and-Output-Types>
    pub fn is_output_type(&self, ty: &Type) -> bool {
        self.types
            .get(ty.inner_named_type())
            .is_some_and(|def| def.is_output_type())
    }

    /// Returns the key fields of a type, empty if it has none
    pub fn key_fields(&self, type_name: &str) -> IndexSet<Name> {
        self.key_fields.get(type_name).cloned().unwrap_or_default()
    }

    /// Returns the directive definition for a name as written in a foreign schema
    /// (`nonnull` for `@nonnull`), after any `@link` renaming.
    pub fn foreign_directive(&self, original: &str) -> Option<&Node<DirectiveDefinition>> {
        let renamed = self.foreign_names.get(&format!("@{original}"))?;
        self.directive_definitions
            .get(renamed.trim_start_matches('@'))
    }

    /// Maps a directive name used in this schema back to its name in the foreign schema
    /// that defined it, or `None` if the directive was not imported.
    pub fn original_directive_name(&self, name: &str) -> Option<&str> {
        self.foreign_names
            .iter()
            .find(|(_, renamed)| renamed.strip_prefix('@') == Some(name))
            .and_then(|(original, _)| original.strip_prefix('@'))
    }

    /// Returns the names of client-only directives, to be removed before sending documents
    pub fn directives_to_strip(&self) -> &[String] {
        &self.directives_to_strip
    }
}

impl ExtendedType {
    pub fn name(&self) -> &Name {
        match self {
            Self::Scalar(ty) => &ty.name,
            Self::Object(ty) => &ty.name,
            Self::Interface(ty) => &ty.name,
            Self::Union(ty) => &ty.name,
            Self::Enum(ty) => &ty.name,
            Self::InputObject(ty) => &ty.name,
        }
    }

    /// Return the source location of the type's base definition.
    pub fn location(&self) -> Option<crate::NodeLocation> {
        match self {
            Self::Scalar(ty) => ty.location(),
            Self::Object(ty) => ty.location(),
            Self::Interface(ty) => ty.location(),
            Self::Union(ty) => ty.location(),
            Self::Enum(ty) => ty.location(),
            Self::InputObject(ty) => ty.location(),
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "a scalar type",
            Self::Object(_) => "an object type",
            Self::Interface(_) => "an interface type",
            Self::Union(_) => "a union type",
            Self::Enum(_) => "an enum type",
            Self::InputObject(_) => "an input object type",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Self::Interface(_))
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Self::Union(_))
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    pub fn is_input_object(&self) -> bool {
        matches!(self, Self::InputObject(_))
    }

    /// Returns true if a value of this type never has sub-selections
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Returns true for interfaces and unions
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Returns true for objects, interfaces and unions
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    pub fn is_input_type(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    pub fn is_output_type(&self) -> bool {
        !self.is_input_object()
    }

    /// Returns true if this type comes with every schema
    pub fn is_built_in(&self) -> bool {
        match self {
            Self::Scalar(ty) => ty.is_built_in(),
            Self::Object(ty) => ty.is_built_in(),
            Self::Interface(ty) => ty.is_built_in(),
            Self::Union(ty) => ty.is_built_in(),
            Self::Enum(ty) => ty.is_built_in(),
            Self::InputObject(ty) => ty.is_built_in(),
        }
    }

    pub fn directives(&self) -> &DirectiveList {
        match self {
            Self::Scalar(ty) => &ty.directives,
            Self::Object(ty) => &ty.directives,
            Self::Interface(ty) => &ty.directives,
            Self::Union(ty) => &ty.directives,
            Self::Enum(ty) => &ty.directives,
            Self::InputObject(ty) => &ty.directives,
        }
    }

    pub(crate) fn implements_interfaces(&self) -> &IndexSet<Name> {
        static EMPTY: OnceLock<IndexSet<Name>> = OnceLock::new();
        match self {
            Self::Object(ty) => &ty.implements_interfaces,
            Self::Interface(ty) => &ty.implements_interfaces,
            _ => EMPTY.get_or_init(IndexSet::new),
        }
    }
}

impl Eq for Schema {}

/// Source maps are ignored
impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            sources: _,
            schema_definition,
            directive_definitions,
            types,
            key_fields,
            foreign_names,
            directives_to_strip,
        } = self;
        *schema_definition == other.schema_definition
            && *directive_definitions == other.directive_definitions
            && *types == other.types
            && *key_fields == other.key_fields
            && *foreign_names == other.foreign_names
            && *directives_to_strip == other.directives_to_strip
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            sources: _, // too verbose
            schema_definition,
            directive_definitions,
            types,
            key_fields,
            foreign_names,
            directives_to_strip,
        } = self;
        f.debug_struct("Schema")
            .field("schema_definition", schema_definition)
            .field(
                "directive_definitions",
                &directive_definitions
                    .iter()
                    .filter(|(_, def)| !def.is_built_in())
                    .map(|(name, _)| name)
                    .collect::<Vec<_>>(),
            )
            .field(
                "types",
                &types
                    .iter()
                    .filter(|(_, def)| !def.is_built_in())
                    .map(|(name, _)| name)
                    .collect::<Vec<_>>(),
            )
            .field("key_fields", key_fields)
            .field("foreign_names", foreign_names)
            .field("directives_to_strip", directives_to_strip)
            .finish()
    }
}

struct MetaFieldDefinitions {
    __typename: Node<FieldDefinition>,
    __schema: Node<FieldDefinition>,
    __type: Node<FieldDefinition>,
}

impl MetaFieldDefinitions {
    fn get() -> &'static Self {
        static DEFS: OnceLock<MetaFieldDefinitions> = OnceLock::new();
        DEFS.get_or_init(|| {
            let field = |name: Name, ty: Type, arguments| {
                Node::new(FieldDefinition {
                    description: None,
                    name,
                    arguments,
                    ty,
                    directives: DirectiveList::new(),
                })
            };
            Self {
                // __typename: String!
                __typename: field(
                    name!("__typename"),
                    Type::NonNullNamed(name!("String")),
                    Vec::new(),
                ),
                // __schema: __Schema!
                __schema: field(
                    name!("__schema"),
                    Type::NonNullNamed(name!("__Schema")),
                    Vec::new(),
                ),
                // __type(name: String!): __Type
                __type: field(
                    name!("__type"),
                    Type::Named(name!("__Type")),
                    vec![Node::new(InputValueDefinition {
                        description: None,
                        name: name!("name"),
                        ty: Node::new(Type::NonNullNamed(name!("String"))),
                        default_value: None,
                        directives: DirectiveList::new(),
                    })],
                ),
            }
        })
    }
}
