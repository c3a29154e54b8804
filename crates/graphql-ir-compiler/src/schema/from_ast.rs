use super::*;
use crate::ast::OperationType;
use crate::diagnostic::DiagnosticList;
use crate::schema::foreign;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::Parser;
use indexmap::map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Collects type system definitions from any number of documents,
/// then assembles and validates them into a [`Schema`].
#[derive(Clone)]
pub struct SchemaBuilder {
    definitions: Vec<ast::Definition>,
    errors: DiagnosticList,
}

/// Where a definition comes from, to decide which one wins on a name clash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Comes with every schema, silently replaced by any other definition
    BuiltIn,
    /// Apollo directives added when the schema does not link them, replaced with a warning
    Apollo,
    /// Imported with `@link`
    Foreign,
    User,
}

struct Assembly<'errors> {
    schema: Schema,
    directive_origins: HashMap<Name, Origin>,
    type_origins: HashMap<Name, Origin>,
    errors: &'errors mut DiagnosticList,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder {
            definitions: Vec::new(),
            errors: DiagnosticList::new(Default::default()),
        }
    }

    /// Parse a source file and add its definitions.
    ///
    /// Syntax errors are reported by [`build`][Self::build].
    pub fn parse(mut self, source_text: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let document =
            Parser::new().parse_ast_inner(source_text, path, FileId::new(), &mut self.errors);
        self.add_document(&document);
        self
    }

    /// Add an AST document to the schema being built
    ///
    /// Executable definitions, if any, will be silently ignored.
    pub fn add_document(&mut self, document: &ast::Document) {
        let sources = Arc::make_mut(&mut self.errors.sources);
        for (file_id, source) in document.sources.iter() {
            sources.entry(*file_id).or_insert_with(|| source.clone());
        }
        self.definitions.extend(
            document
                .definitions
                .iter()
                .filter(|def| !def.is_executable_definition())
                .cloned(),
        )
    }

    /// Merge all definitions, then validate the result.
    ///
    /// The schema is returned only if no error was found.
    pub fn build(self) -> CompileResult<Valid<Schema>> {
        let SchemaBuilder {
            definitions,
            mut errors,
        } = self;
        let mut assembly = Assembly {
            schema: Schema {
                sources: Default::default(),
                schema_definition: Node::new(SchemaDefinition::default()),
                directive_definitions: IndexMap::new(),
                types: IndexMap::new(),
                key_fields: IndexMap::new(),
                foreign_names: IndexMap::new(),
                directives_to_strip: Vec::new(),
            },
            directive_origins: HashMap::new(),
            type_origins: HashMap::new(),
            errors: &mut errors,
        };

        let built_in = built_in_types();
        assembly.add_sources(&built_in.sources);
        for definition in &built_in.definitions {
            assembly.add_definition(definition, Origin::BuiltIn)
        }

        let imported = foreign::resolve_links(&definitions, assembly.errors);
        let defaults = if imported
            .iter()
            .any(|import| import.spec_name == foreign::KOTLIN_LABS)
        {
            None
        } else {
            foreign::kotlin_labs_defaults()
        };
        let imports = imported
            .iter()
            .map(|import| (import, Origin::Foreign))
            .chain(defaults.iter().map(|import| (import, Origin::Apollo)));
        for (import, origin) in imports {
            assembly.add_sources(&import.sources);
            for definition in &import.definitions {
                assembly.add_definition(definition, origin)
            }
            let schema = &mut assembly.schema;
            schema.foreign_names.extend(
                import
                    .foreign_names
                    .iter()
                    .map(|(original, renamed)| (original.clone(), renamed.clone())),
            );
            schema
                .directives_to_strip
                .extend(import.directives_to_strip.iter().cloned());
        }

        let mut schema_definitions = Vec::new();
        let mut extensions = Vec::new();
        for definition in &definitions {
            match definition {
                ast::Definition::SchemaDefinition(def) => schema_definitions.push(def),
                def if def.is_extension_definition() => extensions.push(def),
                def => assembly.add_definition(def, Origin::User),
            }
        }
        let has_schema_definition = assembly.set_schema_definition(&schema_definitions);
        for extension in extensions {
            assembly.extend(extension, has_schema_definition)
        }

        let mut schema = assembly.schema;
        schema.sources = errors.sources.clone();
        validation::validate_schema(&schema, &mut errors);
        schema.key_fields = key_fields::compute_key_fields(&schema, &mut errors);
        log::debug!(
            "built schema with {} types and {} directives, {} issues",
            schema.types.len(),
            schema.directive_definitions.len(),
            errors.len()
        );
        errors.into_compile_result(Valid::assume_valid(schema))
    }
}

fn built_in_types() -> &'static ast::Document {
    static BUILT_IN: OnceLock<ast::Document> = OnceLock::new();
    BUILT_IN.get_or_init(|| {
        let mut errors = DiagnosticList::new(Default::default());
        let document = Parser::new().parse_ast_inner(
            include_str!("../built_in.graphql"),
            BUILT_IN_PATH,
            FileId::BUILT_IN,
            &mut errors,
        );
        debug_assert!(errors.is_empty(), "{errors}");
        document
    })
}

impl Assembly<'_> {
    fn add_sources(&mut self, sources: &crate::SourceMap) {
        let all = Arc::make_mut(&mut self.errors.sources);
        for (file_id, source) in sources.iter() {
            all.entry(*file_id).or_insert_with(|| source.clone());
        }
    }

    fn add_definition(&mut self, definition: &ast::Definition, origin: Origin) {
        let errors = &mut *self.errors;
        let ty = match definition {
            ast::Definition::DirectiveDefinition(def) => {
                return self.add_directive_definition(def, origin);
            }
            ast::Definition::ScalarTypeDefinition(def) => {
                ExtendedType::Scalar(def.same_location(ScalarType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    directives: def.directives.clone(),
                }))
            }
            ast::Definition::ObjectTypeDefinition(def) => {
                let mut ty = ObjectType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    implements_interfaces: IndexSet::new(),
                    directives: def.directives.clone(),
                    fields: IndexMap::new(),
                };
                add_names(
                    &mut ty.implements_interfaces,
                    &def.implements_interfaces,
                    "interface",
                    &def.name,
                    errors,
                );
                add_nodes(&mut ty.fields, &def.fields, |f| &f.name, "field", &def.name, errors);
                ExtendedType::Object(def.same_location(ty))
            }
            ast::Definition::InterfaceTypeDefinition(def) => {
                let mut ty = InterfaceType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    implements_interfaces: IndexSet::new(),
                    directives: def.directives.clone(),
                    fields: IndexMap::new(),
                };
                add_names(
                    &mut ty.implements_interfaces,
                    &def.implements_interfaces,
                    "interface",
                    &def.name,
                    errors,
                );
                add_nodes(&mut ty.fields, &def.fields, |f| &f.name, "field", &def.name, errors);
                ExtendedType::Interface(def.same_location(ty))
            }
            ast::Definition::UnionTypeDefinition(def) => {
                let mut ty = UnionType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    directives: def.directives.clone(),
                    members: IndexSet::new(),
                };
                add_names(&mut ty.members, &def.members, "member type", &def.name, errors);
                ExtendedType::Union(def.same_location(ty))
            }
            ast::Definition::EnumTypeDefinition(def) => {
                let mut ty = EnumType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    directives: def.directives.clone(),
                    values: IndexMap::new(),
                };
                add_nodes(
                    &mut ty.values,
                    &def.values,
                    |v| &v.value,
                    "enum value",
                    &def.name,
                    errors,
                );
                ExtendedType::Enum(def.same_location(ty))
            }
            ast::Definition::InputObjectTypeDefinition(def) => {
                let mut ty = InputObjectType {
                    description: def.description.clone(),
                    name: def.name.clone(),
                    directives: def.directives.clone(),
                    fields: IndexMap::new(),
                };
                add_nodes(
                    &mut ty.fields,
                    &def.fields,
                    |f| &f.name,
                    "input field",
                    &def.name,
                    errors,
                );
                ExtendedType::InputObject(def.same_location(ty))
            }
            _ => return,
        };
        self.add_type(ty, origin)
    }

    fn add_directive_definition(&mut self, def: &Node<DirectiveDefinition>, origin: Origin) {
        let existing = self.directive_origins.get(&def.name).copied();
        match existing {
            None | Some(Origin::BuiltIn) => {}
            Some(Origin::Apollo) if origin == Origin::User => self.errors.push(
                def.name.location(),
                DiagnosticData::DirectiveRedefinition {
                    name: def.name.clone(),
                },
            ),
            Some(_) => {
                let original_definition = self
                    .schema
                    .directive_definitions
                    .get(&def.name)
                    .and_then(|original| original.location());
                self.errors.push(
                    def.name.location(),
                    DiagnosticData::DuplicateDirectiveDefinition {
                        name: def.name.clone(),
                        original_definition,
                    },
                );
                return;
            }
        }
        self.directive_origins.insert(def.name.clone(), origin);
        self.schema
            .directive_definitions
            .insert(def.name.clone(), def.clone());
    }

    fn add_type(&mut self, ty: ExtendedType, origin: Origin) {
        let name = ty.name().clone();
        match self.type_origins.get(&name) {
            None | Some(Origin::BuiltIn) => {}
            Some(_) => {
                let original_definition =
                    self.schema.types.get(&name).and_then(|original| original.location());
                self.errors.push(
                    name.location(),
                    DiagnosticData::DuplicateTypeDefinition {
                        name: name.clone(),
                        original_definition,
                    },
                );
                return;
            }
        }
        self.type_origins.insert(name.clone(), origin);
        self.schema.types.insert(name, ty);
    }

    /// Returns whether the schema has a definition, explicit or implicit
    fn set_schema_definition(&mut self, definitions: &[&Node<ast::SchemaDefinition>]) -> bool {
        let Some((first, duplicates)) = definitions.split_first() else {
            // Implicit definition from conventional root type names
            let mut definition = SchemaDefinition::default();
            for operation_type in OperationType::ALL {
                let name = operation_type.default_type_name();
                if let Some(object) = self.schema.get_object(name) {
                    *root_operation_mut(&mut definition, operation_type) =
                        Some(object.name.clone());
                }
            }
            let found = definition.query.is_some()
                || definition.mutation.is_some()
                || definition.subscription.is_some();
            self.schema.schema_definition = Node::new(definition);
            return found;
        };
        for duplicate in duplicates {
            self.errors.push(
                duplicate.location(),
                DiagnosticData::DuplicateSchemaDefinition {
                    original_definition: first.location(),
                },
            )
        }
        let mut definition = SchemaDefinition {
            description: first.description.clone(),
            directives: first.directives.clone(),
            query: None,
            mutation: None,
            subscription: None,
        };
        for root_operation in &first.root_operations {
            set_root_operation(&mut definition, root_operation, self.errors)
        }
        self.schema.schema_definition = first.same_location(definition);
        true
    }

    fn extend(&mut self, definition: &ast::Definition, has_schema_definition: bool) {
        let errors = &mut *self.errors;
        let name = match definition {
            ast::Definition::SchemaExtension(ext) => {
                if !has_schema_definition {
                    errors.push(
                        ext.location(),
                        DiagnosticData::SchemaExtensionWithoutDefinition,
                    );
                    return;
                }
                let schema_definition = self.schema.schema_definition.make_mut();
                schema_definition
                    .directives
                    .0
                    .extend(ext.directives.0.iter().cloned());
                for root_operation in &ext.root_operations {
                    set_root_operation(schema_definition, root_operation, errors)
                }
                return;
            }
            ast::Definition::ScalarTypeExtension(ext) => &ext.name,
            ast::Definition::ObjectTypeExtension(ext) => &ext.name,
            ast::Definition::InterfaceTypeExtension(ext) => &ext.name,
            ast::Definition::UnionTypeExtension(ext) => &ext.name,
            ast::Definition::EnumTypeExtension(ext) => &ext.name,
            ast::Definition::InputObjectTypeExtension(ext) => &ext.name,
            _ => return,
        };
        let Some(ty) = self.schema.types.get_mut(name) else {
            errors.push(
                name.location(),
                DiagnosticData::ExtensionWithoutDefinition { name: name.clone() },
            );
            return;
        };
        log::trace!("extending {name}");
        match (ty, definition) {
            (ExtendedType::Scalar(ty), ast::Definition::ScalarTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
            }
            (ExtendedType::Object(ty), ast::Definition::ObjectTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
                add_names(
                    &mut ty.implements_interfaces,
                    &ext.implements_interfaces,
                    "interface",
                    name,
                    errors,
                );
                add_nodes(&mut ty.fields, &ext.fields, |f| &f.name, "field", name, errors);
            }
            (ExtendedType::Interface(ty), ast::Definition::InterfaceTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
                add_names(
                    &mut ty.implements_interfaces,
                    &ext.implements_interfaces,
                    "interface",
                    name,
                    errors,
                );
                add_nodes(&mut ty.fields, &ext.fields, |f| &f.name, "field", name, errors);
            }
            (ExtendedType::Union(ty), ast::Definition::UnionTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
                add_names(&mut ty.members, &ext.members, "member type", name, errors);
            }
            (ExtendedType::Enum(ty), ast::Definition::EnumTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
                add_nodes(&mut ty.values, &ext.values, |v| &v.value, "enum value", name, errors);
            }
            (ExtendedType::InputObject(ty), ast::Definition::InputObjectTypeExtension(ext)) => {
                let ty = ty.make_mut();
                ty.directives.0.extend(ext.directives.0.iter().cloned());
                add_nodes(&mut ty.fields, &ext.fields, |f| &f.name, "input field", name, errors);
            }
            (ty, _) => errors.push(
                definition.location(),
                DiagnosticData::ExtensionKindMismatch {
                    name: name.clone(),
                    describe_type: ty.describe(),
                    describe_extension: definition.describe(),
                },
            ),
        }
    }
}

fn root_operation_mut(
    definition: &mut SchemaDefinition,
    operation_type: OperationType,
) -> &mut Option<Name> {
    match operation_type {
        OperationType::Query => &mut definition.query,
        OperationType::Mutation => &mut definition.mutation,
        OperationType::Subscription => &mut definition.subscription,
    }
}

fn set_root_operation(
    definition: &mut SchemaDefinition,
    root_operation: &Node<(OperationType, NamedType)>,
    errors: &mut DiagnosticList,
) {
    let (operation_type, name) = &**root_operation;
    let slot = root_operation_mut(definition, *operation_type);
    if let Some(existing) = slot {
        errors.push(
            root_operation.location(),
            DiagnosticData::DuplicateRootOperation {
                operation_type: *operation_type,
                original_definition: existing.location(),
            },
        )
    } else {
        *slot = Some(name.clone())
    }
}

/// Insert definitions keyed by name, reporting the ones already present
fn add_nodes<T>(
    map: &mut IndexMap<Name, Node<T>>,
    nodes: &[Node<T>],
    name_of: impl Fn(&T) -> &Name,
    describe_member: &'static str,
    type_name: &Name,
    errors: &mut DiagnosticList,
) {
    for node in nodes {
        let name = name_of(&**node);
        match map.entry(name.clone()) {
            Entry::Occupied(entry) => errors.push(
                node.location(),
                DiagnosticData::DuplicateMember {
                    describe_member,
                    name: name.clone(),
                    type_name: type_name.clone(),
                    original_definition: entry.get().location(),
                },
            ),
            Entry::Vacant(entry) => {
                entry.insert(node.clone());
            }
        }
    }
}

fn add_names(
    set: &mut IndexSet<Name>,
    names: &[Name],
    describe_member: &'static str,
    type_name: &Name,
    errors: &mut DiagnosticList,
) {
    for name in names {
        if let Some(existing) = set.get(name) {
            errors.push(
                name.location(),
                DiagnosticData::DuplicateMember {
                    describe_member,
                    name: name.clone(),
                    type_name: type_name.clone(),
                    original_definition: existing.location(),
                },
            )
        } else {
            set.insert(name.clone());
        }
    }
}
