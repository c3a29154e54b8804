use crate::ast;
use crate::ast::Document;
use crate::FileId;
use crate::Name;
use crate::Node;
use crate::NodeLocation;
use crate::SourceMap;
use apollo_parser::cst;
use apollo_parser::cst::CstNode;
use apollo_parser::SyntaxNode;
use apollo_parser::S;

impl Document {
    pub(crate) fn from_cst(document: cst::Document, file_id: FileId, sources: SourceMap) -> Self {
        Self {
            sources,
            definitions: document
                .definitions()
                .filter_map(|def| def.convert(file_id))
                .collect(),
        }
    }
}

/// Convert the selections of a standalone field set, as stored in directive arguments
pub(crate) fn convert_selection_set(
    selection_set: &cst::SelectionSet,
    file_id: FileId,
) -> Vec<ast::Selection> {
    selection_set.convert(file_id).unwrap_or_default()
}

/// Similar to `TryFrom`, but with an `Option` return type because AST uses Option a lot.
///
/// A `None` result means the CST node is incomplete. The parser has already
/// reported a syntax error for it, so it is skipped silently.
pub(crate) trait Convert {
    type Target;
    fn convert(&self, file_id: FileId) -> Option<Self::Target>;
}

fn with_location<T>(file_id: FileId, syntax_node: &SyntaxNode, node: T) -> Node<T> {
    Node::new_parsed(node, NodeLocation::new(file_id, syntax_node))
}

fn located<C>(file_id: FileId, cst: &C) -> Option<Node<C::Target>>
where
    C: CstNode + Convert,
{
    Some(with_location(file_id, cst.syntax(), cst.convert(file_id)?))
}

fn collect<C>(file_id: FileId, iter: impl IntoIterator<Item = C>) -> Vec<Node<C::Target>>
where
    C: CstNode + Convert,
{
    iter.into_iter()
        .filter_map(|value| located(file_id, &value))
        .collect()
}

fn directives(file_id: FileId, directives: Option<cst::Directives>) -> ast::DirectiveList {
    ast::DirectiveList(
        directives
            .map(|list| collect(file_id, list.directives()))
            .unwrap_or_default(),
    )
}

fn arguments(file_id: FileId, arguments: Option<cst::Arguments>) -> Vec<Node<ast::Argument>> {
    arguments
        .map(|list| collect(file_id, list.arguments()))
        .unwrap_or_default()
}

fn input_values(
    file_id: FileId,
    definitions: impl Iterator<Item = cst::InputValueDefinition>,
) -> Vec<Node<ast::InputValueDefinition>> {
    collect(file_id, definitions)
}

fn named_types(
    file_id: FileId,
    named_types: impl Iterator<Item = cst::NamedType>,
) -> Vec<ast::NamedType> {
    named_types
        .filter_map(|named| named.name()?.convert(file_id))
        .collect()
}

fn default_value(
    file_id: FileId,
    default: Option<cst::DefaultValue>,
) -> Option<Option<Node<ast::Value>>> {
    match default {
        Some(default) => Some(Some(located(file_id, &default.value()?)?)),
        None => Some(None),
    }
}

impl<T: Convert> Convert for Option<T> {
    type Target = Option<T::Target>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(if let Some(inner) = self {
            Some(inner.convert(file_id)?)
        } else {
            None
        })
    }
}

impl Convert for cst::Definition {
    type Target = ast::Definition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Definition as A;
        use cst::Definition as C;
        Some(match self {
            C::OperationDefinition(def) => A::OperationDefinition(located(file_id, def)?),
            C::FragmentDefinition(def) => A::FragmentDefinition(located(file_id, def)?),
            C::DirectiveDefinition(def) => A::DirectiveDefinition(located(file_id, def)?),
            C::SchemaDefinition(def) => A::SchemaDefinition(located(file_id, def)?),
            C::ScalarTypeDefinition(def) => A::ScalarTypeDefinition(located(file_id, def)?),
            C::ObjectTypeDefinition(def) => A::ObjectTypeDefinition(located(file_id, def)?),
            C::InterfaceTypeDefinition(def) => {
                A::InterfaceTypeDefinition(located(file_id, def)?)
            }
            C::UnionTypeDefinition(def) => A::UnionTypeDefinition(located(file_id, def)?),
            C::EnumTypeDefinition(def) => A::EnumTypeDefinition(located(file_id, def)?),
            C::InputObjectTypeDefinition(def) => {
                A::InputObjectTypeDefinition(located(file_id, def)?)
            }
            C::SchemaExtension(def) => A::SchemaExtension(located(file_id, def)?),
            C::ScalarTypeExtension(def) => A::ScalarTypeExtension(located(file_id, def)?),
            C::ObjectTypeExtension(def) => A::ObjectTypeExtension(located(file_id, def)?),
            C::InterfaceTypeExtension(def) => A::InterfaceTypeExtension(located(file_id, def)?),
            C::UnionTypeExtension(def) => A::UnionTypeExtension(located(file_id, def)?),
            C::EnumTypeExtension(def) => A::EnumTypeExtension(located(file_id, def)?),
            C::InputObjectTypeExtension(def) => {
                A::InputObjectTypeExtension(located(file_id, def)?)
            }
        })
    }
}

impl Convert for cst::OperationDefinition {
    type Target = ast::OperationDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let operation_type = match self.operation_type() {
            Some(ty) => ty.convert(file_id)?,
            None => ast::OperationType::Query,
        };
        Some(Self::Target {
            operation_type,
            name: self.name().convert(file_id)?,
            variables: self
                .variable_definitions()
                .map(|list| collect(file_id, list.variable_definitions()))
                .unwrap_or_default(),
            directives: directives(file_id, self.directives()),
            selection_set: self.selection_set()?.convert(file_id)?,
        })
    }
}

impl Convert for cst::FragmentDefinition {
    type Target = ast::FragmentDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.fragment_name()?.name()?.convert(file_id)?,
            type_condition: self.type_condition()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            selection_set: self.selection_set()?.convert(file_id)?,
        })
    }
}

impl Convert for cst::TypeCondition {
    type Target = ast::NamedType;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        self.named_type()?.name()?.convert(file_id)
    }
}

impl Convert for cst::DirectiveDefinition {
    type Target = ast::DirectiveDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            arguments: self
                .arguments_definition()
                .map(|list| input_values(file_id, list.input_value_definitions()))
                .unwrap_or_default(),
            repeatable: self.repeatable_token().is_some(),
            locations: self
                .directive_locations()
                .map(|list| {
                    list.directive_locations()
                        .filter_map(|location| location.convert(file_id))
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::SchemaDefinition {
    type Target = ast::SchemaDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            directives: directives(file_id, self.directives()),
            // A schema definition without root operations is kept: its presence
            // still prevents a default schema definition from being synthesized.
            root_operations: self
                .root_operation_type_definitions()
                .filter_map(|x| x.convert(file_id))
                .collect(),
        })
    }
}

impl Convert for cst::SchemaExtension {
    type Target = ast::SchemaExtension;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            directives: directives(file_id, self.directives()),
            root_operations: self
                .root_operation_type_definitions()
                .filter_map(|x| x.convert(file_id))
                .collect(),
        })
    }
}

impl Convert for cst::ScalarTypeDefinition {
    type Target = ast::ScalarTypeDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::ScalarTypeExtension {
    type Target = ast::ScalarTypeExtension;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

/// Object and interface definitions and extensions share the same shape.
macro_rules! convert_fields_container {
    ($cst: ty => $ast: ty { $($description: ident)? }) => {
        impl Convert for $cst {
            type Target = $ast;

            fn convert(&self, file_id: FileId) -> Option<Self::Target> {
                Some(Self::Target {
                    $($description: self.description().convert(file_id)?,)?
                    name: self.name()?.convert(file_id)?,
                    implements_interfaces: self
                        .implements_interfaces()
                        .map(|list| named_types(file_id, list.named_types()))
                        .unwrap_or_default(),
                    directives: directives(file_id, self.directives()),
                    fields: self
                        .fields_definition()
                        .map(|list| collect(file_id, list.field_definitions()))
                        .unwrap_or_default(),
                })
            }
        }
    };
}

convert_fields_container!(cst::ObjectTypeDefinition => ast::ObjectTypeDefinition { description });
convert_fields_container!(cst::InterfaceTypeDefinition => ast::InterfaceTypeDefinition { description });
convert_fields_container!(cst::ObjectTypeExtension => ast::ObjectTypeExtension {});
convert_fields_container!(cst::InterfaceTypeExtension => ast::InterfaceTypeExtension {});

impl Convert for cst::UnionTypeDefinition {
    type Target = ast::UnionTypeDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            members: self
                .union_member_types()
                .map(|list| named_types(file_id, list.named_types()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::UnionTypeExtension {
    type Target = ast::UnionTypeExtension;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            members: self
                .union_member_types()
                .map(|list| named_types(file_id, list.named_types()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::EnumTypeDefinition {
    type Target = ast::EnumTypeDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            values: self
                .enum_values_definition()
                .map(|list| collect(file_id, list.enum_value_definitions()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::EnumTypeExtension {
    type Target = ast::EnumTypeExtension;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            values: self
                .enum_values_definition()
                .map(|list| collect(file_id, list.enum_value_definitions()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::InputObjectTypeDefinition {
    type Target = ast::InputObjectTypeDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            fields: self
                .input_fields_definition()
                .map(|list| input_values(file_id, list.input_value_definitions()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::InputObjectTypeExtension {
    type Target = ast::InputObjectTypeExtension;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
            fields: self
                .input_fields_definition()
                .map(|list| input_values(file_id, list.input_value_definitions()))
                .unwrap_or_default(),
        })
    }
}

impl Convert for cst::Description {
    type Target = Node<String>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(with_location(
            file_id,
            self.syntax(),
            String::from(self.string_value()?),
        ))
    }
}

impl Convert for cst::Directive {
    type Target = ast::Directive;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.name()?.convert(file_id)?,
            arguments: arguments(file_id, self.arguments()),
        })
    }
}

impl Convert for cst::OperationType {
    type Target = ast::OperationType;

    fn convert(&self, _file_id: FileId) -> Option<Self::Target> {
        let token = self.syntax().first_token()?;
        match token.kind() {
            S![query] => Some(ast::OperationType::Query),
            S![mutation] => Some(ast::OperationType::Mutation),
            S![subscription] => Some(ast::OperationType::Subscription),
            _ => None,
        }
    }
}

impl Convert for cst::RootOperationTypeDefinition {
    type Target = Node<(ast::OperationType, ast::NamedType)>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let ty = self.operation_type()?.convert(file_id)?;
        let name = self.named_type()?.name()?.convert(file_id)?;
        Some(with_location(file_id, self.syntax(), (ty, name)))
    }
}

impl Convert for cst::DirectiveLocation {
    type Target = ast::DirectiveLocation;

    fn convert(&self, _file_id: FileId) -> Option<Self::Target> {
        use ast::DirectiveLocation as L;
        let token = self.syntax().first_token()?;
        Some(match token.kind() {
            S![QUERY] => L::Query,
            S![MUTATION] => L::Mutation,
            S![SUBSCRIPTION] => L::Subscription,
            S![FIELD] => L::Field,
            S![FRAGMENT_DEFINITION] => L::FragmentDefinition,
            S![FRAGMENT_SPREAD] => L::FragmentSpread,
            S![INLINE_FRAGMENT] => L::InlineFragment,
            S![VARIABLE_DEFINITION] => L::VariableDefinition,
            S![SCHEMA] => L::Schema,
            S![SCALAR] => L::Scalar,
            S![OBJECT] => L::Object,
            S![FIELD_DEFINITION] => L::FieldDefinition,
            S![ARGUMENT_DEFINITION] => L::ArgumentDefinition,
            S![INTERFACE] => L::Interface,
            S![UNION] => L::Union,
            S![ENUM] => L::Enum,
            S![ENUM_VALUE] => L::EnumValue,
            S![INPUT_OBJECT] => L::InputObject,
            S![INPUT_FIELD_DEFINITION] => L::InputFieldDefinition,
            _ => return None,
        })
    }
}

impl Convert for cst::VariableDefinition {
    type Target = ast::VariableDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            name: self.variable()?.name()?.convert(file_id)?,
            ty: located(file_id, &self.ty()?)?,
            default_value: default_value(file_id, self.default_value())?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::Type {
    type Target = ast::Type;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Type as A;
        use cst::Type as C;
        match self {
            C::NamedType(name) => Some(A::Named(name.name()?.convert(file_id)?)),
            C::ListType(inner) => Some(A::List(Box::new(inner.ty()?.convert(file_id)?))),
            C::NonNullType(inner) => {
                if let Some(named) = inner.named_type() {
                    Some(A::NonNullNamed(named.name()?.convert(file_id)?))
                } else if let Some(list) = inner.list_type() {
                    Some(A::NonNullList(Box::new(list.ty()?.convert(file_id)?)))
                } else {
                    None
                }
            }
        }
    }
}

impl Convert for cst::FieldDefinition {
    type Target = ast::FieldDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            arguments: self
                .arguments_definition()
                .map(|list| input_values(file_id, list.input_value_definitions()))
                .unwrap_or_default(),
            ty: self.ty()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::Argument {
    type Target = ast::Argument;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(ast::Argument {
            name: self.name()?.convert(file_id)?,
            value: located(file_id, &self.value()?)?,
        })
    }
}

impl Convert for cst::InputValueDefinition {
    type Target = ast::InputValueDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            ty: located(file_id, &self.ty()?)?,
            default_value: default_value(file_id, self.default_value())?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::EnumValueDefinition {
    type Target = ast::EnumValueDefinition;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            description: self.description().convert(file_id)?,
            value: self.enum_value()?.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::SelectionSet {
    type Target = Vec<ast::Selection>;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(
            self.selections()
                .filter_map(|selection| selection.convert(file_id))
                .collect(),
        )
    }
}

impl Convert for cst::Selection {
    type Target = ast::Selection;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Selection as A;
        use cst::Selection as C;

        Some(match self {
            C::Field(x) => A::Field(located(file_id, x)?),
            C::FragmentSpread(x) => A::FragmentSpread(located(file_id, x)?),
            C::InlineFragment(x) => A::InlineFragment(located(file_id, x)?),
        })
    }
}

impl Convert for cst::Field {
    type Target = ast::Field;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            alias: self.alias().convert(file_id)?,
            name: self.name()?.convert(file_id)?,
            arguments: arguments(file_id, self.arguments()),
            directives: directives(file_id, self.directives()),
            // Leaf fields get an empty selection set
            selection_set: self.selection_set().convert(file_id)?.unwrap_or_default(),
        })
    }
}

impl Convert for cst::FragmentSpread {
    type Target = ast::FragmentSpread;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            fragment_name: self.fragment_name()?.name()?.convert(file_id)?,
            directives: directives(file_id, self.directives()),
        })
    }
}

impl Convert for cst::InlineFragment {
    type Target = ast::InlineFragment;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        Some(Self::Target {
            type_condition: self.type_condition().convert(file_id)?,
            directives: directives(file_id, self.directives()),
            selection_set: self.selection_set()?.convert(file_id)?,
        })
    }
}

impl Convert for cst::Value {
    type Target = ast::Value;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        use ast::Value as A;
        use cst::Value as C;

        Some(match self {
            C::Variable(v) => A::Variable(v.name()?.convert(file_id)?),
            C::StringValue(v) => A::String(String::from(v)),
            C::FloatValue(v) => A::Float(ast::FloatValue::new_parsed(
                v.syntax().first_token()?.text(),
            )),
            C::IntValue(v) => A::Int(ast::IntValue::new_parsed(v.syntax().first_token()?.text())),
            C::BooleanValue(v) => A::Boolean(bool::try_from(v).ok()?),
            C::NullValue(_) => A::Null,
            C::EnumValue(v) => A::Enum(v.name()?.convert(file_id)?),
            C::ListValue(v) => A::List(collect(file_id, v.values())),
            C::ObjectValue(v) => A::Object(
                v.object_fields()
                    .filter_map(|x| x.convert(file_id))
                    .collect(),
            ),
        })
    }
}

impl Convert for cst::ObjectField {
    type Target = (Name, Node<ast::Value>);

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        let name = self.name()?.convert(file_id)?;
        let value = with_location(file_id, self.syntax(), self.value()?.convert(file_id)?);
        Some((name, value))
    }
}

impl Convert for cst::Alias {
    type Target = Name;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        self.name()?.convert(file_id)
    }
}

impl Convert for cst::Name {
    type Target = Name;

    fn convert(&self, file_id: FileId) -> Option<Self::Target> {
        // Invalid names already have a syntax error
        Name::new_parsed(
            self.text().as_str(),
            NodeLocation::new(file_id, self.syntax()),
        )
        .ok()
    }
}
