use crate::ast::DirectiveLocation;
use crate::ast::OperationType;
use crate::diagnostic::DiagnosticList;
use crate::schema::key_fields::parse_field_names;
use crate::schema::ExtendedType;
use crate::schema::FieldDefinition;
use crate::schema::InputValueDefinition;
use crate::schema::ObjectType;
use crate::schema::Type;
use crate::validation::directive::report_variables;
use crate::validation::directive::validate_const_directives;
use crate::validation::value::coerce_value;
use crate::validation::DiagnosticData;
use crate::Name;
use crate::Node;
use crate::Schema;
use indexmap::IndexMap;

/// Check type system rules that need the whole schema to be assembled
pub(crate) fn validate_schema(schema: &Schema, errors: &mut DiagnosticList) {
    validate_root_operations(schema, errors);
    validate_const_directives(
        schema,
        errors,
        &schema.schema_definition.directives,
        DirectiveLocation::Schema,
    );

    for definition in schema.directive_definitions.values() {
        if definition.is_built_in() {
            continue;
        }
        reserved_name(errors, &definition.name);
        validate_input_values(
            schema,
            errors,
            &format!("@{}", definition.name),
            &definition.arguments,
            DirectiveLocation::ArgumentDefinition,
        );
    }

    for ty in schema.types.values() {
        if ty.is_built_in() {
            continue;
        }
        reserved_name(errors, ty.name());
        match ty {
            ExtendedType::Scalar(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::Scalar,
                );
            }
            ExtendedType::Object(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::Object,
                );
                validate_nonnull_fields(schema, errors, def);
                validate_implements(schema, errors, ty);
                validate_fields(schema, errors, ty, &def.fields);
            }
            ExtendedType::Interface(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::Interface,
                );
                validate_implements(schema, errors, ty);
                validate_fields(schema, errors, ty, &def.fields);
            }
            ExtendedType::Union(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::Union,
                );
                for member in &def.members {
                    match schema.types.get(member) {
                        None => errors.push(
                            member.location(),
                            DiagnosticData::UndefinedDefinition {
                                name: member.clone(),
                            },
                        ),
                        Some(member_type) if !member_type.is_object() => errors.push(
                            member.location(),
                            DiagnosticData::UnionMemberObjectType {
                                union_name: def.name.clone(),
                                name: member.clone(),
                            },
                        ),
                        Some(_) => {}
                    }
                }
            }
            ExtendedType::Enum(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::Enum,
                );
                for value in def.values.values() {
                    reserved_name(errors, &value.value);
                    validate_const_directives(
                        schema,
                        errors,
                        &value.directives,
                        DirectiveLocation::EnumValue,
                    );
                }
            }
            ExtendedType::InputObject(def) => {
                validate_const_directives(
                    schema,
                    errors,
                    &def.directives,
                    DirectiveLocation::InputObject,
                );
                let fields: Vec<_> = def.fields.values().cloned().collect();
                validate_input_values(
                    schema,
                    errors,
                    &def.name,
                    &fields,
                    DirectiveLocation::InputFieldDefinition,
                );
            }
        }
    }
}

fn reserved_name(errors: &mut DiagnosticList, name: &Name) {
    // Names starting with two underscores are reserved for introspection
    if name.starts_with("__") {
        errors.push(
            name.location(),
            DiagnosticData::ReservedName { name: name.clone() },
        );
    }
}

fn validate_root_operations(schema: &Schema, errors: &mut DiagnosticList) {
    let definition = &schema.schema_definition;
    if definition.query.is_none() {
        errors.push(definition.location(), DiagnosticData::QueryRootOperationType);
    }
    for operation_type in OperationType::ALL {
        let Some(name) = schema.root_operation(operation_type) else {
            continue;
        };
        match schema.types.get(name) {
            None => errors.push(
                name.location(),
                DiagnosticData::UndefinedRootOperationType {
                    operation_type,
                    name: name.clone(),
                },
            ),
            Some(ty) if !ty.is_object() => errors.push(
                name.location(),
                DiagnosticData::RootOperationObjectType {
                    name: name.clone(),
                    describe_type: ty.describe(),
                },
            ),
            Some(_) => {}
        }
    }
}

fn validate_implements(schema: &Schema, errors: &mut DiagnosticList, ty: &ExtendedType) {
    for interface in ty.implements_interfaces() {
        match schema.types.get(interface) {
            None => errors.push(
                interface.location(),
                DiagnosticData::UndefinedInterface {
                    type_name: ty.name().clone(),
                    interface: interface.clone(),
                },
            ),
            Some(definition) if !definition.is_interface() => errors.push(
                interface.location(),
                DiagnosticData::ImplementsNonInterface {
                    type_name: ty.name().clone(),
                    interface: interface.clone(),
                    describe_type: definition.describe(),
                },
            ),
            Some(_) => {}
        }
    }
}

fn validate_fields(
    schema: &Schema,
    errors: &mut DiagnosticList,
    ty: &ExtendedType,
    fields: &IndexMap<Name, Node<FieldDefinition>>,
) {
    if fields.is_empty() {
        errors.push(
            ty.location(),
            DiagnosticData::EmptyFields {
                describe_type: ty.describe(),
                name: ty.name().clone(),
            },
        );
    }
    for field in fields.values() {
        reserved_name(errors, &field.name);
        let coordinate = format!("{}.{}", ty.name(), field.name);
        let output = field.ty.inner_named_type();
        match schema.types.get(output) {
            None => errors.push(
                output.location(),
                DiagnosticData::UndefinedDefinition {
                    name: output.clone(),
                },
            ),
            Some(definition) if !definition.is_output_type() => errors.push(
                output.location(),
                DiagnosticData::OutputType {
                    coordinate: coordinate.clone(),
                    name: output.clone(),
                    describe_type: definition.describe(),
                },
            ),
            Some(_) => {}
        }
        validate_const_directives(
            schema,
            errors,
            &field.directives,
            DirectiveLocation::FieldDefinition,
        );
        validate_input_values(
            schema,
            errors,
            &coordinate,
            &field.arguments,
            DirectiveLocation::ArgumentDefinition,
        );
    }
}

/// Arguments of fields and directives, or fields of input objects
fn validate_input_values(
    schema: &Schema,
    errors: &mut DiagnosticList,
    coordinate: &str,
    definitions: &[Node<InputValueDefinition>],
    location: DirectiveLocation,
) {
    for definition in definitions {
        reserved_name(errors, &definition.name);
        validate_const_directives(schema, errors, &definition.directives, location);
        let input = definition.ty.inner_named_type();
        match schema.types.get(input) {
            None => errors.push(
                input.location(),
                DiagnosticData::UndefinedDefinition {
                    name: input.clone(),
                },
            ),
            Some(ty) if !ty.is_input_type() => errors.push(
                input.location(),
                DiagnosticData::InputType {
                    coordinate: format!("{coordinate}.{}", definition.name),
                    name: input.clone(),
                    describe_type: ty.describe(),
                },
            ),
            Some(_) => {
                if let Some(default_value) = &definition.default_value {
                    let mut references = Vec::new();
                    coerce_value(
                        schema,
                        errors,
                        &mut references,
                        &definition.ty,
                        default_value,
                        None,
                    );
                    report_variables(errors, references);
                }
            }
        }
    }
}

/// `@nonnull(fields: "a b")` on an object makes the named fields non-null
fn validate_nonnull_fields(schema: &Schema, errors: &mut DiagnosticList, object: &ObjectType) {
    for directive in &object.directives {
        if schema.original_directive_name(&directive.name) != Some("nonnull") {
            continue;
        }
        let default = schema
            .directive_definitions
            .get(&directive.name)
            .and_then(|definition| {
                definition
                    .arguments
                    .iter()
                    .find(|argument| argument.name == "fields")
            })
            .and_then(|argument| argument.default_value.clone());
        let source_text = directive
            .argument_by_name("fields")
            .or(default.as_ref())
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        let path = format!("{}@{}", object.name, directive.name);
        let names = match parse_field_names(source_text, &path, errors) {
            Ok(names) => names,
            Err(None) => continue,
            Err(Some(_)) => {
                errors.push(
                    directive.location(),
                    DiagnosticData::NonnullObjectFields {
                        name: directive.name.clone(),
                        type_name: object.name.clone(),
                    },
                );
                continue;
            }
        };
        if names.is_empty() {
            errors.push(
                directive.location(),
                DiagnosticData::NonnullObjectFields {
                    name: directive.name.clone(),
                    type_name: object.name.clone(),
                },
            );
        }
        for field in names {
            if !object.fields.contains_key(&field) {
                errors.push(
                    directive.location(),
                    DiagnosticData::NonnullUndefinedField {
                        name: directive.name.clone(),
                        type_name: object.name.clone(),
                        field: field.to_string(),
                    },
                );
            }
        }
    }
}

/// Returns the type of a field once `@nonnull` on the field or on its parent object applies
pub(crate) fn nonnull_type(
    schema: &Schema,
    parent: &ExtendedType,
    field: &FieldDefinition,
) -> Type {
    let on_field = field
        .directives
        .iter()
        .any(|directive| schema.original_directive_name(&directive.name) == Some("nonnull"));
    let on_parent = parent.directives().iter().any(|directive| {
        schema.original_directive_name(&directive.name) == Some("nonnull")
            && directive
                .argument_by_name("fields")
                .and_then(|value| value.as_str())
                .is_some_and(|fields| {
                    fields
                        .split(|c: char| c.is_whitespace() || c == ',')
                        .any(|name| name == field.name.as_str())
                })
    });
    if on_field || on_parent {
        field.ty.clone().non_null()
    } else {
        field.ty.clone()
    }
}
