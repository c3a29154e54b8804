use crate::ast;
use crate::ast::DirectiveList;
use crate::ast::FloatValue;
use crate::ast::Type;
use crate::ast::Value;
use crate::diagnostic::DiagnosticList;
use crate::schema::ExtendedType;
use crate::schema::InputValueDefinition;
use crate::validation::DiagnosticData;
use crate::validation::VariableReference;
use crate::validation::VariableUsage;
use crate::Name;
use crate::Node;
use crate::NodeLocation;
use crate::Schema;
use std::collections::HashMap;

/// The reason a schema element is deprecated, if it is
pub(crate) fn deprecation_reason(directives: &DirectiveList) -> Option<String> {
    let directive = directives.get("deprecated")?;
    let reason = directive
        .argument_by_name("reason")
        .and_then(|value| value.as_str())
        .unwrap_or("No longer supported");
    Some(reason.to_owned())
}

/// Check arguments given to a field or directive against their definitions,
/// returning them coerced to their declared types.
///
/// `coordinate` names the field (`Query.node`) or directive (`@include`) in messages.
/// Variables found in values are appended to `references`.
pub(crate) fn validate_arguments(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    definitions: &[Node<InputValueDefinition>],
    arguments: &[Node<ast::Argument>],
    coordinate: &str,
    location: Option<NodeLocation>,
) -> Vec<Node<ast::Argument>> {
    let mut seen = HashMap::<&Name, &Node<ast::Argument>>::new();
    let mut coerced = Vec::with_capacity(arguments.len());
    for argument in arguments {
        if let Some(original) = seen.get(&argument.name) {
            diagnostics.push(
                argument.location(),
                DiagnosticData::UniqueArgument {
                    name: argument.name.clone(),
                    original_definition: original.location(),
                },
            );
            continue;
        }
        seen.insert(&argument.name, argument);

        let Some(definition) = definitions.iter().find(|def| def.name == argument.name) else {
            diagnostics.push(
                argument.location(),
                DiagnosticData::UndefinedArgument {
                    name: argument.name.clone(),
                    coordinate: coordinate.to_owned(),
                },
            );
            continue;
        };
        if let Some(reason) = deprecation_reason(&definition.directives) {
            diagnostics.push(
                argument.location(),
                DiagnosticData::DeprecatedUsage {
                    describe: "argument",
                    coordinate: format!("{coordinate}({}:)", argument.name),
                    reason,
                },
            );
        }
        let value = coerce_value(
            schema,
            diagnostics,
            references,
            &definition.ty,
            &argument.value,
            definition.default_value.as_ref(),
        );
        coerced.push(argument.same_location(ast::Argument {
            name: argument.name.clone(),
            value,
        }));
    }

    for definition in definitions {
        let required = definition.ty.is_non_null() && definition.default_value.is_none();
        if required && !seen.contains_key(&definition.name) {
            diagnostics.push(
                location,
                DiagnosticData::RequiredArgument {
                    name: definition.name.clone(),
                    coordinate: coordinate.to_owned(),
                },
            );
        }
    }
    coerced
}

/// Check that `value` can be coerced to `ty` and return the coerced value.
///
/// Errors are reported and the value is returned unchanged.
/// Variables are not checked here: they are recorded in `references`
/// with the type expected at their position.
pub(crate) fn coerce_value(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    ty: &Type,
    value: &Node<Value>,
    location_default: Option<&Node<Value>>,
) -> Node<Value> {
    if let Value::Variable(name) = &**value {
        references.push(VariableReference {
            name: name.clone(),
            usage: VariableUsage {
                expected_type: ty.clone(),
                location_default: location_default.cloned(),
            },
            location: value.location(),
        });
        return value.clone();
    }
    if value.is_null() {
        if ty.is_non_null() {
            diagnostics.push(
                value.location(),
                DiagnosticData::UnsupportedValueType {
                    ty: ty.to_string(),
                    describe_value_type: value.describe(),
                },
            );
        }
        return value.clone();
    }
    match ty {
        Type::List(item) | Type::NonNullList(item) => match &**value {
            Value::List(items) => value.same_location(Value::List(
                items
                    .iter()
                    .map(|item_value| {
                        coerce_value(schema, diagnostics, references, item, item_value, None)
                    })
                    .collect(),
            )),
            // Input coercion wraps a single item in a list
            _ => {
                let single =
                    coerce_value(schema, diagnostics, references, item, value, location_default);
                value.same_location(Value::List(vec![single]))
            }
        },
        Type::Named(name) | Type::NonNullNamed(name) => {
            coerce_named(schema, diagnostics, references, ty, name, value)
        }
    }
}

fn coerce_named(
    schema: &Schema,
    diagnostics: &mut DiagnosticList,
    references: &mut Vec<VariableReference>,
    ty: &Type,
    type_name: &Name,
    value: &Node<Value>,
) -> Node<Value> {
    let unsupported = |diagnostics: &mut DiagnosticList| {
        diagnostics.push(
            value.location(),
            DiagnosticData::UnsupportedValueType {
                ty: ty.to_string(),
                describe_value_type: value.describe(),
            },
        )
    };
    match schema.types.get(type_name) {
        Some(ExtendedType::Scalar(_)) => match (type_name.as_str(), &**value) {
            ("Int", Value::Int(int)) => {
                if int.try_to_i32().is_err() {
                    diagnostics.push(
                        value.location(),
                        DiagnosticData::IntCoercionError {
                            value: int.to_string(),
                        },
                    )
                }
                value.clone()
            }
            ("Float", Value::Float(float)) => {
                if float.try_to_f64().is_none() {
                    diagnostics.push(
                        value.location(),
                        DiagnosticData::FloatCoercionError {
                            value: float.to_string(),
                        },
                    )
                }
                value.clone()
            }
            // Int literals are accepted where a Float is expected
            ("Float", Value::Int(int)) => match int.try_to_f64() {
                Some(float) => value.same_location(Value::Float(FloatValue::from(float))),
                None => {
                    diagnostics.push(
                        value.location(),
                        DiagnosticData::FloatCoercionError {
                            value: int.to_string(),
                        },
                    );
                    value.clone()
                }
            },
            ("String", Value::String(_))
            | ("Boolean", Value::Boolean(_))
            | ("ID", Value::String(_) | Value::Int(_)) => value.clone(),
            ("Int" | "Float" | "String" | "Boolean" | "ID", _) => {
                unsupported(diagnostics);
                value.clone()
            }
            // Custom scalars accept any literal
            _ => value.clone(),
        },
        Some(ExtendedType::Enum(definition)) => {
            match &**value {
                Value::Enum(symbol) => match definition.values.get(symbol) {
                    Some(enum_value) => {
                        if let Some(reason) = deprecation_reason(&enum_value.directives) {
                            diagnostics.push(
                                value.location(),
                                DiagnosticData::DeprecatedUsage {
                                    describe: "enum value",
                                    coordinate: format!("{}.{symbol}", definition.name),
                                    reason,
                                },
                            )
                        }
                    }
                    None => diagnostics.push(
                        value.location(),
                        DiagnosticData::UndefinedEnumValue {
                            value: symbol.clone(),
                            definition: definition.name.clone(),
                        },
                    ),
                },
                _ => unsupported(diagnostics),
            }
            value.clone()
        }
        Some(ExtendedType::InputObject(definition)) => {
            let Value::Object(fields) = &**value else {
                unsupported(diagnostics);
                return value.clone();
            };
            let mut seen = HashMap::<&Name, Option<NodeLocation>>::new();
            let mut coerced = Vec::with_capacity(fields.len());
            for (name, field_value) in fields {
                if let Some(original) = seen.get(name) {
                    diagnostics.push(
                        name.location(),
                        DiagnosticData::UniqueInputValue {
                            name: name.clone(),
                            original_definition: *original,
                        },
                    );
                    continue;
                }
                seen.insert(name, name.location());
                let Some(field_definition) = definition.fields.get(name) else {
                    diagnostics.push(
                        field_value.location(),
                        DiagnosticData::UndefinedInputValue {
                            value: name.clone(),
                            definition: definition.name.clone(),
                        },
                    );
                    continue;
                };
                if let Some(reason) = deprecation_reason(&field_definition.directives) {
                    diagnostics.push(
                        field_value.location(),
                        DiagnosticData::DeprecatedUsage {
                            describe: "input field",
                            coordinate: format!("{}.{name}", definition.name),
                            reason,
                        },
                    )
                }
                let field_value = coerce_value(
                    schema,
                    diagnostics,
                    references,
                    &field_definition.ty,
                    field_value,
                    field_definition.default_value.as_ref(),
                );
                coerced.push((name.clone(), field_value));
            }
            for (name, field_definition) in &definition.fields {
                let required =
                    field_definition.ty.is_non_null() && field_definition.default_value.is_none();
                if required && !seen.contains_key(name) {
                    diagnostics.push(
                        value.location(),
                        DiagnosticData::RequiredField {
                            coordinate: format!("{}.{name}", definition.name),
                        },
                    )
                }
            }
            value.same_location(Value::Object(coerced))
        }
        // Output or undefined types are reported where the argument is defined
        _ => value.clone(),
    }
}
