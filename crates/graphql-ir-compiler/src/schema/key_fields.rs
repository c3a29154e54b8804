//! Key fields: the fields that identify an object in a normalized cache,
//! declared with `@typePolicy(keyFields: "...")` and inherited from interfaces.

use crate::ast;
use crate::diagnostic::DiagnosticList;
use crate::diagnostic::IssueKind;
use crate::schema::ExtendedType;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::Name;
use crate::Parser;
use crate::Schema;
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::collections::HashMap;
use std::collections::HashSet;

/// Parse a selection held in a directive argument, such as `"id name"`,
/// that may only contain plain fields. A blank string selects nothing.
///
/// Returns `Err(None)` on a syntax error, which the parser already reported,
/// and `Err(Some(message))` when the selection is more than a list of fields.
pub(crate) fn parse_field_names(
    source_text: &str,
    path: &str,
    errors: &mut DiagnosticList,
) -> Result<Vec<Name>, Option<String>> {
    if source_text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let before = errors.len();
    let selections =
        Parser::new().parse_field_set_inner(source_text, path, FileId::new(), errors);
    if errors
        .iter()
        .skip(before)
        .any(|issue| issue.kind == IssueKind::ParsingError)
    {
        return Err(None);
    }
    selections
        .iter()
        .map(|selection| match selection {
            ast::Selection::Field(field)
                if field.alias.is_none()
                    && field.arguments.is_empty()
                    && field.directives.is_empty()
                    && field.selection_set.is_empty() =>
            {
                Ok(field.name.clone())
            }
            _ => Err(Some(format!("`{selection}` is not a plain field"))),
        })
        .collect()
}

/// Compute the key fields of every object, interface and union type.
///
/// Types without key fields are left out of the result.
pub(crate) fn compute_key_fields(
    schema: &Schema,
    errors: &mut DiagnosticList,
) -> IndexMap<Name, IndexSet<Name>> {
    let mut computer = KeyFields {
        schema,
        errors,
        cache: HashMap::new(),
        building: HashSet::new(),
    };
    let mut result = IndexMap::new();
    for (name, ty) in &schema.types {
        if !matches!(
            ty,
            ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_)
        ) {
            continue;
        }
        let keys = computer.get(name);
        if !keys.is_empty() {
            result.insert(name.clone(), keys);
        }
    }
    log::debug!("{} types have key fields", result.len());
    result
}

struct KeyFields<'a> {
    schema: &'a Schema,
    errors: &'a mut DiagnosticList,
    cache: HashMap<Name, IndexSet<Name>>,
    /// Types whose key fields are being computed, to stop on inheritance cycles
    building: HashSet<Name>,
}

impl KeyFields<'_> {
    fn get(&mut self, name: &Name) -> IndexSet<Name> {
        if let Some(keys) = self.cache.get(name) {
            return keys.clone();
        }
        if !self.building.insert(name.clone()) {
            return IndexSet::new();
        }
        let keys = self.compute(name);
        self.building.remove(name);
        self.cache.insert(name.clone(), keys.clone());
        keys
    }

    fn compute(&mut self, name: &Name) -> IndexSet<Name> {
        let schema = self.schema;
        let Some(ty) = schema.types.get(name) else {
            return IndexSet::new();
        };

        let mut inherited: Vec<(Name, IndexSet<Name>)> = Vec::new();
        for interface in ty.implements_interfaces() {
            let keys = self.get(interface);
            if !keys.is_empty() && !inherited.iter().any(|(_, existing)| *existing == keys) {
                inherited.push((interface.clone(), keys));
            }
        }
        if let [(_, first), (_, second), ..] = inherited.as_slice() {
            self.errors.push(
                ty.name().location(),
                DiagnosticData::ConflictingKeyFields {
                    type_name: name.clone(),
                    first: join(first),
                    second: join(second),
                },
            );
        }

        let own = self.declared(ty);
        match inherited.into_iter().next() {
            Some((super_type, keys)) => {
                if !own.is_empty() {
                    self.errors.push(
                        ty.name().location(),
                        DiagnosticData::KeyFieldsOnInheritingType {
                            type_name: name.clone(),
                            super_type,
                        },
                    );
                }
                keys
            }
            None => own,
        }
    }

    /// Key fields declared on the type itself
    fn declared(&mut self, ty: &ExtendedType) -> IndexSet<Name> {
        let schema = self.schema;
        let mut keys = IndexSet::new();
        for directive in ty.directives() {
            if schema.original_directive_name(&directive.name) != Some("typePolicy") {
                continue;
            }
            let Some(source_text) = directive
                .argument_by_name("keyFields")
                .and_then(|value| value.as_str())
            else {
                continue;
            };
            let path = format!("{}@{}", ty.name(), directive.name);
            let names = match parse_field_names(source_text, &path, self.errors) {
                Ok(names) => names,
                Err(message) => {
                    if let Some(message) = message {
                        self.errors.push(
                            directive.location(),
                            DiagnosticData::InvalidKeyFields {
                                type_name: ty.name().clone(),
                                message,
                            },
                        );
                    }
                    continue;
                }
            };
            for field in names {
                if schema.type_field(ty.name(), &field).is_none() {
                    self.errors.push(
                        directive.location(),
                        DiagnosticData::InvalidKeyFields {
                            type_name: ty.name().clone(),
                            message: format!("`{field}` is not a field of `{}`", ty.name()),
                        },
                    );
                    continue;
                }
                keys.insert(field);
            }
        }
        keys
    }
}

fn join(keys: &IndexSet<Name>) -> String {
    keys.iter()
        .map(Name::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
