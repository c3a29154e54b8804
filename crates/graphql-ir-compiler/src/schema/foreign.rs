//! Definitions imported with `@link`.
//!
//! ```graphql
//! extend schema @link(
//!   url: "https://specs.apollo.dev/kotlin_labs/v0.3",
//!   import: ["@nonnull", { name: "@typePolicy", as: "@policy" }]
//! )
//! ```
//!
//! The url identifies a bundle by its last two path segments, name and version.
//! Imported symbols keep their name or take their alias. Other symbols are
//! prefixed with `<as>__`, `as` defaulting to the bundle name.

use crate::ast;
use crate::ast::Definition;
use crate::diagnostic::DiagnosticList;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::Name;
use crate::Node;
use crate::Parser;
use crate::SourceMap;
use indexmap::IndexMap;
use std::sync::OnceLock;

pub(crate) const KOTLIN_LABS: &str = "kotlin_labs";
const LINK: &str = "link";

/// A versioned bundle of directive and type definitions
struct ForeignSchema {
    name: &'static str,
    version: &'static str,
    source_text: &'static str,
    /// Client-only directives, removed from documents before they are sent to a server
    directives_to_strip: &'static [&'static str],
    document: OnceLock<ast::Document>,
}

macro_rules! foreign_schema {
    ($name: literal, $version: literal, strip: [$($strip: literal),*]) => {
        ForeignSchema {
            name: $name,
            version: $version,
            source_text: include_str!(concat!("bundles/", $name, "_", $version, ".graphql")),
            directives_to_strip: &[$($strip),*],
            document: OnceLock::new(),
        }
    };
}

static FOREIGN_SCHEMAS: [ForeignSchema; 6] = [
    foreign_schema!("kotlin_labs", "v0.1", strip: ["optional", "nonnull"]),
    foreign_schema!("kotlin_labs", "v0.2", strip: ["optional", "nonnull"]),
    foreign_schema!("kotlin_labs", "v0.3", strip: ["optional", "nonnull"]),
    foreign_schema!("nullability", "v0.1", strip: ["catch", "ignoreErrors"]),
    foreign_schema!("cache", "v0.1", strip: []),
    foreign_schema!("link", "v1.0", strip: []),
];

/// Renamed definitions from one bundle, ready to be added to a schema
#[derive(Debug)]
pub(crate) struct Imported {
    pub(crate) spec_name: &'static str,
    pub(crate) definitions: Vec<Definition>,
    pub(crate) foreign_names: IndexMap<String, String>,
    pub(crate) directives_to_strip: Vec<String>,
    pub(crate) sources: SourceMap,
}

impl ForeignSchema {
    fn find(name: &str, version: &str) -> Option<&'static Self> {
        FOREIGN_SCHEMAS
            .iter()
            .find(|schema| schema.name == name && schema.version == version)
    }

    fn latest(name: &str) -> Option<&'static Self> {
        FOREIGN_SCHEMAS.iter().rev().find(|schema| schema.name == name)
    }

    fn document(&self) -> &ast::Document {
        self.document.get_or_init(|| {
            let mut errors = DiagnosticList::new(Default::default());
            let path = format!("{}_{}.graphql", self.name, self.version);
            let document =
                Parser::new().parse_ast_inner(self.source_text, path, FileId::new(), &mut errors);
            debug_assert!(errors.is_empty(), "{errors}");
            document
        })
    }

    /// Rename and collect definitions.
    ///
    /// `imports` maps symbols (`@directive` or `Type`) to the name they take in the schema.
    /// With `import_all`, every symbol keeps its name.
    fn import(
        &'static self,
        prefix: &str,
        imports: &IndexMap<String, String>,
        import_all: bool,
    ) -> Result<Imported, String> {
        let document = self.document();
        let mut renames = IndexMap::new();
        for definition in &document.definitions {
            let Some((key, name)) = symbol(definition) else {
                continue;
            };
            let renamed = if import_all {
                key.clone()
            } else if let Some(alias) = imports.get(&key) {
                alias.clone()
            } else if key.starts_with('@') && name == self.name {
                format!("@{prefix}")
            } else if key.starts_with('@') {
                format!("@{prefix}__{name}")
            } else {
                format!("{prefix}__{name}")
            };
            renames.insert(key, renamed);
        }
        if let Some(unknown) = imports.keys().find(|key| !renames.contains_key(*key)) {
            return Err(format!(
                "`{unknown}` is not defined by {}/{}",
                self.name, self.version
            ));
        }
        let definitions = document
            .definitions
            .iter()
            .map(|definition| rename_definition(definition, &renames))
            .collect::<Result<_, _>>()?;
        let directives_to_strip = self
            .directives_to_strip
            .iter()
            .filter_map(|name| renames.get(&format!("@{name}")))
            .map(|renamed| renamed.trim_start_matches('@').to_owned())
            .collect();
        log::debug!(
            "importing {}/{} with prefix `{prefix}`",
            self.name,
            self.version
        );
        Ok(Imported {
            spec_name: self.name,
            definitions,
            foreign_names: renames,
            directives_to_strip,
            sources: document.sources.clone(),
        })
    }
}

/// Resolve every `@link` on the schema definition and schema extensions.
///
/// The `link` bundle itself is imported as soon as one `@link` is used.
pub(crate) fn resolve_links(
    definitions: &[Definition],
    errors: &mut DiagnosticList,
) -> Vec<Imported> {
    let link_directives = definitions.iter().flat_map(schema_directives);
    let mut imported = Vec::new();
    let mut any_link = false;
    for directive in link_directives.filter(|directive| directive.name == LINK) {
        any_link = true;
        match link(directive) {
            Ok(import) => imported.push(import),
            Err(data) => errors.push(directive.location(), data),
        }
    }
    if any_link && !imported.iter().any(|import| import.spec_name == LINK) {
        if let Some(Ok(link)) = ForeignSchema::latest(LINK)
            .map(|schema| schema.import(LINK, &IndexMap::new(), false))
        {
            imported.push(link)
        }
    }
    imported
}

fn schema_directives(definition: &Definition) -> &[Node<ast::Directive>] {
    match definition {
        Definition::SchemaDefinition(def) => &def.directives.0,
        Definition::SchemaExtension(def) => &def.directives.0,
        _ => &[],
    }
}

/// The latest `kotlin_labs` definitions, without prefix,
/// for schemas that do not link them explicitly.
pub(crate) fn kotlin_labs_defaults() -> Option<Imported> {
    ForeignSchema::latest(KOTLIN_LABS)?
        .import(KOTLIN_LABS, &IndexMap::new(), true)
        .ok()
}

fn link(directive: &Node<ast::Directive>) -> Result<Imported, DiagnosticData> {
    let invalid = |message: String| DiagnosticData::InvalidLink { message };
    let url = directive
        .argument_by_name("url")
        .and_then(|value| value.as_str())
        .ok_or_else(|| invalid("a `url` string argument is required".to_owned()))?;
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let (Some(version), Some(name)) = (segments.next(), segments.next()) else {
        return Err(invalid(format!("`{url}` should end with `<name>/<version>`")));
    };
    let schema = ForeignSchema::find(name, version).ok_or_else(|| {
        DiagnosticData::UnknownForeignSchema {
            url: url.to_owned(),
        }
    })?;
    let prefix = match directive.argument_by_name("as") {
        Some(value) => value
            .as_str()
            .ok_or_else(|| invalid("`as` must be a string".to_owned()))?,
        None => schema.name,
    };
    if !Name::valid_syntax(prefix) {
        return Err(invalid(format!("`{prefix}` is not a valid prefix")));
    }
    let mut imports = IndexMap::new();
    if let Some(value) = directive.argument_by_name("import") {
        let items = match value.as_list() {
            Some(items) => items,
            None => std::slice::from_ref(value),
        };
        for item in items {
            let (symbol, alias) = import_item(item).map_err(invalid)?;
            imports.insert(symbol, alias);
        }
    }
    schema.import(prefix, &imports, false).map_err(invalid)
}

/// `"@name"`, `"Name"`, or `{ name: "@name", as: "@alias" }`
fn import_item(item: &ast::Value) -> Result<(String, String), String> {
    let (symbol, alias) = match item {
        ast::Value::String(symbol) => (symbol.clone(), symbol.clone()),
        ast::Value::Object(fields) => {
            let field = |name: &str| {
                fields
                    .iter()
                    .find(|(key, _)| key == name)
                    .and_then(|(_, value)| value.as_str())
            };
            let symbol = field("name").ok_or("an import object requires a `name` string")?;
            let alias = field("as").unwrap_or(symbol);
            (symbol.to_owned(), alias.to_owned())
        }
        _ => return Err(format!("cannot import {}", item.describe())),
    };
    if symbol.starts_with('@') != alias.starts_with('@') {
        return Err(format!(
            "`{symbol}` and its alias `{alias}` must both be directives or both be types"
        ));
    }
    Ok((symbol, alias))
}

/// `("@name", "name")` for directives, `("Name", "Name")` for types
fn symbol(definition: &Definition) -> Option<(String, &Name)> {
    let (name, is_directive) = match definition {
        Definition::DirectiveDefinition(def) => (&def.name, true),
        Definition::ScalarTypeDefinition(def) => (&def.name, false),
        Definition::EnumTypeDefinition(def) => (&def.name, false),
        Definition::InputObjectTypeDefinition(def) => (&def.name, false),
        _ => return None,
    };
    let key = if is_directive {
        format!("@{name}")
    } else {
        name.to_string()
    };
    Some((key, name))
}

fn rename_definition(
    definition: &Definition,
    renames: &IndexMap<String, String>,
) -> Result<Definition, String> {
    let rename = |name: &Name, key: String| -> Result<Name, String> {
        let renamed = renames.get(&key).map_or(name.as_str(), |renamed| {
            renamed.trim_start_matches('@')
        });
        Name::new(renamed)
            .map(|new| new.with_location(name.location()))
            .map_err(|_| format!("`{renamed}` is not a valid GraphQL name"))
    };
    let rename_inputs = |inputs: &mut Vec<Node<ast::InputValueDefinition>>| {
        for input in inputs {
            let ty = rename_type(&input.ty, renames)?;
            *input.make_mut().ty.make_mut() = ty;
        }
        Ok::<_, String>(())
    };
    Ok(match definition {
        Definition::DirectiveDefinition(def) => {
            let mut def = def.clone();
            let inner = def.make_mut();
            inner.name = rename(&inner.name, format!("@{}", inner.name))?;
            rename_inputs(&mut inner.arguments)?;
            Definition::DirectiveDefinition(def)
        }
        Definition::ScalarTypeDefinition(def) => {
            let mut def = def.clone();
            let inner = def.make_mut();
            inner.name = rename(&inner.name, inner.name.to_string())?;
            Definition::ScalarTypeDefinition(def)
        }
        Definition::EnumTypeDefinition(def) => {
            let mut def = def.clone();
            let inner = def.make_mut();
            inner.name = rename(&inner.name, inner.name.to_string())?;
            Definition::EnumTypeDefinition(def)
        }
        Definition::InputObjectTypeDefinition(def) => {
            let mut def = def.clone();
            let inner = def.make_mut();
            inner.name = rename(&inner.name, inner.name.to_string())?;
            rename_inputs(&mut inner.fields)?;
            Definition::InputObjectTypeDefinition(def)
        }
        other => other.clone(),
    })
}

fn rename_type(ty: &ast::Type, renames: &IndexMap<String, String>) -> Result<ast::Type, String> {
    let rename = |name: &Name| match renames.get(name.as_str()) {
        Some(renamed) => Name::new(renamed)
            .map(|new| new.with_location(name.location()))
            .map_err(|_| format!("`{renamed}` is not a valid GraphQL name")),
        None => Ok(name.clone()),
    };
    Ok(match ty {
        ast::Type::Named(name) => ast::Type::Named(rename(name)?),
        ast::Type::NonNullNamed(name) => ast::Type::NonNullNamed(rename(name)?),
        ast::Type::List(inner) => ast::Type::List(Box::new(rename_type(inner, renames)?)),
        ast::Type::NonNullList(inner) => {
            ast::Type::NonNullList(Box::new(rename_type(inner, renames)?))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundles_parse() {
        for schema in &FOREIGN_SCHEMAS {
            assert!(!schema.document().definitions.is_empty(), "{}", schema.name);
        }
    }

    #[test]
    fn default_prefix_and_imports() {
        let schema = ForeignSchema::find("nullability", "v0.1").unwrap();
        let imports = [("@catch".to_owned(), "@catch".to_owned())].into_iter().collect();
        let imported = schema.import("nullability", &imports, false).unwrap();
        assert_eq!(imported.foreign_names["@catch"], "@catch");
        assert_eq!(imported.foreign_names["@ignoreErrors"], "@nullability__ignoreErrors");
        assert_eq!(imported.foreign_names["CatchTo"], "nullability__CatchTo");
        assert_eq!(imported.directives_to_strip, ["catch", "nullability__ignoreErrors"]);

        let catch = imported
            .definitions
            .iter()
            .find_map(|def| match def {
                Definition::DirectiveDefinition(def) if def.name == "catch" => Some(def),
                _ => None,
            })
            .unwrap();
        assert_eq!(catch.arguments[0].ty.to_string(), "nullability__CatchTo!");
    }

    #[test]
    fn directive_named_like_its_bundle() {
        let schema = ForeignSchema::find("link", "v1.0").unwrap();
        let imported = schema.import("link", &IndexMap::new(), false).unwrap();
        assert_eq!(imported.foreign_names["@link"], "@link");
        assert_eq!(imported.foreign_names["Purpose"], "link__Purpose");
    }
}
