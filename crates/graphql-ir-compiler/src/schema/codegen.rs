use crate::validation::Valid;
use crate::Name;
use crate::Schema;
use indexmap::IndexMap;

/// A validated schema together with the settings code generation needs,
/// persisted between compilation steps as JSON.
///
/// Source locations are not persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenSchema {
    pub schema: Schema,
    /// Target type of each custom scalar that has one
    #[serde(default)]
    pub scalar_mapping: IndexMap<Name, String>,
    #[serde(default)]
    pub generate_data_builders: bool,
}

impl CodegenSchema {
    pub fn new(schema: Valid<Schema>) -> Self {
        Self {
            schema: schema.into_inner(),
            scalar_mapping: IndexMap::new(),
            generate_data_builders: false,
        }
    }

    pub fn scalar_mapping(mut self, scalar: Name, target: impl Into<String>) -> Self {
        self.scalar_mapping.insert(scalar, target.into());
        self
    }

    pub fn generate_data_builders(mut self, generate: bool) -> Self {
        self.generate_data_builders = generate;
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let codegen: Self = serde_json::from_str(json)?;
        log::debug!(
            "loaded schema with {} types and {} directive definitions",
            codegen.schema.types.len(),
            codegen.schema.directive_definitions.len()
        );
        Ok(codegen)
    }

    /// The persisted schema, which was validated before being written
    pub fn valid_schema(&self) -> Valid<Schema> {
        Valid::assume_valid(self.schema.clone())
    }
}
