use crate::ast::FragmentDefinition;
use crate::validation::VariableUsage;
use crate::Name;
use crate::Node;
use indexmap::IndexMap;

/// What a compiled module exposes to the modules that depend on it
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodegenMetadata {
    pub fragments: Vec<UpstreamFragment>,
    pub resolver_entries: Vec<ResolverEntry>,
}

/// A fragment compiled in another module, reused as is
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UpstreamFragment {
    pub definition: Node<FragmentDefinition>,
    /// Variables used by the fragment and the fragments it spreads
    pub variables: IndexMap<Name, VariableUsage>,
}

/// Maps an IR element to the name of the generated declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ResolverEntry {
    pub key: ResolverKey,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ResolverKey {
    pub kind: ResolverKind,
    /// A field set path or a fragment name
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    Model,
    Fragment,
}

impl CodegenMetadata {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The generated name registered for `kind` and `id`
    pub fn resolve(&self, kind: ResolverKind, id: &str) -> Option<&str> {
        self.resolver_entries
            .iter()
            .find(|entry| entry.key.kind == kind && entry.key.id == id)
            .map(|entry| entry.name.as_str())
    }

    pub fn fragment(&self, name: &str) -> Option<&UpstreamFragment> {
        self.fragments
            .iter()
            .find(|fragment| fragment.definition.name == name)
    }
}
