use crate::error::GeneDiveError;
use crate::interaction::EntityId;
use serde::{Deserialize, Serialize};

/// Maximum suggestions returned per lookup.
pub const SUGGESTION_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Entity,
    Set,
}

impl Default for SuggestionKind {
    fn default() -> Self {
        Self::Entity
    }
}

/// One typeahead candidate: a display symbol and the entity ids it stands
/// for. An entity symbol with several ids needs disambiguation before it
/// can become a search set; a collection keeps all of its ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub symbol: String,
    pub values: Vec<EntityId>,
    #[serde(rename = "type", default)]
    pub kind: SuggestionKind,
}

impl Suggestion {
    pub fn needs_disambiguation(&self) -> bool {
        self.kind == SuggestionKind::Entity && self.values.len() > 1
    }
}

/// Suggestion categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Genes,
    Genesets,
    Chemicals,
    Diseases,
}

impl SuggestionCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "genes" => Some(Self::Genes),
            "genesets" => Some(Self::Genesets),
            "chemicals" => Some(Self::Chemicals),
            "diseases" => Some(Self::Diseases),
            _ => None,
        }
    }
}

/// Per-category autocomplete lists, loaded once at startup and read-only
/// afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionCatalog {
    genes: Vec<Suggestion>,
    genesets: Vec<Suggestion>,
    chemicals: Vec<Suggestion>,
    diseases: Vec<Suggestion>,
}

impl SuggestionCatalog {
    pub fn from_json_str(data: &str) -> Result<Self, GeneDiveError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_json_file(path: &str) -> Result<Self, GeneDiveError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    fn category(&self, category: SuggestionCategory) -> &[Suggestion] {
        match category {
            SuggestionCategory::Genes => &self.genes,
            SuggestionCategory::Genesets => &self.genesets,
            SuggestionCategory::Chemicals => &self.chemicals,
            SuggestionCategory::Diseases => &self.diseases,
        }
    }

    /// Case-insensitive prefix lookup within one category, capped at
    /// [`SUGGESTION_LIMIT`] in catalog order.
    pub fn lookup(&self, category: SuggestionCategory, prefix: &str) -> Vec<&Suggestion> {
        if prefix.is_empty() {
            return vec![];
        }
        let needle = prefix.to_lowercase();
        self.category(category)
            .iter()
            .filter(|s| s.symbol.to_lowercase().starts_with(&needle))
            .take(SUGGESTION_LIMIT)
            .collect()
    }

    /// Exact symbol match within one category, case-insensitive.
    pub fn find(&self, category: SuggestionCategory, symbol: &str) -> Option<&Suggestion> {
        self.category(category)
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}
