use crate::error::GeneDiveError;
use crate::interaction::{EntityId, EntityName, Interaction};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// Boundary to the evidence store. Implementations decide the transport;
/// the engine only sees records.
pub trait InteractionApi {
    /// Every stored interaction touching any of `ids` with a probability at
    /// or above `min_probability`.
    fn interactions(
        &mut self,
        ids: &[EntityId],
        min_probability: f64,
    ) -> Result<Vec<Interaction>, GeneDiveError>;

    /// Primary display names for `ids`. Used to report search-set members
    /// absent from the results.
    fn entity_names(&mut self, ids: &[EntityId]) -> Result<Vec<EntityName>, GeneDiveError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FileApiData {
    #[serde(default)]
    interactions: Vec<Interaction>,
    #[serde(default)]
    names: HashMap<EntityId, String>,
}

/// JSON-file-backed evidence store for offline use and tests. The file
/// holds `{"interactions": [...], "names": {id: primary, ...}}`.
#[derive(Debug, Clone, Default)]
pub struct FileApi {
    data: FileApiData,
}

impl FileApi {
    pub fn from_json_str(data: &str) -> Result<Self, GeneDiveError> {
        let data: FileApiData = serde_json::from_str(data)?;
        Ok(Self { data })
    }

    pub fn from_json_file(path: &str) -> Result<Self, GeneDiveError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn record_count(&self) -> usize {
        self.data.interactions.len()
    }
}

impl InteractionApi for FileApi {
    fn interactions(
        &mut self,
        ids: &[EntityId],
        min_probability: f64,
    ) -> Result<Vec<Interaction>, GeneDiveError> {
        let matches: Vec<Interaction> = self
            .data
            .interactions
            .iter()
            .filter(|i| {
                i.probability >= min_probability
                    && (ids.contains(&i.geneids1) || ids.contains(&i.geneids2))
            })
            .cloned()
            .collect();
        debug!(
            requested = ids.len(),
            matched = matches.len(),
            "file api interactions"
        );
        Ok(matches)
    }

    fn entity_names(&mut self, ids: &[EntityId]) -> Result<Vec<EntityName>, GeneDiveError> {
        Ok(ids
            .iter()
            .map(|id| EntityName {
                id: id.clone(),
                primary: self
                    .data
                    .names
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.clone()),
            })
            .collect())
    }
}
