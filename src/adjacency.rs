use crate::error::GeneDiveError;
use crate::interaction::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Interaction probabilities are integer-scaled by this factor in the
/// adjacency data, while thresholds arrive as fractions in [0,1].
pub const PROBABILITY_SCALE: f64 = 1000.0;

pub type ProbabilityList = Vec<u32>;
pub type RawAdjacency = BTreeMap<EntityId, BTreeMap<EntityId, ProbabilityList>>;

/// Symmetric entity adjacency, built once from the raw nested mapping and
/// read-only afterwards.
///
/// Mirroring is existence-only: an edge present on one side is back-filled
/// on the other with an empty probability list, so thresholded lookups see
/// exactly the probabilities the source data provides per direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyIndex {
    edges: RawAdjacency,
}

impl AdjacencyIndex {
    /// Build the index, mirroring every edge. Idempotent: constructing from
    /// an already-mirrored source does not duplicate or overwrite edges.
    pub fn from_raw(raw: RawAdjacency) -> Self {
        let mut edges = raw;
        let pairs: Vec<(EntityId, EntityId)> = edges
            .iter()
            .flat_map(|(a, neighbors)| neighbors.keys().map(|b| (a.clone(), b.clone())))
            .collect();
        for (a, b) in pairs {
            edges.entry(b).or_default().entry(a).or_default();
        }
        Self { edges }
    }

    pub fn from_json_str(data: &str) -> Result<Self, GeneDiveError> {
        let raw: RawAdjacency = serde_json::from_str(data)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_json_file(path: &str) -> Result<Self, GeneDiveError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn entity_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    /// Every neighbor of `id` with at least one recorded probability at or
    /// above `min_probability`. An unknown id has no neighbors.
    pub fn neighbors(&self, id: &str, min_probability: u32) -> BTreeSet<EntityId> {
        let Some(neighbors) = self.edges.get(id) else {
            return BTreeSet::new();
        };
        neighbors
            .iter()
            .filter(|(_, probabilities)| probabilities.iter().any(|p| *p >= min_probability))
            .map(|(neighbor, _)| neighbor.clone())
            .collect()
    }

    /// True iff the thresholded neighbor set of `id` intersects `candidates`.
    pub fn has_edge_above_threshold(
        &self,
        id: &str,
        candidates: &[EntityId],
        min_probability: u32,
    ) -> bool {
        let neighbors = self.neighbors(id, min_probability);
        candidates.iter().any(|c| neighbors.contains(c))
    }
}

/// Convert a fractional threshold to the integer scale of the adjacency data.
pub fn scale_probability(min_probability: f64) -> u32 {
    (min_probability * PROBABILITY_SCALE).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(entries: &[(&str, &[(&str, &[u32])])]) -> RawAdjacency {
        entries
            .iter()
            .map(|(id, neighbors)| {
                let neighbors = neighbors
                    .iter()
                    .map(|(n, probs)| (n.to_string(), probs.to_vec()))
                    .collect();
                (id.to_string(), neighbors)
            })
            .collect()
    }

    #[test]
    fn test_neighbors_threshold() {
        let index = AdjacencyIndex::from_raw(raw(&[
            ("A", &[("B", &[900])]),
            ("B", &[("A", &[900])]),
        ]));
        assert_eq!(
            index.neighbors("A", 500),
            BTreeSet::from(["B".to_string()])
        );
        assert!(index.neighbors("A", 950).is_empty());
    }

    #[test]
    fn test_neighbors_of_unknown_id_is_empty() {
        let index = AdjacencyIndex::from_raw(raw(&[("A", &[("B", &[500])])]));
        assert!(index.neighbors("Z", 0).is_empty());
    }

    #[test]
    fn test_mirroring_is_existence_only() {
        let index = AdjacencyIndex::from_raw(raw(&[("A", &[("B", &[800])])]));
        // The mirrored side exists but carries no probabilities, so it never
        // passes a threshold on its own.
        assert!(index.contains("B"));
        assert!(index.neighbors("B", 0).is_empty());
        assert_eq!(index.neighbors("A", 700).len(), 1);
    }

    #[test]
    fn test_mirroring_is_idempotent() {
        let once = AdjacencyIndex::from_raw(raw(&[
            ("A", &[("B", &[800])]),
            ("B", &[("A", &[800])]),
        ]));
        assert_eq!(once.neighbors("B", 700), BTreeSet::from(["A".to_string()]));
        assert_eq!(once.entity_count(), 2);
    }

    #[test]
    fn test_neighbors_monotone_in_threshold() {
        let index = AdjacencyIndex::from_raw(raw(&[(
            "A",
            &[("B", &[100, 400]), ("C", &[650]), ("D", &[900, 200])],
        )]));
        let mut previous = usize::MAX;
        for threshold in [0, 150, 450, 700, 950] {
            let count = index.neighbors("A", threshold).len();
            assert!(count <= previous, "threshold {threshold} added neighbors");
            previous = count;
        }
    }

    #[test]
    fn test_has_edge_above_threshold() {
        let index = AdjacencyIndex::from_raw(raw(&[("A", &[("B", &[600]), ("C", &[300])])]));
        assert!(index.has_edge_above_threshold("A", &["B".to_string()], 500));
        assert!(!index.has_edge_above_threshold("A", &["C".to_string()], 500));
        assert!(!index.has_edge_above_threshold("A", &["Z".to_string()], 0));
    }

    #[test]
    fn test_from_json_str() {
        let index = AdjacencyIndex::from_json_str(r#"{"1": {"3": [820, 455]}, "2": {"3": [910]}}"#)
            .unwrap();
        assert_eq!(
            index.neighbors("1", 800),
            BTreeSet::from(["3".to_string()])
        );
        assert!(index.neighbors("1", 900).is_empty());
        // Back-filled sides exist but carry no probabilities of their own.
        assert!(index.contains("3"));
        assert!(index.neighbors("3", 0).is_empty());
    }

    #[test]
    fn test_scale_probability() {
        assert_eq!(scale_probability(0.5), 500);
        assert_eq!(scale_probability(0.0), 0);
        assert_eq!(scale_probability(1.0), 1000);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adjacency.json");
        std::fs::write(&path, r#"{"A": {"B": [750]}}"#).unwrap();
        let index = AdjacencyIndex::from_json_file(path.to_str().unwrap()).unwrap();
        assert_eq!(index.neighbors("A", 700).len(), 1);
        assert!(AdjacencyIndex::from_json_file("no/such/file.json").is_err());
    }
}
