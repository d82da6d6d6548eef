use crate::adjacency::{AdjacencyIndex, scale_probability};
use crate::color::{ColorMap, DISCOVERED_COLOR, SEED_COLOR, UNASSIGNED_SET_COLOR};
use crate::error::GeneDiveError;
use crate::graph_search::GraphSearch;
use crate::interaction::{EntityClass, EntityId};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::debug;

/// The active search mode, deciding which graph operation runs and how many
/// search sets are legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    #[serde(rename = "1hop")]
    OneHop,
    #[serde(rename = "2hop")]
    TwoHop,
    #[serde(rename = "3hop")]
    ThreeHop,
    #[serde(rename = "clique")]
    Clique,
}

impl Topology {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "1hop" => Some(Self::OneHop),
            "2hop" => Some(Self::TwoHop),
            "3hop" => Some(Self::ThreeHop),
            "clique" => Some(Self::Clique),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHop => "1hop",
            Self::TwoHop => "2hop",
            Self::ThreeHop => "3hop",
            Self::Clique => "clique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    /// A single entity added under its own symbol.
    Gene,
    /// A named collection of entities added as one unit.
    Set,
}

/// One user-curated search item: a named, typed, colored group of entity
/// ids. Identity for duplicate detection and removal is the exact name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSet {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SetKind,
    pub entity: EntityClass,
    pub ids: Vec<EntityId>,
    pub color: String,
}

impl SearchSet {
    pub fn new(name: &str, ids: &[EntityId]) -> Result<Self, GeneDiveError> {
        let Some(first) = ids.first() else {
            return Err(GeneDiveError::EmptySearchSet);
        };
        Ok(Self {
            id: derive_set_id(name),
            name: name.to_string(),
            kind: if ids.len() > 1 {
                SetKind::Set
            } else {
                SetKind::Gene
            },
            entity: EntityClass::from_id(first),
            ids: ids.to_vec(),
            color: UNASSIGNED_SET_COLOR.to_string(),
        })
    }

    pub fn first_id(&self) -> &str {
        self.ids.first().map(|id| id.as_str()).unwrap_or("")
    }
}

/// Stable id for a search set, derived from its name.
fn derive_set_id(name: &str) -> String {
    let digest = Sha1::digest(name.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    hex[..30].to_string()
}

/// The ordered collection of active search sets plus the selected topology.
/// Owns the live sets exclusively; everything downstream works on copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSetManager {
    sets: Vec<SearchSet>,
    topology: Topology,
}

impl SearchSetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sets(&self) -> &[SearchSet] {
        &self.sets
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn has_set(&self, name: &str) -> bool {
        self.sets.iter().any(|s| s.name == name)
    }

    /// Append a new search set. Rejects duplicates by name, and under
    /// clique topology rejects a second set or a multi-id set; rejection
    /// leaves the collection untouched.
    pub fn add_set(&mut self, name: &str, ids: &[EntityId]) -> Result<(), GeneDiveError> {
        if self.has_set(name) {
            return Err(GeneDiveError::DuplicateSearchSet(name.to_string()));
        }
        if self.topology == Topology::Clique && (!self.sets.is_empty() || ids.len() > 1) {
            return Err(GeneDiveError::CliqueSingleEntity);
        }
        self.sets.push(SearchSet::new(name, ids)?);
        debug!(name, count = self.sets.len(), "search set added");
        Ok(())
    }

    /// Remove the first set whose name or first id equals `identifier`.
    /// Silently does nothing when none match.
    pub fn remove_set(&mut self, identifier: &str) {
        if let Some(pos) = self
            .sets
            .iter()
            .position(|s| s.name == identifier || s.first_id() == identifier)
        {
            self.sets.remove(pos);
            debug!(identifier, count = self.sets.len(), "search set removed");
        }
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Replace the whole collection and topology, as when restoring a
    /// snapshot.
    pub fn restore(&mut self, sets: Vec<SearchSet>, topology: Topology) {
        self.sets = sets;
        self.topology = topology;
    }

    /// Why the current sets are illegal under the active topology, if so.
    /// Checked again at search time: sets may be added before a topology
    /// switch.
    pub fn topology_violation(&self) -> Option<String> {
        match self.topology {
            Topology::OneHop => None,
            Topology::TwoHop | Topology::ThreeHop => {
                if self.sets.len() != 2 || self.sets.iter().any(|s| s.ids.len() != 1) {
                    Some(format!(
                        "{} requires exactly two single-entity search sets",
                        if self.topology == Topology::TwoHop {
                            "2-Hop"
                        } else {
                            "3-Hop"
                        }
                    ))
                } else {
                    None
                }
            }
            Topology::Clique => {
                if self.sets.len() != 1 || self.sets[0].ids.len() != 1 {
                    Some("Clique search requires a single entity".to_string())
                } else {
                    None
                }
            }
        }
    }

    /// Derive the entity ids to fetch evidence for, per the active
    /// topology, assigning display colors along the way. Topology
    /// constraint violations yield an empty list; the caller surfaces them
    /// via [`SearchSetManager::topology_violation`] before getting here.
    pub fn compute_search_ids(
        &mut self,
        min_probability: f64,
        adjacency: &AdjacencyIndex,
        colors: &mut ColorMap,
    ) -> Vec<EntityId> {
        colors.reset();
        let threshold = scale_probability(min_probability);
        match self.topology {
            Topology::OneHop => self.one_hop_ids(colors),
            Topology::TwoHop => self.n_hop_ids(2, threshold, adjacency, colors),
            Topology::ThreeHop => self.n_hop_ids(3, threshold, adjacency, colors),
            Topology::Clique => self.clique_ids(threshold, adjacency, colors),
        }
    }

    fn one_hop_ids(&mut self, colors: &mut ColorMap) -> Vec<EntityId> {
        for set in &mut self.sets {
            set.color = colors.allocate_color(&set.ids);
        }
        self.sets.iter().flat_map(|s| s.ids.clone()).collect()
    }

    fn n_hop_ids(
        &mut self,
        hops: usize,
        threshold: u32,
        adjacency: &AdjacencyIndex,
        colors: &mut ColorMap,
    ) -> Vec<EntityId> {
        if self.topology_violation().is_some() {
            return vec![];
        }
        let origin = self.sets[0].first_id().to_string();
        let destination = self.sets[1].first_id().to_string();
        let result = GraphSearch::new(adjacency).n_hop(&origin, &destination, hops, threshold, false);

        for set in &mut self.sets {
            set.color = SEED_COLOR.to_string();
            colors.set_color(&set.ids, SEED_COLOR);
        }
        colors.set_color(&result.interactants, DISCOVERED_COLOR);

        self.sets
            .iter()
            .flat_map(|s| s.ids.clone())
            .chain(result.interactants)
            .unique()
            .collect()
    }

    fn clique_ids(
        &mut self,
        threshold: u32,
        adjacency: &AdjacencyIndex,
        colors: &mut ColorMap,
    ) -> Vec<EntityId> {
        if self.topology_violation().is_some() {
            return vec![];
        }
        let seed = self.sets[0].first_id().to_string();
        let result = GraphSearch::new(adjacency).clique(&seed, threshold);

        for set in &mut self.sets {
            set.color = SEED_COLOR.to_string();
            colors.set_color(&set.ids, SEED_COLOR);
        }
        colors.set_color(&result.interactants, DISCOVERED_COLOR);
        // Non-interactants stay at the neutral default color.

        std::iter::once(seed)
            .chain(result.interactants)
            .chain(result.non_interactants.unwrap_or_default())
            .unique()
            .collect()
    }
}
