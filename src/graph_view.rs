use crate::interaction::{EntityId, Interaction};
use crate::search::SearchSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One render-ready graph node. `membership` maps search-set id to this
/// node's share of the node disc in percent, for multi-set pie coloring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: EntityId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub membership: BTreeMap<String, u32>,
}

/// One render-ready undirected edge, deduplicated on the sorted endpoint
/// pair. `count` is the number of evidence records behind the edge;
/// `highlight` is set when any of them is highlighted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: EntityId,
    pub target: EntityId,
    pub highlight: bool,
    pub count: u32,
}

/// The full node-link view of the current filtrate, as handed to a graph
/// drawing sink. Serialized into snapshots so undo restores the view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphViewState {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphViewState {
    /// Aggregate the filtrate into deduplicated nodes and edges, binding
    /// set membership shares from the active search sets.
    pub fn build(filtrate: &[Interaction], sets: &[SearchSet]) -> Self {
        let mut nodes: BTreeMap<EntityId, GraphNode> = BTreeMap::new();
        let mut edges: BTreeMap<String, GraphEdge> = BTreeMap::new();

        for interaction in filtrate {
            let endpoints = [
                (
                    &interaction.geneids1,
                    &interaction.mention1,
                    &interaction.mention1_color,
                ),
                (
                    &interaction.geneids2,
                    &interaction.mention2,
                    &interaction.mention2_color,
                ),
            ];
            for (id, name, color) in endpoints {
                nodes.entry(id.clone()).or_insert_with(|| GraphNode {
                    id: id.clone(),
                    name: name.clone(),
                    color: color.clone().unwrap_or_default(),
                    membership: BTreeMap::new(),
                });
            }

            let key = interaction.pair_key();
            let edge = edges.entry(key.clone()).or_insert_with(|| GraphEdge {
                id: key,
                source: interaction.geneids1.clone(),
                target: interaction.geneids2.clone(),
                highlight: false,
                count: 0,
            });
            edge.count += 1;
            if interaction.highlight {
                edge.highlight = true;
            }
        }

        for node in nodes.values_mut() {
            let members: Vec<&SearchSet> = sets
                .iter()
                .filter(|s| s.ids.iter().any(|i| *i == node.id))
                .collect();
            if members.is_empty() {
                continue;
            }
            let share = (100 / members.len()) as u32;
            for set in members {
                node.membership.insert(set.id.clone(), share);
            }
        }

        Self {
            nodes: nodes.into_values().collect(),
            edges: edges.into_values().collect(),
        }
    }

    /// Search-set member ids that appear in no rendered node. Reported to
    /// the user by canonical name; empty means every member had evidence.
    pub fn absent_members(&self, sets: &[SearchSet]) -> Vec<EntityId> {
        sets.iter()
            .flat_map(|s| s.ids.clone())
            .unique()
            .filter(|id| !self.nodes.iter().any(|n| n.id == *id))
            .collect()
    }
}
